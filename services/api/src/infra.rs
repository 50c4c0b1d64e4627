use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use workforce::company::{Employee, EmployeeId, EmployeeLevel, Roster, RosterError, Team, TeamName};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Default)]
struct RosterTables {
    last_id: u64,
    employees: BTreeMap<EmployeeId, Employee>,
    teams: BTreeMap<TeamName, Team>,
}

/// Process-local roster. Each call takes the table lock once, so single-record writes are atomic.
/// Whole operations are serialised on a separate lock held for the duration of
/// [`Roster::atomically`].
#[derive(Default, Clone)]
pub(crate) struct InMemoryRoster {
    tables: Arc<Mutex<RosterTables>>,
    operations: Arc<Mutex<()>>,
}

impl InMemoryRoster {
    fn with_tables<T>(&self, f: impl FnOnce(&mut RosterTables) -> T) -> Result<T, RosterError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| RosterError::Unavailable("roster mutex poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl Roster for InMemoryRoster {
    fn atomically<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T,
    {
        // a poisoned lock still serialises; the tables themselves report poisoning
        let _operation = self
            .operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        op()
    }

    fn next_employee_id(&self) -> Result<EmployeeId, RosterError> {
        self.with_tables(|tables| {
            tables.last_id += 1;
            EmployeeId(tables.last_id)
        })
    }

    fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RosterError> {
        self.with_tables(|tables| tables.employees.get(&id).cloned())
    }

    fn list_employees(&self, level: Option<EmployeeLevel>) -> Result<Vec<Employee>, RosterError> {
        self.with_tables(|tables| {
            tables
                .employees
                .values()
                .filter(|employee| level.map_or(true, |level| employee.level == level))
                .cloned()
                .collect()
        })
    }

    fn save_employee(&self, employee: Employee) -> Result<(), RosterError> {
        self.with_tables(|tables| {
            tables.employees.insert(employee.id, employee);
        })
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<(), RosterError> {
        self.with_tables(|tables| {
            tables.employees.remove(&id);
        })
    }

    fn find_team(&self, name: &TeamName) -> Result<Option<Team>, RosterError> {
        self.with_tables(|tables| tables.teams.get(name).cloned())
    }

    fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        self.with_tables(|tables| tables.teams.values().cloned().collect())
    }

    fn save_team(&self, team: Team) -> Result<(), RosterError> {
        self.with_tables(|tables| {
            tables.teams.insert(team.name.clone(), team);
        })
    }

    fn delete_team(&self, name: &TeamName) -> Result<(), RosterError> {
        self.with_tables(|tables| {
            tables.teams.remove(name);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Barrier;
    use std::thread;
    use workforce::company::{CompanyService, HireRequest, MAX_TEAM_SIZE};

    fn employee(id: u64, level: EmployeeLevel) -> Employee {
        Employee {
            id: EmployeeId(id),
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            salary: 500.0,
            level,
            team: None,
            hired_on: NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"),
        }
    }

    #[test]
    fn ids_are_sequential() {
        let roster = InMemoryRoster::default();
        assert_eq!(roster.next_employee_id().expect("id"), EmployeeId(1));
        assert_eq!(roster.next_employee_id().expect("id"), EmployeeId(2));
    }

    #[test]
    fn filters_by_level() {
        let roster = InMemoryRoster::default();
        roster
            .save_employee(employee(1, EmployeeLevel::Worker))
            .expect("save");
        roster
            .save_employee(employee(2, EmployeeLevel::Lead))
            .expect("save");

        assert_eq!(roster.list_employees(None).expect("list").len(), 2);
        let leads = roster
            .list_employees(Some(EmployeeLevel::Lead))
            .expect("list");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, EmployeeId(2));
    }

    #[test]
    fn concurrent_admissions_respect_team_size() {
        const CANDIDATES: usize = 12;

        for _round in 0..50 {
            let roster = Arc::new(InMemoryRoster::default());
            let service = Arc::new(CompanyService::new(roster.clone()));
            service.create_team("Alpha").expect("team created");
            let ids: Vec<EmployeeId> = (0..CANDIDATES)
                .map(|index| {
                    service
                        .hire(HireRequest::new(format!("Worker{index}"), "Kowalski", 1000.0))
                        .expect("hire succeeds")
                        .id
                })
                .collect();

            let barrier = Arc::new(Barrier::new(CANDIDATES));
            let handles: Vec<_> = ids
                .iter()
                .map(|&id| {
                    let service = Arc::clone(&service);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        service.add_employee_to_team(id, "Alpha").is_ok()
                    })
                })
                .collect();
            let accepted = handles
                .into_iter()
                .map(|handle| handle.join().expect("thread joins"))
                .filter(|accepted| *accepted)
                .count();

            let team = roster
                .find_team(&TeamName("Alpha".to_string()))
                .expect("lookup")
                .expect("team exists");
            let assigned: Vec<EmployeeId> = roster
                .list_employees(None)
                .expect("list")
                .into_iter()
                .filter(|employee| employee.team.is_some())
                .map(|employee| employee.id)
                .collect();

            assert_eq!(accepted, MAX_TEAM_SIZE);
            assert_eq!(team.members.len(), MAX_TEAM_SIZE);
            assert_eq!(assigned.len(), MAX_TEAM_SIZE);
            assert!(assigned.iter().all(|id| team.members.contains(id)));
        }
    }
}
