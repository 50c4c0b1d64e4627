use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::company::domain::{
    Employee, EmployeeId, EmployeeLevel, HireRequest, Team, TeamName,
};
use crate::company::roster::{Roster, RosterError};
use crate::company::{company_router, CompanyService};

pub(super) fn hired_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

pub(super) fn build_service() -> (CompanyService<MemoryRoster>, Arc<MemoryRoster>) {
    let roster = Arc::new(MemoryRoster::default());
    let service = CompanyService::new(roster.clone());
    (service, roster)
}

pub(super) fn hire(
    service: &CompanyService<MemoryRoster>,
    name: &str,
    surname: &str,
    salary: f64,
    level: EmployeeLevel,
) -> Employee {
    let mut request = HireRequest::new(name, surname, salary).at_level(level);
    request.hired_on = Some(hired_on());
    service.hire(request).expect("hire succeeds")
}

/// Jan (500, WORKER), Kasia (2500, WORKER), Iza (5000, MANAGER).
pub(super) fn salary_fixture(service: &CompanyService<MemoryRoster>) -> Vec<Employee> {
    vec![
        hire(service, "Jan", "Kowalski", 500.0, EmployeeLevel::Worker),
        hire(service, "Kasia", "Nowak", 2500.0, EmployeeLevel::Worker),
        hire(service, "Iza", "Lesniak", 5000.0, EmployeeLevel::Manager),
    ]
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[derive(Debug, Default)]
pub(super) struct RosterState {
    pub(super) next_id: u64,
    pub(super) employees: BTreeMap<EmployeeId, Employee>,
    pub(super) teams: BTreeMap<TeamName, Team>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRoster {
    pub(super) state: Arc<Mutex<RosterState>>,
}

impl MemoryRoster {
    pub(super) fn employee(&self, id: EmployeeId) -> Option<Employee> {
        self.state
            .lock()
            .expect("roster mutex poisoned")
            .employees
            .get(&id)
            .cloned()
    }

    pub(super) fn team(&self, name: &str) -> Option<Team> {
        self.state
            .lock()
            .expect("roster mutex poisoned")
            .teams
            .get(&TeamName(name.to_string()))
            .cloned()
    }
}

impl Roster for MemoryRoster {
    fn next_employee_id(&self) -> Result<EmployeeId, RosterError> {
        let mut guard = self.state.lock().expect("roster mutex poisoned");
        guard.next_id += 1;
        Ok(EmployeeId(guard.next_id))
    }

    fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RosterError> {
        Ok(self.employee(id))
    }

    fn list_employees(&self, level: Option<EmployeeLevel>) -> Result<Vec<Employee>, RosterError> {
        let guard = self.state.lock().expect("roster mutex poisoned");
        Ok(guard
            .employees
            .values()
            .filter(|employee| level.map_or(true, |level| employee.level == level))
            .cloned()
            .collect())
    }

    fn save_employee(&self, employee: Employee) -> Result<(), RosterError> {
        let mut guard = self.state.lock().expect("roster mutex poisoned");
        guard.employees.insert(employee.id, employee);
        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<(), RosterError> {
        let mut guard = self.state.lock().expect("roster mutex poisoned");
        guard.employees.remove(&id);
        Ok(())
    }

    fn find_team(&self, name: &TeamName) -> Result<Option<Team>, RosterError> {
        Ok(self.team(name.as_str()))
    }

    fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        let guard = self.state.lock().expect("roster mutex poisoned");
        Ok(guard.teams.values().cloned().collect())
    }

    fn save_team(&self, team: Team) -> Result<(), RosterError> {
        let mut guard = self.state.lock().expect("roster mutex poisoned");
        guard.teams.insert(team.name.clone(), team);
        Ok(())
    }

    fn delete_team(&self, name: &TeamName) -> Result<(), RosterError> {
        let mut guard = self.state.lock().expect("roster mutex poisoned");
        guard.teams.remove(name);
        Ok(())
    }
}

/// Memory roster whose employee writes can be switched off to exercise rollback.
#[derive(Default)]
pub(super) struct FlakyRoster {
    pub(super) inner: MemoryRoster,
    pub(super) reject_employee_writes: AtomicBool,
}

impl FlakyRoster {
    pub(super) fn fail_employee_writes(&self) {
        self.reject_employee_writes.store(true, Ordering::SeqCst);
    }
}

impl Roster for FlakyRoster {
    fn next_employee_id(&self) -> Result<EmployeeId, RosterError> {
        self.inner.next_employee_id()
    }

    fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RosterError> {
        self.inner.find_employee(id)
    }

    fn list_employees(&self, level: Option<EmployeeLevel>) -> Result<Vec<Employee>, RosterError> {
        self.inner.list_employees(level)
    }

    fn save_employee(&self, employee: Employee) -> Result<(), RosterError> {
        if self.reject_employee_writes.load(Ordering::SeqCst) {
            return Err(RosterError::Unavailable("employee table locked".to_string()));
        }
        self.inner.save_employee(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<(), RosterError> {
        if self.reject_employee_writes.load(Ordering::SeqCst) {
            return Err(RosterError::Unavailable("employee table locked".to_string()));
        }
        self.inner.delete_employee(id)
    }

    fn find_team(&self, name: &TeamName) -> Result<Option<Team>, RosterError> {
        self.inner.find_team(name)
    }

    fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        self.inner.list_teams()
    }

    fn save_team(&self, team: Team) -> Result<(), RosterError> {
        self.inner.save_team(team)
    }

    fn delete_team(&self, name: &TeamName) -> Result<(), RosterError> {
        self.inner.delete_team(name)
    }
}

pub(super) struct UnavailableRoster;

impl Roster for UnavailableRoster {
    fn next_employee_id(&self) -> Result<EmployeeId, RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn find_employee(&self, _id: EmployeeId) -> Result<Option<Employee>, RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn list_employees(&self, _level: Option<EmployeeLevel>) -> Result<Vec<Employee>, RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn save_employee(&self, _employee: Employee) -> Result<(), RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn delete_employee(&self, _id: EmployeeId) -> Result<(), RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn find_team(&self, _name: &TeamName) -> Result<Option<Team>, RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn save_team(&self, _team: Team) -> Result<(), RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }

    fn delete_team(&self, _name: &TeamName) -> Result<(), RosterError> {
        Err(RosterError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: CompanyService<MemoryRoster>) -> axum::Router {
    company_router(Arc::new(service))
}
