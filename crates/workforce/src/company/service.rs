use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use super::domain::{
    Employee, EmployeeId, EmployeeLevel, HireRequest, SalaryRange, Team, TeamName, TeamSnapshot,
};
use super::roster::{Roster, RosterError};
use super::rules::{self, RaisePercent, ValidationError};

/// Stateless rule layer over a [`Roster`]. All state lives in the roster's records.
pub struct CompanyService<R> {
    roster: Arc<R>,
}

impl<R> CompanyService<R>
where
    R: Roster + 'static,
{
    pub fn new(roster: Arc<R>) -> Self {
        Self { roster }
    }

    /// Hire a new employee. Level defaults to `WORKER` and the hire date to today.
    pub fn hire(&self, request: HireRequest) -> Result<Employee, CompanyServiceError> {
        self.roster.atomically(|| self.hire_inner(request))
    }

    fn hire_inner(&self, request: HireRequest) -> Result<Employee, CompanyServiceError> {
        let draft = rules::validate_hire(&request).inspect_err(|err| {
            debug!(error = %err, "hire rejected");
        })?;

        let id = self.roster.next_employee_id()?;
        let employee = Employee {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            salary: draft.salary,
            level: draft.level,
            team: None,
            hired_on: request
                .hired_on
                .unwrap_or_else(|| Local::now().date_naive()),
        };

        let mut plan = WritePlan::default();
        plan.save_employee(employee.clone(), None);
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %id, level = %employee.level, "employee hired");
        Ok(employee)
    }

    /// Remove an employee. Unknown ids are ignored.
    pub fn fire(&self, employee_id: EmployeeId) -> Result<(), CompanyServiceError> {
        self.roster.atomically(|| self.fire_inner(employee_id))
    }

    fn fire_inner(&self, employee_id: EmployeeId) -> Result<(), CompanyServiceError> {
        let Some(employee) = self.roster.find_employee(employee_id)? else {
            debug!(employee_id = %employee_id, "fire ignored for unknown employee");
            return Ok(());
        };

        let mut plan = WritePlan::default();
        if let Some(team) = self.current_team(&employee)? {
            let mut updated = team.clone();
            updated.members.remove(&employee_id);
            plan.save_team(updated, Some(team));
        }
        plan.delete_employee(employee);
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %employee_id, "employee fired");
        Ok(())
    }

    pub fn find_employee(&self, employee_id: EmployeeId) -> Result<Employee, CompanyServiceError> {
        self.roster
            .find_employee(employee_id)?
            .ok_or_else(|| ValidationError::UnknownEmployee(employee_id).into())
    }

    /// Every employee when `level` is `None`, otherwise only those at `level`.
    pub fn list_employees(
        &self,
        level: Option<EmployeeLevel>,
    ) -> Result<Vec<Employee>, CompanyServiceError> {
        Ok(self.roster.list_employees(level)?)
    }

    pub fn list_employees_by_salary(
        &self,
        range: SalaryRange,
    ) -> Result<Vec<Employee>, CompanyServiceError> {
        Ok(self.roster.list_employees_by_salary(range)?)
    }

    pub fn create_team(&self, name: &str) -> Result<Team, CompanyServiceError> {
        self.roster.atomically(|| self.create_team_inner(name))
    }

    fn create_team_inner(&self, name: &str) -> Result<Team, CompanyServiceError> {
        let name = rules::validate_team_name(name)?;
        if self.roster.find_team(&name)?.is_some() {
            debug!(team = %name, "duplicate team rejected");
            return Err(ValidationError::DuplicateTeam(name).into());
        }

        let team = Team::new(name);
        let mut plan = WritePlan::default();
        plan.save_team(team.clone(), None);
        plan.commit(self.roster.as_ref())?;

        info!(team = %team.name, "team created");
        Ok(team)
    }

    /// Delete a team, detaching its members first.
    pub fn remove_team(&self, name: &str) -> Result<(), CompanyServiceError> {
        self.roster.atomically(|| self.remove_team_inner(name))
    }

    fn remove_team_inner(&self, name: &str) -> Result<(), CompanyServiceError> {
        let name = rules::validate_team_name(name)?;
        let team = self.require_team(&name)?;

        let mut plan = WritePlan::default();
        for member in self.members_of(&team)? {
            if member.team.as_ref() == Some(&name) {
                let mut detached = member.clone();
                detached.team = None;
                plan.save_employee(detached, Some(member));
            }
        }
        let detached = plan.len();
        plan.delete_team(team);
        plan.commit(self.roster.as_ref())?;

        info!(team = %name, detached, "team removed");
        Ok(())
    }

    /// Team names in lexical order.
    pub fn list_teams(&self) -> Result<Vec<TeamName>, CompanyServiceError> {
        let mut names: Vec<TeamName> = self
            .roster
            .list_teams()?
            .into_iter()
            .map(|team| team.name)
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn add_employee_to_team(
        &self,
        employee_id: EmployeeId,
        team_name: &str,
    ) -> Result<TeamSnapshot, CompanyServiceError> {
        self.roster.atomically(|| self.add_employee_to_team_inner(employee_id, team_name))
    }

    fn add_employee_to_team_inner(
        &self,
        employee_id: EmployeeId,
        team_name: &str,
    ) -> Result<TeamSnapshot, CompanyServiceError> {
        let name = rules::validate_team_name(team_name)?;
        let employee = self.find_employee(employee_id)?;
        let team = self.require_team(&name)?;
        let members = self.members_of(&team)?;

        rules::check_admission(&team, &members, &employee)
            .map_err(ValidationError::from)
            .inspect_err(|err| {
                debug!(employee_id = %employee_id, team = %name, error = %err, "team admission rejected");
            })?;

        let mut joined_team = team.clone();
        joined_team.members.insert(employee_id);
        let mut joined = employee.clone();
        joined.team = Some(name.clone());

        let mut plan = WritePlan::default();
        plan.save_team(joined_team.clone(), Some(team));
        plan.save_employee(joined.clone(), Some(employee));
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %employee_id, team = %name, "employee added to team");

        let mut members = members;
        members.push(joined);
        members.sort_by_key(|member| member.id);
        Ok(snapshot(&joined_team, &members))
    }

    /// Detach an employee from their team. Unknown or unassigned employees are ignored.
    pub fn remove_employee_from_team(
        &self,
        employee_id: EmployeeId,
    ) -> Result<(), CompanyServiceError> {
        self.roster.atomically(|| self.remove_employee_from_team_inner(employee_id))
    }

    fn remove_employee_from_team_inner(
        &self,
        employee_id: EmployeeId,
    ) -> Result<(), CompanyServiceError> {
        let Some(employee) = self.roster.find_employee(employee_id)? else {
            debug!(employee_id = %employee_id, "team removal ignored for unknown employee");
            return Ok(());
        };
        let Some(team_name) = employee.team.clone() else {
            return Ok(());
        };

        let mut plan = WritePlan::default();
        if let Some(team) = self.roster.find_team(&team_name)? {
            let mut updated = team.clone();
            updated.members.remove(&employee_id);
            plan.save_team(updated, Some(team));
        }
        let mut detached = employee.clone();
        detached.team = None;
        plan.save_employee(detached, Some(employee));
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %employee_id, team = %team_name, "employee removed from team");
        Ok(())
    }

    pub fn team_info(&self, team_name: &str) -> Result<TeamSnapshot, CompanyServiceError> {
        let name = rules::validate_team_name(team_name)?;
        let team = self.require_team(&name)?;
        let members = self.members_of(&team)?;
        Ok(snapshot(&team, &members))
    }

    /// Adjust a salary by `percent`, which must lie within [-5, 100].
    pub fn give_raise(
        &self,
        employee_id: EmployeeId,
        percent: f64,
    ) -> Result<Employee, CompanyServiceError> {
        self.roster.atomically(|| self.give_raise_inner(employee_id, percent))
    }

    fn give_raise_inner(
        &self,
        employee_id: EmployeeId,
        percent: f64,
    ) -> Result<Employee, CompanyServiceError> {
        let raise = RaisePercent::new(percent).inspect_err(|err| {
            debug!(employee_id = %employee_id, error = %err, "raise rejected");
        })?;
        let employee = self.find_employee(employee_id)?;

        let mut raised = employee.clone();
        raised.salary = raise.raise_salary(employee.salary).inspect_err(|err| {
            debug!(employee_id = %employee_id, error = %err, "raise rejected");
        })?;

        let mut plan = WritePlan::default();
        plan.save_employee(raised.clone(), Some(employee));
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %employee_id, percent = raise.value(), salary = raised.salary, "raise applied");
        Ok(raised)
    }

    /// Move an employee one step up the promotion table, applying the accompanying raise. The
    /// new level must still fit the employee's team.
    pub fn give_promotion(&self, employee_id: EmployeeId) -> Result<Employee, CompanyServiceError> {
        self.roster.atomically(|| self.give_promotion_inner(employee_id))
    }

    fn give_promotion_inner(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Employee, CompanyServiceError> {
        let employee = self.find_employee(employee_id)?;
        let promoted = rules::promote(&employee).inspect_err(|err| {
            debug!(employee_id = %employee_id, error = %err, "promotion rejected");
        })?;
        if let Some(team) = self.current_team(&employee)? {
            let members = self.members_of(&team)?;
            rules::check_promotion_fit(&team, &members, &promoted)
                .map_err(ValidationError::from)
                .inspect_err(|err| {
                    debug!(employee_id = %employee_id, team = %team.name, error = %err, "promotion rejected");
                })?;
        }

        let mut plan = WritePlan::default();
        plan.save_employee(promoted.clone(), Some(employee));
        plan.commit(self.roster.as_ref())?;

        info!(employee_id = %employee_id, level = %promoted.level, salary = promoted.salary, "employee promoted");
        Ok(promoted)
    }

    /// Sum of salaries of every employee at `level`.
    pub fn salaries(&self, level: EmployeeLevel) -> Result<f64, CompanyServiceError> {
        Ok(sum_of_salaries(&self.roster.list_employees(Some(level))?))
    }

    pub fn summarize_salaries(&self) -> Result<f64, CompanyServiceError> {
        Ok(sum_of_salaries(&self.roster.list_employees(None)?))
    }

    fn require_team(&self, name: &TeamName) -> Result<Team, CompanyServiceError> {
        self.roster
            .find_team(name)?
            .ok_or_else(|| ValidationError::UnknownTeam(name.clone()).into())
    }

    fn current_team(&self, employee: &Employee) -> Result<Option<Team>, RosterError> {
        match &employee.team {
            Some(name) => self.roster.find_team(name),
            None => Ok(None),
        }
    }

    fn members_of(&self, team: &Team) -> Result<Vec<Employee>, RosterError> {
        let mut members = Vec::with_capacity(team.members.len());
        for id in &team.members {
            match self.roster.find_employee(*id)? {
                Some(member) => members.push(member),
                None => warn!(employee_id = %id, team = %team.name, "team references missing employee"),
            }
        }
        Ok(members)
    }
}

fn sum_of_salaries(employees: &[Employee]) -> f64 {
    employees.iter().map(|employee| employee.salary).sum()
}

fn snapshot(team: &Team, members: &[Employee]) -> TeamSnapshot {
    let first_at = |level: EmployeeLevel| {
        members
            .iter()
            .find(|member| member.level == level)
            .map(Employee::member_view)
    };

    TeamSnapshot {
        team_name: team.name.clone(),
        members: members.iter().map(Employee::member_view).collect(),
        lead: first_at(EmployeeLevel::Lead),
        manager: first_at(EmployeeLevel::Manager),
    }
}

/// Ordered record writes for one operation. Commit replays them and, if a write fails, reverts
/// the ones already applied so the roster is left as it was.
#[derive(Debug, Default)]
struct WritePlan {
    steps: Vec<WriteStep>,
}

#[derive(Debug)]
enum WriteStep {
    SaveEmployee {
        record: Employee,
        previous: Option<Employee>,
    },
    DeleteEmployee(Employee),
    SaveTeam {
        record: Team,
        previous: Option<Team>,
    },
    DeleteTeam(Team),
}

impl WritePlan {
    fn save_employee(&mut self, record: Employee, previous: Option<Employee>) {
        self.steps.push(WriteStep::SaveEmployee { record, previous });
    }

    fn delete_employee(&mut self, record: Employee) {
        self.steps.push(WriteStep::DeleteEmployee(record));
    }

    fn save_team(&mut self, record: Team, previous: Option<Team>) {
        self.steps.push(WriteStep::SaveTeam { record, previous });
    }

    fn delete_team(&mut self, record: Team) {
        self.steps.push(WriteStep::DeleteTeam(record));
    }

    fn len(&self) -> usize {
        self.steps.len()
    }

    fn commit<R: Roster + ?Sized>(self, roster: &R) -> Result<(), RosterError> {
        let mut applied: Vec<WriteStep> = Vec::with_capacity(self.steps.len());
        for step in self.steps {
            if let Err(err) = step.apply(roster) {
                for done in applied.iter().rev() {
                    if let Err(revert_err) = done.revert(roster) {
                        warn!(error = %revert_err, step = ?done, "failed to revert roster write");
                    }
                }
                return Err(err);
            }
            applied.push(step);
        }
        Ok(())
    }
}

impl WriteStep {
    fn apply<R: Roster + ?Sized>(&self, roster: &R) -> Result<(), RosterError> {
        match self {
            WriteStep::SaveEmployee { record, .. } => roster.save_employee(record.clone()),
            WriteStep::DeleteEmployee(record) => roster.delete_employee(record.id),
            WriteStep::SaveTeam { record, .. } => roster.save_team(record.clone()),
            WriteStep::DeleteTeam(record) => roster.delete_team(&record.name),
        }
    }

    fn revert<R: Roster + ?Sized>(&self, roster: &R) -> Result<(), RosterError> {
        match self {
            WriteStep::SaveEmployee {
                previous: Some(previous),
                ..
            } => roster.save_employee(previous.clone()),
            WriteStep::SaveEmployee {
                record,
                previous: None,
            } => roster.delete_employee(record.id),
            WriteStep::DeleteEmployee(record) => roster.save_employee(record.clone()),
            WriteStep::SaveTeam {
                previous: Some(previous),
                ..
            } => roster.save_team(previous.clone()),
            WriteStep::SaveTeam {
                record,
                previous: None,
            } => roster.delete_team(&record.name),
            WriteStep::DeleteTeam(record) => roster.save_team(record.clone()),
        }
    }
}

/// Error raised by the company service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompanyServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}
