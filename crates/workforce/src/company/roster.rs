use serde::Serialize;

use super::domain::{Employee, EmployeeId, EmployeeLevel, SalaryRange, Team, TeamName};

/// Storage abstraction holding employee and team records.
///
/// Each call is expected to be atomic for the record it touches. Multi-record consistency comes
/// from the service running every mutating operation inside [`Roster::atomically`].
pub trait Roster: Send + Sync {
    fn next_employee_id(&self) -> Result<EmployeeId, RosterError>;
    fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RosterError>;
    /// All employees when `level` is `None`.
    fn list_employees(&self, level: Option<EmployeeLevel>) -> Result<Vec<Employee>, RosterError>;
    fn save_employee(&self, employee: Employee) -> Result<(), RosterError>;
    fn delete_employee(&self, id: EmployeeId) -> Result<(), RosterError>;

    fn find_team(&self, name: &TeamName) -> Result<Option<Team>, RosterError>;
    fn list_teams(&self) -> Result<Vec<Team>, RosterError>;
    fn save_team(&self, team: Team) -> Result<(), RosterError>;
    fn delete_team(&self, name: &TeamName) -> Result<(), RosterError>;

    /// Run one whole business operation in isolation from other writers. Stores shared between
    /// threads must serialise `op` against every other `atomically` call; the default runs it
    /// inline.
    fn atomically<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T,
        Self: Sized,
    {
        op()
    }

    fn list_employees_by_salary(&self, range: SalaryRange) -> Result<Vec<Employee>, RosterError> {
        Ok(self
            .list_employees(None)?
            .into_iter()
            .filter(|employee| range.contains(employee.salary))
            .collect())
    }
}

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("record not found")]
    NotFound,
    #[error("roster unavailable: {0}")]
    Unavailable(String),
}

/// Envelope used by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMessage<T> {
    pub body: T,
    pub message: &'static str,
}

impl<T> ResponseMessage<T> {
    pub fn ok(body: T) -> Self {
        Self {
            body,
            message: "Response OK!",
        }
    }
}
