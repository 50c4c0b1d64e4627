//! Workforce rules: hiring, team composition, raises and promotions.
//!
//! [`CompanyService`] is the only place records change. It reads current state from a
//! [`Roster`], validates the request against the rules in [`rules`], and writes the result back.
//! The roster is injected so storage can be swapped for in-memory fakes in tests.

pub mod domain;
pub mod import;
pub mod roster;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Employee, EmployeeId, EmployeeLevel, HireRequest, MemberView, SalaryRange, Team, TeamName,
    TeamSnapshot, UnknownLevel,
};
pub use import::{ImportSummary, RosterImportError, RosterImporter, RowError};
pub use roster::{ResponseMessage, Roster, RosterError};
pub use router::company_router;
pub use rules::{
    promotion_for, CompositionViolation, Promotion, RaisePercent, ValidationError, MAX_TEAM_SIZE,
};
pub use service::{CompanyService, CompanyServiceError};
