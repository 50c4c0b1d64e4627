use super::domain::{Employee, EmployeeId, EmployeeLevel, HireRequest, Team, TeamName};

/// Upper bound on team membership.
pub const MAX_TEAM_SIZE: usize = 6;

pub const MIN_RAISE_PERCENT: f64 = -5.0;
pub const MAX_RAISE_PERCENT: f64 = 100.0;

/// Business-rule violations. Every rejected operation reports exactly one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("employee name and surname are required")]
    MissingName,
    #[error("salary must be a finite, non-negative amount (found {0})")]
    InvalidSalary(f64),
    #[error("employee id is required")]
    MissingEmployeeId,
    #[error("employee {0} does not exist")]
    UnknownEmployee(EmployeeId),
    #[error("team name is required")]
    MissingTeamName,
    #[error("team '{0}' already exists")]
    DuplicateTeam(TeamName),
    #[error("team '{0}' does not exist")]
    UnknownTeam(TeamName),
    #[error("raise of {0}% is outside the allowed range of -5% to 100%")]
    RaiseOutOfRange(f64),
    #[error("employees at level {0} cannot be promoted")]
    TerminalLevel(EmployeeLevel),
    #[error("employee level is required")]
    MissingLevel,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Composition(#[from] CompositionViolation),
}

/// Team composition rules broken by an admission attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionViolation {
    #[error("employee {employee} already belongs to team '{team}'")]
    AlreadyAssigned { employee: EmployeeId, team: TeamName },
    #[error("team '{0}' is full")]
    TeamFull(TeamName),
    #[error("team '{0}' already has a lead")]
    LeadTaken(TeamName),
    #[error("team '{0}' already has a manager")]
    ManagerTaken(TeamName),
}

/// Percentage change to a salary, restricted to the closed range [-5, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaisePercent(f64);

impl RaisePercent {
    pub fn new(percent: f64) -> Result<Self, ValidationError> {
        if (MIN_RAISE_PERCENT..=MAX_RAISE_PERCENT).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(ValidationError::RaiseOutOfRange(percent))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn apply(self, salary: f64) -> f64 {
        salary * (1.0 + self.0 / 100.0)
    }

    /// [`apply`](Self::apply), rejecting a result that is no longer a finite amount.
    pub fn raise_salary(self, salary: f64) -> Result<f64, ValidationError> {
        let raised = self.apply(salary);
        if raised.is_finite() {
            Ok(raised)
        } else {
            Err(ValidationError::InvalidSalary(raised))
        }
    }
}

/// One row of the promotion table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Promotion {
    pub to: EmployeeLevel,
    pub raise: RaisePercent,
}

const PROMOTION_RAISE: RaisePercent = RaisePercent(5.0);
const EXECUTIVE_RAISE: RaisePercent = RaisePercent(3.0);

/// Next level and accompanying raise for `level`, or `None` when the level is terminal.
pub const fn promotion_for(level: EmployeeLevel) -> Option<Promotion> {
    match level {
        EmployeeLevel::Worker => Some(Promotion {
            to: EmployeeLevel::Lead,
            raise: PROMOTION_RAISE,
        }),
        EmployeeLevel::Lead | EmployeeLevel::Sales | EmployeeLevel::Accounting => {
            Some(Promotion {
                to: EmployeeLevel::Manager,
                raise: PROMOTION_RAISE,
            })
        }
        EmployeeLevel::Manager => Some(Promotion {
            to: EmployeeLevel::Executive,
            raise: EXECUTIVE_RAISE,
        }),
        EmployeeLevel::Executive | EmployeeLevel::Independent => None,
    }
}

/// Apply the promotion table to `employee` without persisting anything.
pub fn promote(employee: &Employee) -> Result<Employee, ValidationError> {
    let promotion =
        promotion_for(employee.level).ok_or(ValidationError::TerminalLevel(employee.level))?;
    let mut promoted = employee.clone();
    promoted.level = promotion.to;
    promoted.salary = promotion.raise.raise_salary(employee.salary)?;
    Ok(promoted)
}

/// Validated pieces of a hire request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HireDraft {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) salary: f64,
    pub(crate) level: EmployeeLevel,
}

pub(crate) fn validate_hire(request: &HireRequest) -> Result<HireDraft, ValidationError> {
    let first_name = present(request.name.as_deref()).ok_or(ValidationError::MissingName)?;
    let last_name = present(request.surname.as_deref()).ok_or(ValidationError::MissingName)?;

    if !request.salary.is_finite() || request.salary < 0.0 {
        return Err(ValidationError::InvalidSalary(request.salary));
    }

    Ok(HireDraft {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        salary: request.salary,
        level: request.level.unwrap_or(EmployeeLevel::Worker),
    })
}

pub(crate) fn validate_team_name(name: &str) -> Result<TeamName, ValidationError> {
    present(Some(name))
        .map(|name| TeamName(name.to_string()))
        .ok_or(ValidationError::MissingTeamName)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Check whether `candidate` may join `team`, given the team's current `members`.
pub fn check_admission(
    team: &Team,
    members: &[Employee],
    candidate: &Employee,
) -> Result<(), CompositionViolation> {
    if let Some(current) = &candidate.team {
        return Err(CompositionViolation::AlreadyAssigned {
            employee: candidate.id,
            team: current.clone(),
        });
    }

    if team.members.len() >= MAX_TEAM_SIZE {
        return Err(CompositionViolation::TeamFull(team.name.clone()));
    }

    check_single_seat(team, members, candidate)
}

/// Check that `promoted` can keep its seat on `team` at its new level. `members` may include
/// the employee's own record at the previous level.
pub fn check_promotion_fit(
    team: &Team,
    members: &[Employee],
    promoted: &Employee,
) -> Result<(), CompositionViolation> {
    let others: Vec<Employee> = members
        .iter()
        .filter(|member| member.id != promoted.id)
        .cloned()
        .collect();
    check_single_seat(team, &others, promoted)
}

// LEAD and MANAGER are single seats per team.
fn check_single_seat(
    team: &Team,
    others: &[Employee],
    employee: &Employee,
) -> Result<(), CompositionViolation> {
    let has_level = |level: EmployeeLevel| others.iter().any(|member| member.level == level);
    match employee.level {
        EmployeeLevel::Lead if has_level(EmployeeLevel::Lead) => {
            Err(CompositionViolation::LeadTaken(team.name.clone()))
        }
        EmployeeLevel::Manager if has_level(EmployeeLevel::Manager) => {
            Err(CompositionViolation::ManagerTaken(team.name.clone()))
        }
        _ => Ok(()),
    }
}
