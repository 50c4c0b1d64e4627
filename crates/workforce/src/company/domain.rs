use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable identifier assigned to an employee at hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, immutable team name. Employees reference their team through it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(pub String);

impl TeamName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seniority classification, declared in promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum EmployeeLevel {
    Worker,
    Lead,
    Sales,
    Accounting,
    Manager,
    Executive,
    Independent,
}

impl EmployeeLevel {
    pub const ALL: [EmployeeLevel; 7] = [
        EmployeeLevel::Worker,
        EmployeeLevel::Lead,
        EmployeeLevel::Sales,
        EmployeeLevel::Accounting,
        EmployeeLevel::Manager,
        EmployeeLevel::Executive,
        EmployeeLevel::Independent,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmployeeLevel::Worker => "WORKER",
            EmployeeLevel::Lead => "LEAD",
            EmployeeLevel::Sales => "SALES",
            EmployeeLevel::Accounting => "ACCOUNTING",
            EmployeeLevel::Manager => "MANAGER",
            EmployeeLevel::Executive => "EXECUTIVE",
            EmployeeLevel::Independent => "INDEPENDENT",
        }
    }
}

impl fmt::Display for EmployeeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown employee level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for EmployeeLevel {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        EmployeeLevel::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownLevel(trimmed.to_string()))
    }
}

impl TryFrom<String> for EmployeeLevel {
    type Error = UnknownLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Employee record as held by the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub salary: f64,
    pub level: EmployeeLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamName>,
    pub hired_on: NaiveDate,
}

impl Employee {
    pub fn member_view(&self) -> MemberView {
        MemberView {
            name: self.first_name.clone(),
            surname: self.last_name.clone(),
            salary: self.salary,
        }
    }
}

/// Team record. The team owns its member set; members point back by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: TeamName,
    pub members: BTreeSet<EmployeeId>,
}

impl Team {
    pub fn new(name: TeamName) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
        }
    }
}

/// Hiring payload. Name and surname are optional here so that absence is a validation failure
/// rather than a decoding failure. A missing salary reads as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HireRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub level: Option<EmployeeLevel>,
    #[serde(default)]
    pub hired_on: Option<NaiveDate>,
}

impl HireRequest {
    pub fn new(name: impl Into<String>, surname: impl Into<String>, salary: f64) -> Self {
        Self {
            name: Some(name.into()),
            surname: Some(surname.into()),
            salary,
            level: None,
            hired_on: None,
        }
    }

    pub fn at_level(mut self, level: EmployeeLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// Name/surname/salary tuple exposed in team listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    pub name: String,
    pub surname: String,
    pub salary: f64,
}

/// Read model returned by `team_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub team_name: TeamName,
    pub members: Vec<MemberView>,
    pub lead: Option<MemberView>,
    pub manager: Option<MemberView>,
}

/// Salary filter with strict bounds on both sides.
///
/// A missing lower bound behaves as `0` and a missing upper bound as unbounded, so an empty
/// range matches every employee with a positive salary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub from: Option<f64>,
    #[serde(default)]
    pub to: Option<f64>,
}

impl SalaryRange {
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { from, to }
    }

    pub fn lower(&self) -> f64 {
        self.from.unwrap_or(0.0)
    }

    pub fn upper(&self) -> f64 {
        self.to.unwrap_or(f64::INFINITY)
    }

    pub fn contains(&self, salary: f64) -> bool {
        salary > self.lower() && salary < self.upper()
    }
}
