use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use super::domain::{EmployeeId, EmployeeLevel, HireRequest, TeamName};
use super::roster::Roster;
use super::service::{CompanyService, CompanyServiceError};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Service(CompanyServiceError),
    Row {
        row: usize,
        source: RowError,
    },
}

/// Why a single data row could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("unknown employee level '{0}'")]
    Level(String),
    #[error("invalid hire date '{0}', expected YYYY-MM-DD")]
    HiredOn(String),
    #[error(transparent)]
    Rejected(#[from] CompanyServiceError),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster file: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Service(err) => write!(f, "roster unavailable for import: {}", err),
            RosterImportError::Row { row, source } => {
                write!(f, "roster row {} could not be imported: {}", row, source)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Service(err) => Some(err),
            RosterImportError::Row { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts of what an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub hired: usize,
    pub teams_created: usize,
    pub assigned: usize,
}

/// Seeds a roster from a CSV export by replaying each row through the company service.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P, R>(
        path: P,
        service: &CompanyService<R>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        P: AsRef<Path>,
        R: Roster + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service)
    }

    pub fn from_reader<I, R>(
        reader: I,
        service: &CompanyService<R>,
    ) -> Result<ImportSummary, RosterImportError>
    where
        I: Read,
        R: Roster + 'static,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut summary = ImportSummary::default();
        let mut known_teams: HashSet<TeamName> = service.list_teams()?.into_iter().collect();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            apply_row(row, service, &mut known_teams, &mut summary).map_err(|source| {
                RosterImportError::Row {
                    row: index + 1,
                    source,
                }
            })?;
        }

        info!(
            hired = summary.hired,
            teams_created = summary.teams_created,
            assigned = summary.assigned,
            "roster import finished"
        );
        Ok(summary)
    }
}

impl From<CompanyServiceError> for RosterImportError {
    fn from(err: CompanyServiceError) -> Self {
        Self::Service(err)
    }
}

fn apply_row<R: Roster + 'static>(
    row: RosterRow,
    service: &CompanyService<R>,
    known_teams: &mut HashSet<TeamName>,
    summary: &mut ImportSummary,
) -> Result<(), RowError> {
    let level = row
        .level
        .as_deref()
        .map(|raw| {
            raw.parse::<EmployeeLevel>()
                .map_err(|_| RowError::Level(raw.to_string()))
        })
        .transpose()?;
    let hired_on = row
        .hired_on
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RowError::HiredOn(raw.to_string()))
        })
        .transpose()?;

    let employee = service.hire(HireRequest {
        name: row.first_name,
        surname: row.last_name,
        salary: row.salary,
        level,
        hired_on,
    })?;
    summary.hired += 1;

    let Some(team) = row.team else {
        return Ok(());
    };

    let name = TeamName(team);
    let assigned = assign_team(&name, employee.id, service, known_teams, summary);
    if assigned.is_err() {
        // rows are all-or-nothing
        if let Err(err) = service.fire(employee.id) {
            warn!(employee_id = %employee.id, error = %err, "failed to undo hire of rejected row");
        } else {
            summary.hired -= 1;
        }
    }
    assigned
}

fn assign_team<R: Roster + 'static>(
    name: &TeamName,
    employee_id: EmployeeId,
    service: &CompanyService<R>,
    known_teams: &mut HashSet<TeamName>,
    summary: &mut ImportSummary,
) -> Result<(), RowError> {
    if !known_teams.contains(name) {
        service.create_team(name.as_str())?;
        known_teams.insert(name.clone());
        summary.teams_created += 1;
    }
    service.add_employee_to_team(employee_id, name.as_str())?;
    summary.assigned += 1;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    last_name: Option<String>,
    salary: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    team: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hired_on: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
