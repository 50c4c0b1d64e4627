use super::common::*;
use crate::company::domain::{EmployeeLevel, SalaryRange};
use crate::company::roster::Roster;
use crate::company::{ImportSummary, RosterImportError, RosterImporter, RowError};

const ROSTER_CSV: &str = "\
first_name,last_name,salary,level,team,hired_on
Jan,Kowalski,500,worker,Alpha,2023-01-15
Kasia,Nowak,2500,LEAD,Alpha,
Iza,Lesniak,5000,Manager,Beta,2021-06-01
Zbigniew,Lech,3000,independent,,
";

#[test]
fn imports_employees_and_teams() {
    let (service, roster) = build_service();

    let summary =
        RosterImporter::from_reader(ROSTER_CSV.as_bytes(), &service).expect("import succeeds");

    assert_eq!(
        summary,
        ImportSummary {
            hired: 4,
            teams_created: 2,
            assigned: 3,
        }
    );
    assert_eq!(
        service.list_teams().expect("teams").len(),
        2
    );
    let alpha = service.team_info("Alpha").expect("alpha exists");
    assert_eq!(alpha.members.len(), 2);
    assert_eq!(alpha.lead.expect("lead").name, "Kasia");

    let independents = roster
        .list_employees(Some(EmployeeLevel::Independent))
        .expect("list");
    assert_eq!(independents.len(), 1);
    assert!(independents[0].team.is_none());
    assert_close(service.summarize_salaries().expect("total"), 11_000.0);
}

#[test]
fn parses_hire_dates_when_present() {
    let (service, _) = build_service();
    RosterImporter::from_reader(ROSTER_CSV.as_bytes(), &service).expect("import succeeds");

    let jan = service
        .list_employees_by_salary(SalaryRange::new(Some(499.0), Some(501.0)))
        .expect("query")
        .pop()
        .expect("jan imported");
    assert_eq!(jan.hired_on.to_string(), "2023-01-15");
}

#[test]
fn reuses_existing_teams() {
    let (service, _) = build_service();
    service.create_team("Alpha").expect("team created");

    let summary = RosterImporter::from_reader(ROSTER_CSV.as_bytes(), &service)
        .expect("import succeeds");

    assert_eq!(summary.teams_created, 1);
}

#[test]
fn unknown_level_reports_row_number() {
    let (service, _) = build_service();
    let csv = "\
first_name,last_name,salary,level
Jan,Kowalski,500,WORKER
Kasia,Nowak,2500,INTERN
";

    let err = RosterImporter::from_reader(csv.as_bytes(), &service).expect_err("bad level");

    match err {
        RosterImportError::Row {
            row,
            source: RowError::Level(level),
        } => {
            assert_eq!(row, 2);
            assert_eq!(level, "INTERN");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.list_employees(None).expect("list").len(), 1);
}

#[test]
fn rejected_team_assignment_undoes_the_hire() {
    let (service, roster) = build_service();
    let csv = "\
first_name,last_name,salary,level,team
Jan,Kowalski,500,LEAD,Alpha
Kasia,Nowak,2500,LEAD,Alpha
";

    let err = RosterImporter::from_reader(csv.as_bytes(), &service).expect_err("second lead");

    assert!(matches!(
        err,
        RosterImportError::Row {
            row: 2,
            source: RowError::Rejected(_),
        }
    ));
    let employees = roster.list_employees(None).expect("list");
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].first_name, "Jan");
    assert_eq!(roster.team("Alpha").expect("alpha").members.len(), 1);
}

#[test]
fn malformed_salary_is_a_csv_error() {
    let (service, _) = build_service();
    let csv = "first_name,last_name,salary\nJan,Kowalski,lots\n";

    let err = RosterImporter::from_reader(csv.as_bytes(), &service).expect_err("bad salary");

    assert!(matches!(err, RosterImportError::Csv(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let (service, _) = build_service();

    let err = RosterImporter::from_path("/nonexistent/roster.csv", &service)
        .expect_err("file missing");

    assert!(matches!(err, RosterImportError::Io(_)));
}
