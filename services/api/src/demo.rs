use crate::infra::InMemoryRoster;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use workforce::company::{
    CompanyService, CompanyServiceError, Employee, EmployeeLevel, HireRequest, MemberView, Roster,
    RosterImporter, TeamSnapshot,
};
use workforce::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Roster CSV to load before the scripted walkthrough runs.
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    /// Skip the raise and promotion portion of the demo.
    #[arg(long)]
    pub(crate) skip_pay_changes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Roster CSV with first_name,last_name,salary[,level,team,hired_on] columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Also list every employee at this level
    #[arg(long)]
    pub(crate) level: Option<EmployeeLevel>,
}

pub(crate) fn run_import_report(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { csv, level } = args;

    let service = CompanyService::new(Arc::new(InMemoryRoster::default()));
    let summary = RosterImporter::from_path(&csv, &service)?;
    println!(
        "Imported {} ({} hired, {} teams created, {} team assignments)",
        csv.display(),
        summary.hired,
        summary.teams_created,
        summary.assigned
    );

    render_company_report(&service)?;

    if let Some(level) = level {
        let employees = service.list_employees(Some(level))?;
        println!("\nEmployees at level {level}");
        if employees.is_empty() {
            println!("- none");
        }
        for employee in &employees {
            println!("- {}", describe(employee));
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed_csv,
        skip_pay_changes,
    } = args;

    let service = CompanyService::new(Arc::new(InMemoryRoster::default()));
    if let Some(path) = seed_csv {
        let summary = RosterImporter::from_path(&path, &service)?;
        println!(
            "Seeded roster from {} with {} employees",
            path.display(),
            summary.hired
        );
    }

    println!("Workforce demo");
    let jan = demo_hire(&service, "Jan", "Kowalski", 500.0, EmployeeLevel::Worker)?;
    let kasia = demo_hire(&service, "Kasia", "Nowak", 2500.0, EmployeeLevel::Worker)?;
    let iza = demo_hire(&service, "Iza", "Lesniak", 5000.0, EmployeeLevel::Manager)?;
    let piotr = demo_hire(&service, "Piotr", "Zajac", 3200.0, EmployeeLevel::Lead)?;
    let ola = demo_hire(&service, "Ola", "Sowa", 3600.0, EmployeeLevel::Lead)?;

    let team = service.create_team("Demo Squad")?;
    println!("\nCreated team '{}'", team.name);
    for employee in [&jan, &kasia, &iza, &piotr] {
        service.add_employee_to_team(employee.id, team.name.as_str())?;
        println!("- {} {} joined", employee.first_name, employee.last_name);
    }
    report_outcome(
        "Adding a second lead",
        service.add_employee_to_team(ola.id, team.name.as_str()),
    );

    if !skip_pay_changes {
        println!("\nPay changes");
        let raised = service.give_raise(jan.id, -5.0)?;
        println!(
            "- {} took a -5% adjustment: {:.2} -> {:.2}",
            jan.first_name, jan.salary, raised.salary
        );
        report_outcome("A -10% adjustment", service.give_raise(jan.id, -10.0));

        let promoted = service.give_promotion(iza.id)?;
        println!(
            "- {} promoted {} -> {} ({:.2})",
            iza.first_name, iza.level, promoted.level, promoted.salary
        );
        report_outcome(
            "Promoting a worker while the team has a lead",
            service.give_promotion(kasia.id),
        );
        service.remove_employee_from_team(kasia.id)?;
        let promoted = service.give_promotion(kasia.id)?;
        println!(
            "- {} left the team and was promoted to {} ({:.2})",
            kasia.first_name, promoted.level, promoted.salary
        );
        report_outcome("Promoting an executive", service.give_promotion(iza.id));
    }

    render_company_report(&service)?;
    Ok(())
}

fn demo_hire<R: Roster + 'static>(
    service: &CompanyService<R>,
    name: &str,
    surname: &str,
    salary: f64,
    level: EmployeeLevel,
) -> Result<Employee, CompanyServiceError> {
    let employee = service.hire(HireRequest::new(name, surname, salary).at_level(level))?;
    println!("Hired {}", describe(&employee));
    Ok(employee)
}

fn report_outcome<T>(action: &str, result: Result<T, CompanyServiceError>) {
    match result {
        Ok(_) => println!("- {action}: accepted"),
        Err(err) => println!("- {action}: rejected ({err})"),
    }
}

pub(crate) fn render_company_report<R: Roster + 'static>(
    service: &CompanyService<R>,
) -> Result<(), AppError> {
    println!("\nSalary totals by level");
    for level in EmployeeLevel::ALL {
        let headcount = service.list_employees(Some(level))?.len();
        if headcount == 0 {
            continue;
        }
        println!(
            "- {:<12} {:>3} employees | {:>12.2}",
            level.label(),
            headcount,
            service.salaries(level)?
        );
    }
    println!("Total payroll: {:.2}", service.summarize_salaries()?);

    let teams = service.list_teams()?;
    println!("\nTeams ({})", teams.len());
    for name in teams {
        let snapshot = service.team_info(name.as_str())?;
        render_team(&snapshot);
    }
    Ok(())
}

fn render_team(snapshot: &TeamSnapshot) {
    let seat = |view: &Option<MemberView>| {
        view.as_ref()
            .map(|member| format!("{} {}", member.name, member.surname))
            .unwrap_or_else(|| "vacant".to_string())
    };
    println!(
        "- {} | {} members | lead: {} | manager: {}",
        snapshot.team_name,
        snapshot.members.len(),
        seat(&snapshot.lead),
        seat(&snapshot.manager)
    );
    for member in &snapshot.members {
        println!("    {} {} ({:.2})", member.name, member.surname, member.salary);
    }
}

fn describe(employee: &Employee) -> String {
    format!(
        "#{} {} {} [{}] {:.2}",
        employee.id, employee.first_name, employee.last_name, employee.level, employee.salary
    )
}
