use crate::demo::{run_demo, run_import_report, DemoArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use workforce::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "workforce",
    about = "Run and explore the workforce rules service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through hiring, team building, raises and promotions against an in-memory roster
    Demo(DemoArgs),
    /// Load a roster CSV and print salary totals and team compositions
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Roster CSV to load before accepting requests
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Import(args) => run_import_report(args),
    }
}
