use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::AppError;
use crate::report::run_report;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Deal Engine",
    about = "Evaluate property listings against investor mandates from the command line",
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
    /// Evaluate a listings file against a stored mandate and print the report
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Mandate id to evaluate against
    pub(crate) mandate_id: String,
    /// Path to a JSON file containing an array of listings
    pub(crate) listings: PathBuf,
    /// Mandate store file (defaults to DEAL_STORE_PATH)
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Print the full per-listing analyses instead of the summary
    #[arg(long)]
    pub(crate) full: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
    }
}
