use crate::catalog::{run_catalog_check, CatalogCheckArgs};
use crate::interactive::{run_assessment, AssessArgs};
use crate::sample::{run_sample, SampleArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use strainpoint::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "strainpoint",
    about = "Run the adaptive relationship assessment as a service or from the terminal",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Take the assessment interactively; progress is saved after every answer
    Assess(AssessArgs),
    /// Run a session with random answers and print the report
    Sample(SampleArgs),
    /// Inspect catalog and strategy data
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum CatalogCommand {
    /// Validate the catalog and report coverage gaps
    Check(CatalogCheckArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assessment(args),
        Command::Sample(args) => run_sample(args),
        Command::Catalog {
            command: CatalogCommand::Check(args),
        } => run_catalog_check(args),
    }
}
