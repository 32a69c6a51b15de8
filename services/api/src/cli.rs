use crate::infra::parse_status;
use crate::report::{run_analytics, run_board, run_dashboard, run_delete, run_move};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_board::board::ApplicationStatus;
use job_board::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Job Board",
    about = "Track job applications across a status board backed by the application store",
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
    /// Print the board grouped by pipeline status
    Board,
    /// Print headline totals and the most recent applications
    Dashboard,
    /// Print status, work model, and monthly breakdowns
    Analytics,
    /// Move an application to another pipeline status
    Move(MoveArgs),
    /// Delete an application from the store
    Delete(DeleteArgs),
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
pub(crate) struct MoveArgs {
    /// Application id as stored by the application store
    #[arg(long)]
    pub(crate) id: u64,
    /// Target status (To Apply, Applied, Interview, Offer, Rejected)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: ApplicationStatus,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    /// Application id as stored by the application store
    #[arg(long)]
    pub(crate) id: u64,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Board => run_board().await,
        Command::Dashboard => run_dashboard().await,
        Command::Analytics => run_analytics().await,
        Command::Move(args) => run_move(args).await,
        Command::Delete(args) => run_delete(args).await,
    }
}
