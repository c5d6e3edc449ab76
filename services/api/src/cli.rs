use crate::demo::{run_assessment, run_demo, AssessArgs, DemoArgs};
use crate::server;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use pathway::config::AppConfig;
use pathway::error::AppError;
use pathway::workflows::identity::{CurrentUser, SignedSessionProvider, UserId};

#[derive(Parser, Debug)]
#[command(
    name = "Pathway",
    about = "Run the eligibility and consultation booking service from the command line",
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
    /// Score a questionnaire answer file without storing it
    Assess(AssessArgs),
    /// Walk a synthetic visitor from sign-in to a scheduled consultation
    Demo(DemoArgs),
    /// Session token utilities
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Issue a bearer token signed with the configured session secret
    Issue(IssueArgs),
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
struct IssueArgs {
    #[arg(long)]
    user_id: String,
    #[arg(long)]
    email: String,
    /// Display name used to prefill the scheduler
    #[arg(long)]
    name: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assessment(args),
        Command::Demo(args) => run_demo(args),
        Command::Session {
            command: SessionCommand::Issue(args),
        } => issue_session(args),
    }
}

fn issue_session(args: IssueArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let provider = SignedSessionProvider::new(&config.identity.session_secret);
    let token = provider.issue(
        &CurrentUser {
            id: UserId(args.user_id),
            email: args.email,
            full_name: args.name,
        },
        Utc::now(),
    )?;
    println!("{token}");
    Ok(())
}
