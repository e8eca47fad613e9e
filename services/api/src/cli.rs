use crate::rules::{print_default_rules, run_rules_test, RulesTestArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hai_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "hai-portal-api",
    about = "Serve the trading portal's approval-rules backend or exercise the rules locally",
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
    /// Inspect or dry-run approval rules without the core service
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Print the fallback rules document as JSON
    Defaults,
    /// Evaluate a candidate against the default rules or a rules JSON file
    Test(RulesTestArgs),
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
        Command::Rules {
            command: RulesCommand::Defaults,
        } => print_default_rules(),
        Command::Rules {
            command: RulesCommand::Test(args),
        } => run_rules_test(args),
    }
}
