use crate::console::{run_console, ConsoleArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use inaproperty::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "INA Property Request Desk",
    about = "Run the INA Property request desk and operate its admin console",
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
    /// List and decide account requests on a running server
    Console(ConsoleArgs),
    /// Run an offline walkthrough of the request lifecycle and contact relay
    Demo(DemoArgs),
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
        Command::Console(args) => run_console(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
