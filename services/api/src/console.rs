use crate::infra::{http_client, parse_kind};
use clap::{Args, Subcommand};
use inaproperty::config::AppConfig;
use inaproperty::error::AppError;
use inaproperty::workflows::console::{render_text, AdminConsole, HttpConsoleBackend};
use inaproperty::workflows::requests::{Decision, RequestId, RequestKind};
use std::net::{IpAddr, Ipv4Addr};

#[derive(Args, Debug)]
pub(crate) struct ConsoleArgs {
    /// Base URL of a running request desk (defaults to the configured APP_HOST/APP_PORT)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    #[command(subcommand)]
    pub(crate) command: ConsoleCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConsoleCommand {
    /// Show the requests in one tab
    List {
        /// Tab to display: university or individual
        #[arg(long, value_parser = parse_kind, default_value = "university")]
        tab: RequestKind,
    },
    /// Approve a request, then show its tab
    Approve(DecisionTarget),
    /// Reject a request, then show its tab
    Reject(DecisionTarget),
}

#[derive(Args, Debug)]
pub(crate) struct DecisionTarget {
    /// Request kind: university or individual
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: RequestKind,
    /// Request id as shown by `console list`
    pub(crate) id: String,
}

pub(crate) async fn run_console(args: ConsoleArgs) -> Result<(), AppError> {
    let base_url = match args.base_url {
        Some(url) => url,
        None => configured_base_url(&AppConfig::load()?)?,
    };
    let mut console = AdminConsole::new(HttpConsoleBackend::new(http_client()?, base_url));

    match args.command {
        ConsoleCommand::List { tab } => {
            console.select_tab(tab);
            console.refresh().await;
        }
        ConsoleCommand::Approve(target) => decide(&mut console, target, Decision::Approve).await,
        ConsoleCommand::Reject(target) => decide(&mut console, target, Decision::Reject).await,
    }

    print!("{}", render_text(&console.view()));
    Ok(())
}

async fn decide(
    console: &mut AdminConsole<HttpConsoleBackend>,
    target: DecisionTarget,
    decision: Decision,
) {
    console.select_tab(target.kind);
    let id = RequestId(target.id);
    if console.decide(target.kind, &id, decision).await {
        println!("{} request {id} {}", target.kind.label(), decision.past_tense());
    } else {
        println!(
            "Could not {} {} request {id}; showing current state",
            decision.verb(),
            target.kind.slug()
        );
    }
}

fn configured_base_url(config: &AppConfig) -> Result<String, AppError> {
    let mut addr = config.server.socket_addr()?;
    if addr.ip().is_unspecified() {
        addr.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    Ok(format!("http://{addr}"))
}
