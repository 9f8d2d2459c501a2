//! # Civitas CLI
//!
//! Inspect the persisted session and read the backend from a terminal.
//!
//! ```text
//! civitas status                 # session, endpoint, backend reachability
//! civitas projects               # list projects
//! civitas polls [--project ID]   # list polls, optionally for one project
//! civitas logout                 # forget the persisted session
//! ```
//!
//! Signing in needs the web client; the CLI reuses the session it persisted.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use client_runtime::{init_logging, ClientConfig, ClientContainer, LogSettings};
use cv_03_session_manager::{IdentitySessionApi, RestoreOutcome, SessionPhase};
use cv_04_actor_gateway::ActorGatewayApi;
use cv_05_request_orchestrator::CivitasApi;
use shared_types::ClientError;

/// Civitas client
#[derive(Parser, Debug)]
#[command(name = "civitas", version)]
#[command(about = "Civitas client: session status and backend reads")]
struct Args {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the session, the configured endpoint and whether the backend answers
    Status,
    /// List projects
    Projects,
    /// List polls
    Polls {
        /// Only polls of this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Forget the persisted session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&LogSettings::from_env()).context("failed to initialize logging")?;
    let config = ClientConfig::from_env().context("invalid configuration")?;
    let container = ClientContainer::new(config).context("failed to start client")?;
    let restored = container.start().await;

    match args.command {
        Command::Status => status(&container, restored, args.json).await,
        Command::Projects => {
            container.config.validate()?;
            let projects = container
                .orchestrator
                .list_projects()
                .await
                .map_err(ClientError::from)?;
            print(&projects, args.json, |p| {
                format!("#{:<4} {}  (owner {})", p.id, p.name, p.owner)
            })
        }
        Command::Polls { project } => {
            container.config.validate()?;
            let polls = container
                .orchestrator
                .list_polls(project.as_deref())
                .await
                .map_err(ClientError::from)?;
            print(&polls, args.json, |p| {
                let tallies: Vec<String> = p
                    .options
                    .iter()
                    .zip(&p.tallies)
                    .map(|(option, votes)| format!("{option}: {votes}"))
                    .collect();
                format!(
                    "#{:<4} {}  [{}]  closes {}",
                    p.id,
                    p.title,
                    tallies.join(", "),
                    p.closes_at
                )
            })
        }
        Command::Logout => {
            container.session.logout().await;
            println!("signed out");
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct StatusReport {
    network: String,
    endpoint: Option<String>,
    session: String,
    restore: Option<RestoreOutcome>,
    backend: String,
}

async fn status(
    container: &ClientContainer,
    restore: Option<RestoreOutcome>,
    json: bool,
) -> Result<()> {
    let endpoint = container.config.endpoint.resolve();
    let backend = match &endpoint {
        Ok(endpoint) => match container.gateway.get_actor(endpoint, None).await {
            Ok(_) => "reachable".to_string(),
            Err(e) => format!("unreachable ({})", ClientError::from(e)),
        },
        Err(e) => format!("not configured ({e})"),
    };
    let session = match container.session.phase() {
        SessionPhase::Authenticated(principal) => format!("signed in as {principal}"),
        SessionPhase::Authenticating(provider) => format!("signing in with {provider}"),
        SessionPhase::Unauthenticated => "signed out".to_string(),
    };
    let report = StatusReport {
        network: container.config.target.to_string(),
        endpoint: endpoint.ok().map(|e| e.to_string()),
        session,
        restore,
        backend,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("network:  {}", report.network);
        println!(
            "endpoint: {}",
            report.endpoint.as_deref().unwrap_or("(not configured)")
        );
        println!("session:  {}", report.session);
        println!("backend:  {}", report.backend);
    }
    Ok(())
}

fn print<T: Serialize>(items: &[T], json: bool, line: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("(none)");
    } else {
        for item in items {
            println!("{}", line(item));
        }
    }
    Ok(())
}
