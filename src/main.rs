mod domain;
mod validation;
mod store;
mod remote;
mod messages;
mod actors;
mod clients;
mod view;
mod terminal;

mod app_system;
mod error;

#[cfg(test)]
mod mock_framework;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, Instrument};

use crate::app_system::{setup_tracing, Args, RegistryConfig, RegistrySystem};
use crate::terminal::TerminalSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(&args.log_level);

    let config = RegistryConfig::try_from(&args)?;
    info!(base_url = %config.base_url, "Starting employee registry");

    let system = RegistrySystem::new(&config)?;

    let mut session = TerminalSession::new(system.registry_client.clone(), BufReader::new(tokio::io::stdin()));
    let span = tracing::info_span!("terminal_session");
    session.run().instrument(span).await?;
    drop(session);

    system.shutdown().await.map_err(anyhow::Error::msg)?;

    info!("Employee registry stopped");
    Ok(())
}
