mod compose;
mod config;
mod credentials;
mod handler;
mod model;
mod notify;
mod ping;
mod providers;
mod server;
#[cfg(test)]
mod testutil;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use compose::MessageComposer;
use credentials::EnvCredentials;
use handler::Relay;
use notify::google_chat::GoogleChatNotifier;
use providers::github::GitHubBoardClient;
use providers::CardSource;

/// Posts the number of pull requests awaiting review to a chat space.
#[derive(Parser)]
#[command(name = "review-relay", version)]
struct Cli {
    /// Config file (defaults to ~/.review-relay/config.toml)
    #[arg(long, global = true, env = "REVIEW_RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP trigger endpoint
    Serve {
        /// Address to listen on, overrides [server].listen
        #[arg(long)]
        listen: Option<String>,
    },
    /// Ask a running relay to post the count to a space
    Ping {
        /// Chat space to respond to, e.g. ABC123 or spaces/ABC123
        #[arg(long)]
        space: String,

        /// Relay endpoint, overrides [ping].endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Print the cards currently waiting in the review column
    Cards,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { listen } => {
            let relay = Relay::new(
                Arc::new(GitHubBoardClient::new(&config.github, &EnvCredentials)?),
                MessageComposer::new(config.message.reference_url.clone()),
                Arc::new(GoogleChatNotifier::new(&config.chat, &EnvCredentials)?),
            );
            let listen = listen.unwrap_or(config.server.listen);
            info!(
                organization = %config.github.organization,
                project = %config.github.project,
                column = %config.github.column,
                "Starting review relay"
            );
            server::serve(Arc::new(relay), &listen).await?;
        }
        Commands::Ping { space, endpoint } => {
            let endpoint = endpoint.unwrap_or(config.ping.endpoint);
            if let Err(e) = ping::ping_endpoint(&endpoint, &space).await {
                error!(space = %space, error = %format!("{e:#}"), "Error pinging relay endpoint");
                return Err(e);
            }
        }
        Commands::Cards => {
            let client = GitHubBoardClient::new(&config.github, &EnvCredentials)?;
            let cards = client.retrieve_cards().await?;
            let out = serde_json::to_string_pretty(&cards).context("Failed to serialize cards")?;
            println!("{out}");
        }
    }

    Ok(())
}
