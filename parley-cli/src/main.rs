use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use parley_client::{DEFAULT_SIGNALING_URL, WsConnector, list_rooms};
use parley_core::RoomId;
use parley_server::ServerConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod chat;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Two-party chat over a direct peer-to-peer data channel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous server
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start an interactive chat session
    Chat {
        /// Room code to join; prompts when omitted
        #[arg(short, long)]
        room: Option<RoomId>,

        #[arg(long, env = "PARLEY_SIGNALING_URL", default_value = DEFAULT_SIGNALING_URL)]
        signaling_url: String,
    },
    /// List rooms known to the rendezvous server
    Rooms {
        #[arg(long, env = "PARLEY_SIGNALING_URL", default_value = DEFAULT_SIGNALING_URL)]
        signaling_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            init_tracing("info");

            let config = ServerConfig::load(config.as_deref())
                .context("Failed to load server configuration")?;
            println!(
                "{} {}",
                "📡 Rendezvous server on".green().bold(),
                config.bind_address
            );
            parley_server::serve(config).await?;
        }

        Commands::Chat {
            room,
            signaling_url,
        } => {
            // Keep the terminal for the conversation.
            init_tracing("warn");
            chat::run(room, signaling_url).await?;
        }

        Commands::Rooms { signaling_url } => {
            init_tracing("warn");
            print_rooms(&signaling_url).await?;
        }
    }

    Ok(())
}

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn print_rooms(signaling_url: &str) -> Result<()> {
    let connector = WsConnector::new(signaling_url);
    let rooms = list_rooms(&connector, Duration::from_secs(5))
        .await
        .with_context(|| format!("Failed to query {signaling_url}"))?;

    if rooms.is_empty() {
        println!("{}", "No open rooms.".dimmed());
        return Ok(());
    }

    for room in rooms {
        println!(
            "{}  {}/2  {}",
            room.id.to_string().cyan().bold(),
            room.member_count,
            room.members
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
                .dimmed()
        );
    }
    Ok(())
}
