//! Live Chat Server
//!
//! Run with: cargo run -- [--config PATH] [--port 3000] [--no-echo]
//!
//! # Configuration
//!
//! Settings come from (lowest to highest precedence) built-in defaults, a
//! TOML file, `LIVECHAT_*` environment variables and command-line flags.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use livechat::config::{generate_default_config, Config, LoggingConfig};
use livechat::{serve, AppState};

#[derive(Parser)]
#[command(name = "livechat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "WebSocket chat server that broadcasts every message to all clients")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Do not send messages back to the client that sent them
    #[arg(long, global = true)]
    pub no_echo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the chat server (default)
    Serve,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { output }) => write_default_config(output),
        Some(Commands::Serve) | None => run_server(&cli).await,
    }
}

async fn run_server(cli: &Cli) -> anyhow::Result<()> {
    let loaded = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    let mut config = loaded.config.clone();

    // Command-line flags take precedence over file and environment
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_echo {
        config.relay.echo_to_sender = false;
    }

    init_tracing(&config.logging);
    loaded.log_diagnostics();

    tracing::info!("Starting live chat server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Echo to sender: {}", config.relay.echo_to_sender);

    let state = AppState::with_hub_config(config.server, config.relay.hub_config());
    serve(state).await?;

    tracing::info!("Live chat server stopped");
    Ok(())
}

/// Initialize tracing from the logging section, letting RUST_LOG win
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("livechat={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn write_default_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();

    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("Config written to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
