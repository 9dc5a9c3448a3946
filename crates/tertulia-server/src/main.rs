//! CLI entry point for the tertulia HTTP server.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tertulia_graph::{GraphClient, LibraryGraph};
use tertulia_server::config::load_config;
use tertulia_server::run_server;
use tertulia_server::state::AppState;

#[derive(Parser)]
#[command(name = "tertulia-server")]
#[command(about = "REST API for the Tertulia book-club graph")]
struct Cli {
    /// Config file prefix (default: tertulia, i.e. tertulia.toml).
    #[arg(short, long, default_value = "tertulia")]
    config: String,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut app_config = load_config(&cli.config)?;
    if let Some(host) = cli.host {
        app_config.server.host = host;
    }
    if let Some(port) = cli.port {
        app_config.server.port = port;
    }

    // The server stays up without a database; data endpoints then answer 500.
    let state = match GraphClient::connect(&app_config.neo4j).await {
        Ok(client) => {
            let graph = LibraryGraph::from_client(client);
            if app_config.server.init_schema {
                if let Err(e) = graph.initialize_schema().await {
                    tracing::warn!(error = %e, "Schema initialization failed");
                }
            }
            AppState::connected(graph)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                uri = %app_config.neo4j.uri,
                "Could not connect to Neo4j"
            );
            AppState::unavailable()
        }
    };

    run_server(state, &app_config.server).await
}
