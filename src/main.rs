use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use synaptic::config::SynapticConfig;
use synaptic::graph::{reclassify_associations, GraphStore, RelationshipInference};
use synaptic::server;

#[derive(Parser)]
#[command(name = "synaptic", version, about = "Knowledge-graph memory MCP server for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport)
    Serve,
    /// Re-run relationship inference over every stored edge
    Reclassify {
        /// Override the configured confidence floor
        #[arg(long)]
        min_confidence: Option<f64>,
    },
    /// Print edge counts by relationship type
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = SynapticConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve_stdio(config).await?;
        }
        Command::Reclassify { min_confidence } => {
            let mut store = GraphStore::open(config.resolved_db_path())?;
            let engine = RelationshipInference::new(
                min_confidence.unwrap_or(config.graph.min_confidence),
            );
            let outcome =
                reclassify_associations(&mut store, &engine, config.graph.commit_interval)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Stats => {
            let store = GraphStore::open(config.resolved_db_path())?;
            let stats = store.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
