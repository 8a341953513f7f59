//! MCP server initialization for the stdio transport.
//!
//! Wires the graph store and MCP tool handler into a running server.

use crate::config::SynapticConfig;
use crate::graph::GraphStore;
use crate::tools::SynapticTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Open the graph store and wrap shared state for the tool handler.
fn setup_shared_state(
    config: SynapticConfig,
) -> Result<(Arc<Mutex<GraphStore>>, Arc<SynapticConfig>)> {
    let db_path = config.resolved_db_path();
    let store = GraphStore::open(&db_path)?;
    tracing::info!(db = %db_path.display(), "graph store ready");

    Ok((Arc::new(Mutex::new(store)), Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: SynapticConfig) -> Result<()> {
    tracing::info!("starting Synaptic MCP server on stdio");

    let (store, config) = setup_shared_state(config)?;

    let tools = SynapticTools::new(store, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running — waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
