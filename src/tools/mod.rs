pub mod find_connected;
pub mod shortest_path;
pub mod store_association;
pub mod subgraph;

use find_connected::FindConnectedParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use shortest_path::ShortestPathParams;
use std::sync::{Arc, Mutex};
use store_association::StoreAssociationParams;
use subgraph::SubgraphParams;

use crate::config::SynapticConfig;
use crate::graph::{Association, Direction, GraphStore, RelationshipType, SemanticReasoner};

/// The Synaptic MCP tool handler. Holds shared state (graph store, config)
/// and exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct SynapticTools {
    tool_router: ToolRouter<Self>,
    store: Arc<Mutex<GraphStore>>,
    config: Arc<SynapticConfig>,
}

#[tool_router]
impl SynapticTools {
    pub fn new(store: Arc<Mutex<GraphStore>>, config: Arc<SynapticConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            config,
        }
    }

    /// Store a typed association between two memories.
    #[tool(description = "Create or update a typed association between two memories. Types: related (default), contradicts, causes, fixes, supports, follows.")]
    async fn store_association(
        &self,
        Parameters(params): Parameters<StoreAssociationParams>,
    ) -> Result<String, String> {
        // 1. Validate inputs through the Association choke point
        let relationship_type = match &params.relationship_type {
            Some(s) => s.parse::<RelationshipType>().map_err(|e: String| e)?,
            None => RelationshipType::default(),
        };
        let assoc = Association::new(
            params.source_hash,
            params.target_hash,
            params.similarity,
            params.connection_types,
            relationship_type,
            params.metadata,
        )
        .map_err(|e| e.to_string())?;

        tracing::info!(
            source = assoc.source_hash(),
            target = assoc.target_hash(),
            relationship = %assoc.relationship_type(),
            "store_association called"
        );

        // 2. Run the upsert (sync DB ops → spawn_blocking)
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
            store
                .store_association(&assoc)
                .map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("store failed: {e}"))?;

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Find memories connected to a starting memory.
    #[tool(description = "Find memories connected to a memory via graph traversal. Supports relationship-type filtering, direction (outgoing/incoming/both), and multi-hop search.")]
    async fn find_connected_memories(
        &self,
        Parameters(params): Parameters<FindConnectedParams>,
    ) -> Result<String, String> {
        let relationship_type = params
            .relationship_type
            .as_deref()
            .map(str::parse::<RelationshipType>)
            .transpose()
            .map_err(|e: String| e)?;
        let direction = params
            .direction
            .as_deref()
            .map(str::parse::<Direction>)
            .transpose()
            .map_err(|e: String| e)?
            .unwrap_or_default();
        let max_hops = params.max_hops.unwrap_or(self.config.graph.default_max_hops);

        tracing::info!(
            node = %params.memory_hash,
            ?direction,
            max_hops,
            "find_connected_memories called"
        );

        let store = Arc::clone(&self.store);
        let node = params.memory_hash;
        let neighbors = tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
            store
                .find_connected(&node, relationship_type, direction, max_hops)
                .map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("traversal failed: {e}"))?;

        let total = neighbors.len();
        serde_json::to_string(&serde_json::json!({
            "connected": neighbors,
            "total": total,
        }))
        .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Find the highest-similarity path between two memories.
    #[tool(description = "Find the shortest path between two memories, weighting edges by 1 - similarity so high-similarity chains win.")]
    async fn find_shortest_path(
        &self,
        Parameters(params): Parameters<ShortestPathParams>,
    ) -> Result<String, String> {
        let relationship_types = params
            .relationship_types
            .as_deref()
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.parse::<RelationshipType>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e: String| e)?;

        tracing::info!(
            start = %params.start_hash,
            end = %params.end_hash,
            "find_shortest_path called"
        );

        let store = Arc::clone(&self.store);
        let (start, end) = (params.start_hash, params.end_hash);
        let path = tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
            // Route through the reasoner so directional semantics stay in one place
            let reasoner = SemanticReasoner::new(&*store);
            reasoner
                .shortest_path(&start, &end, relationship_types.as_deref())
                .map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("path search failed: {e}"))?;

        // Unreachable is a normal "not found" result, not an error
        serde_json::to_string(&serde_json::json!({
            "found": path.is_some(),
            "path": path,
        }))
        .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Extract the subgraph around a memory for visualization or export.
    #[tool(description = "Extract the induced subgraph (nodes and edges) within a hop radius of a memory.")]
    async fn get_memory_subgraph(
        &self,
        Parameters(params): Parameters<SubgraphParams>,
    ) -> Result<String, String> {
        let max_hops = params.max_hops.unwrap_or(self.config.graph.default_max_hops);

        tracing::info!(center = %params.center_hash, max_hops, "get_memory_subgraph called");

        let store = Arc::clone(&self.store);
        let center = params.center_hash;
        let subgraph = tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
            store
                .get_memory_subgraph(&center, max_hops)
                .map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("subgraph extraction failed: {e}"))?;

        serde_json::to_string(&subgraph).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for SynapticTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Synaptic is a knowledge-graph memory server. Use store_association to link \
                 memories, find_connected_memories to explore the graph, find_shortest_path to \
                 connect two memories, and get_memory_subgraph to export a neighborhood."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
