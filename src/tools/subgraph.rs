//! MCP `get_memory_subgraph` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `get_memory_subgraph` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SubgraphParams {
    /// Content hash at the center of the extracted subgraph.
    #[schemars(description = "Content hash of the center memory")]
    pub center_hash: String,

    /// Hop radius; defaults to the configured value.
    #[schemars(description = "Hop radius around the center")]
    pub max_hops: Option<u32>,
}
