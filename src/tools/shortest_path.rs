//! MCP `find_shortest_path` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `find_shortest_path` MCP tool.
///
/// Edge weight is `1 - similarity`, so the returned path maximizes
/// cumulative similarity.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ShortestPathParams {
    /// Content hash of the path start.
    #[schemars(description = "Content hash of the starting memory")]
    pub start_hash: String,

    /// Content hash of the path end.
    #[schemars(description = "Content hash of the destination memory")]
    pub end_hash: String,

    /// Restrict the searched subgraph to these relationship types.
    #[schemars(description = "Optional list of relationship types the path may use")]
    pub relationship_types: Option<Vec<String>>,
}
