//! MCP `find_connected_memories` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `find_connected_memories` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindConnectedParams {
    /// Content hash of the memory to start from.
    #[schemars(description = "Content hash of the starting memory")]
    pub memory_hash: String,

    /// Restrict traversal to one relationship type.
    #[schemars(
        description = "Optional relationship type filter: related, contradicts, causes, fixes, supports, follows"
    )]
    pub relationship_type: Option<String>,

    /// Traversal direction; defaults to `both`.
    #[schemars(description = "Traversal direction: outgoing, incoming, or both (default)")]
    pub direction: Option<String>,

    /// Hop budget; defaults to the configured value.
    #[schemars(description = "Maximum number of hops to traverse")]
    pub max_hops: Option<u32>,
}
