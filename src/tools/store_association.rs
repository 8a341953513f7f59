//! MCP `store_association` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `store_association` MCP tool.
///
/// Upserts one edge keyed by the ordered (source, target) pair; re-storing
/// the same pair overwrites similarity, type and metadata.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreAssociationParams {
    /// Content hash of the source memory.
    #[schemars(description = "Content hash of the source memory")]
    pub source_hash: String,

    /// Content hash of the target memory.
    #[schemars(description = "Content hash of the target memory")]
    pub target_hash: String,

    /// Similarity between the two memories, in [0.0, 1.0].
    #[schemars(description = "Similarity score between the two memories (0.0-1.0)")]
    pub similarity: f64,

    /// Discovery channels that produced this edge (e.g. "semantic", "temporal").
    #[schemars(description = "Discovery channels that produced the edge, e.g. ['semantic']")]
    pub connection_types: Vec<String>,

    /// Relationship type from the closed taxonomy; defaults to `related`.
    #[schemars(
        description = "Relationship type: related (default), contradicts, causes, fixes, supports, follows"
    )]
    pub relationship_type: Option<String>,

    /// Arbitrary JSON metadata for the edge.
    #[schemars(description = "Optional JSON metadata attached to the edge")]
    pub metadata: Option<serde_json::Value>,
}
