//! Typed knowledge graph over memory records.
//!
//! - [`association`] — validated edge descriptor and the closed relationship
//!   taxonomy
//! - [`store`] — persistence and traversal engine over the `memory_graph`
//!   table (upserts, BFS connectivity, weighted shortest path, subgraphs)
//! - [`inference`] — heuristic relationship-type classifier and the batch
//!   reclassification job for legacy edges
//! - [`reasoner`] — directional semantics (causes/fixes/contradictions) on
//!   top of the traversal primitives

pub mod association;
pub mod inference;
pub mod reasoner;
pub mod store;

pub use association::{Association, RelationshipType};
pub use inference::{reclassify_associations, ReclassifyOutcome, RelationshipInference};
pub use reasoner::{ReasoningStrategy, SemanticReasoner};
pub use store::{Direction, GraphStore, Neighbor, StoredAssociation, Subgraph};

use thiserror::Error;

/// Errors produced by the graph subsystem.
///
/// Validation variants are programming/data errors caught before any I/O;
/// `Storage` wraps recoverable SQLite failures that callers may retry or
/// skip.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("source hash must not be empty")]
    EmptySourceHash,

    #[error("target hash must not be empty")]
    EmptyTargetHash,

    #[error("self-loop: source and target are the same memory ({0})")]
    SelfLoop(String),

    #[error("similarity {0} is outside [0.0, 1.0]")]
    SimilarityOutOfRange(f64),

    #[error("connection_types must not be empty")]
    NoConnectionTypes,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// The traversal operations the [`SemanticReasoner`] requires from its
/// backing store. The trait bound makes an incapable store a compile error
/// rather than a first-use failure.
pub trait GraphTraversal {
    /// Nodes reachable from `node` within `max_hops`, in discovery order.
    fn find_connected(
        &self,
        node: &str,
        relationship_type: Option<RelationshipType>,
        direction: Direction,
        max_hops: u32,
    ) -> Result<Vec<Neighbor>>;

    /// Lowest-cost path between two nodes, weighting edges by
    /// `1 - similarity`. `None` when unreachable.
    fn shortest_path(
        &self,
        start: &str,
        end: &str,
        relationship_types: Option<&[RelationshipType]>,
    ) -> Result<Option<Vec<String>>>;
}
