//! Directional relationship semantics over the traversal primitives.
//!
//! The store's default traversal direction is `both`, so a query layer has
//! to encode which direction a relationship's *meaning* points: "what caused
//! X" is the set of incoming `causes` edges, while `contradicts` is
//! symmetric and keeps the default. [`SemanticReasoner`] is that layer.
//!
//! Three further operations (`abstract_to_concept`, `infer_transitive`,
//! `suggest_relationships`) are acknowledged extension points: they delegate
//! to a [`ReasoningStrategy`] whose default implementation reports nothing
//! found. Real abstraction and transitive-closure inference can be swapped
//! in without changing any call site.

use crate::graph::{Direction, GraphTraversal, Neighbor, RelationshipType, Result};

/// Pluggable future-inference surface. Every method defaults to the no-op
/// "nothing found" contract.
pub trait ReasoningStrategy {
    /// Propose a higher-level concept node for a memory. Not implemented by
    /// default.
    fn abstract_to_concept(&self, _node: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// Derive implied multi-hop relationships of one type. Not implemented
    /// by default.
    fn infer_transitive(
        &self,
        _relationship_type: RelationshipType,
        _max_hops: u32,
    ) -> Result<Vec<Vec<String>>> {
        Ok(Vec::new())
    }

    /// Suggest candidate edges for a node. Not implemented by default.
    fn suggest_relationships(&self, _node: &str) -> Result<Vec<Neighbor>> {
        Ok(Vec::new())
    }
}

/// The default strategy: all extension points report nothing found.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInference;

impl ReasoningStrategy for NoInference {}

/// Thin query layer mapping relationship meaning onto correctly-directed
/// store calls.
///
/// The `GraphTraversal` bound is the construction-time capability check: a
/// store without `find_connected`/`shortest_path` cannot be wrapped at all.
pub struct SemanticReasoner<'a, S: GraphTraversal> {
    store: &'a S,
    strategy: Box<dyn ReasoningStrategy + Send + Sync>,
}

impl<'a, S: GraphTraversal> SemanticReasoner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            strategy: Box::new(NoInference),
        }
    }

    /// Replace the extension-point strategy.
    pub fn with_strategy(
        store: &'a S,
        strategy: Box<dyn ReasoningStrategy + Send + Sync>,
    ) -> Self {
        Self { store, strategy }
    }

    /// Memories that caused `node`: incoming `causes` edges.
    pub fn find_causes(&self, node: &str) -> Result<Vec<Neighbor>> {
        self.store.find_connected(
            node,
            Some(RelationshipType::Causes),
            Direction::Incoming,
            1,
        )
    }

    /// Memories that resolved `node`: incoming `fixes` edges.
    pub fn find_fixes(&self, node: &str) -> Result<Vec<Neighbor>> {
        self.store
            .find_connected(node, Some(RelationshipType::Fixes), Direction::Incoming, 1)
    }

    /// Memories contradicting `node`. The type is symmetric, so the default
    /// (both) direction is correct from either endpoint of a stored edge.
    pub fn detect_contradictions(&self, node: &str) -> Result<Vec<Neighbor>> {
        self.store.find_connected(
            node,
            Some(RelationshipType::Contradicts),
            Direction::Both,
            1,
        )
    }

    /// Lowest-cost connection between two memories.
    pub fn shortest_path(
        &self,
        start: &str,
        end: &str,
        relationship_types: Option<&[RelationshipType]>,
    ) -> Result<Option<Vec<String>>> {
        self.store.shortest_path(start, end, relationship_types)
    }

    /// Extension point — delegates to the strategy (default: `None`).
    pub fn abstract_to_concept(&self, node: &str) -> Result<Option<String>> {
        self.strategy.abstract_to_concept(node)
    }

    /// Extension point — delegates to the strategy (default: empty).
    pub fn infer_transitive(
        &self,
        relationship_type: RelationshipType,
        max_hops: u32,
    ) -> Result<Vec<Vec<String>>> {
        self.strategy.infer_transitive(relationship_type, max_hops)
    }

    /// Extension point — delegates to the strategy (default: empty).
    pub fn suggest_relationships(&self, node: &str) -> Result<Vec<Neighbor>> {
        self.strategy.suggest_relationships(node)
    }
}
