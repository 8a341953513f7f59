//! Validated edge descriptor and the closed relationship taxonomy.
//!
//! [`Association`] is the single choke point through which edge invariants
//! pass: non-empty hashes, no self-loops, similarity in range. Construction
//! has no side effects; storage happens in [`crate::graph::store`].

use serde::{Deserialize, Serialize};

use crate::graph::{GraphError, Result};

/// Why two memories are linked. Closed taxonomy with mixed symmetric and
/// asymmetric semantics.
///
/// Symmetry is a query-time property: a symmetric edge is stored once and
/// matched from either endpoint by the default (`both`) traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Generic association — symmetric.
    #[default]
    Related,
    /// The two memories disagree — symmetric, meaning holds in both directions.
    Contradicts,
    /// Source caused target — asymmetric.
    Causes,
    /// Source resolved target — asymmetric.
    Fixes,
    /// Source supports / gives evidence for target — asymmetric.
    Supports,
    /// Source temporally precedes target — asymmetric.
    Follows,
}

impl RelationshipType {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Related => "related",
            Self::Contradicts => "contradicts",
            Self::Causes => "causes",
            Self::Fixes => "fixes",
            Self::Supports => "supports",
            Self::Follows => "follows",
        }
    }

    /// Whether the relationship's meaning holds in both directions.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Related | Self::Contradicts)
    }

    /// Tolerant read-path parse: unknown or missing strings (e.g. a
    /// hand-edited row, or data written by an older version) degrade to
    /// [`RelationshipType::Related`] rather than failing the read.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "related" => Ok(Self::Related),
            "contradicts" => Ok(Self::Contradicts),
            "causes" => Ok(Self::Causes),
            "fixes" => Ok(Self::Fixes),
            "supports" => Ok(Self::Supports),
            "follows" => Ok(Self::Follows),
            _ => Err(format!("unknown relationship type: {s}")),
        }
    }
}

/// An immutable, validated description of one edge.
///
/// Fields are private; a constructed `Association` is guaranteed to satisfy
/// every edge invariant. Any path accepting external pair candidates must go
/// through [`Association::new`] before touching storage.
#[derive(Debug, Clone, Serialize)]
pub struct Association {
    source_hash: String,
    target_hash: String,
    similarity: f64,
    connection_types: Vec<String>,
    relationship_type: RelationshipType,
    metadata: Option<serde_json::Value>,
    created_at: Option<f64>,
}

impl Association {
    /// Validate and construct an edge descriptor.
    ///
    /// Fails with a [`GraphError`] naming the violated invariant: empty
    /// hash, self-loop, out-of-range similarity, or empty discovery-channel
    /// list. No I/O.
    pub fn new(
        source_hash: impl Into<String>,
        target_hash: impl Into<String>,
        similarity: f64,
        connection_types: Vec<String>,
        relationship_type: RelationshipType,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self> {
        let source_hash = source_hash.into();
        let target_hash = target_hash.into();

        if source_hash.is_empty() {
            return Err(GraphError::EmptySourceHash);
        }
        if target_hash.is_empty() {
            return Err(GraphError::EmptyTargetHash);
        }
        if source_hash == target_hash {
            return Err(GraphError::SelfLoop(source_hash));
        }
        if !(0.0..=1.0).contains(&similarity) {
            return Err(GraphError::SimilarityOutOfRange(similarity));
        }
        if connection_types.is_empty() {
            return Err(GraphError::NoConnectionTypes);
        }

        Ok(Self {
            source_hash,
            target_hash,
            similarity,
            connection_types,
            relationship_type,
            metadata,
            created_at: None,
        })
    }

    /// Override the creation timestamp (unix-epoch seconds). When unset, the
    /// store stamps the edge at persistence time.
    pub fn with_created_at(mut self, created_at: f64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    pub fn target_hash(&self) -> &str {
        &self.target_hash
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn connection_types(&self) -> &[String] {
        &self.connection_types
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> Option<f64> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> Vec<String> {
        vec!["semantic".to_string()]
    }

    #[test]
    fn valid_association_preserves_fields() {
        let meta = serde_json::json!({"origin": "batch"});
        let assoc = Association::new(
            "a",
            "b",
            0.87,
            vec!["semantic".into(), "temporal".into()],
            RelationshipType::Causes,
            Some(meta.clone()),
        )
        .unwrap();

        assert_eq!(assoc.source_hash(), "a");
        assert_eq!(assoc.target_hash(), "b");
        assert_eq!(assoc.similarity(), 0.87);
        assert_eq!(assoc.connection_types(), ["semantic", "temporal"]);
        assert_eq!(assoc.relationship_type(), RelationshipType::Causes);
        assert_eq!(assoc.metadata(), Some(&meta));
        assert!(assoc.created_at().is_none());
    }

    #[test]
    fn empty_hashes_rejected() {
        let err = Association::new("", "b", 0.5, channels(), RelationshipType::Related, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::EmptySourceHash));

        let err = Association::new("a", "", 0.5, channels(), RelationshipType::Related, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::EmptyTargetHash));
    }

    #[test]
    fn self_loop_rejected() {
        let err = Association::new("a", "a", 0.5, channels(), RelationshipType::Related, None)
            .unwrap_err();
        assert!(matches!(err, GraphError::SelfLoop(_)));
    }

    #[test]
    fn similarity_out_of_range_rejected() {
        for bad in [-0.01, 1.01, f64::NAN] {
            let result =
                Association::new("a", "b", bad, channels(), RelationshipType::Related, None);
            assert!(result.is_err(), "similarity {bad} should be rejected");
        }
        // Boundaries are inclusive
        Association::new("a", "b", 0.0, channels(), RelationshipType::Related, None).unwrap();
        Association::new("a", "b", 1.0, channels(), RelationshipType::Related, None).unwrap();
    }

    #[test]
    fn empty_connection_types_rejected() {
        let err =
            Association::new("a", "b", 0.5, vec![], RelationshipType::Related, None).unwrap_err();
        assert!(matches!(err, GraphError::NoConnectionTypes));
    }

    #[test]
    fn symmetry_flags() {
        assert!(RelationshipType::Related.is_symmetric());
        assert!(RelationshipType::Contradicts.is_symmetric());
        assert!(!RelationshipType::Causes.is_symmetric());
        assert!(!RelationshipType::Fixes.is_symmetric());
        assert!(!RelationshipType::Supports.is_symmetric());
        assert!(!RelationshipType::Follows.is_symmetric());
    }

    #[test]
    fn lenient_parse_degrades_to_related() {
        assert_eq!(
            RelationshipType::from_stored(Some("causes")),
            RelationshipType::Causes
        );
        assert_eq!(
            RelationshipType::from_stored(Some("hand-edited-garbage")),
            RelationshipType::Related
        );
        assert_eq!(RelationshipType::from_stored(None), RelationshipType::Related);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert!("causes".parse::<RelationshipType>().is_ok());
        assert!("causal".parse::<RelationshipType>().is_err());
    }
}
