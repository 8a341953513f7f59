#![allow(dead_code)]

use synaptic::graph::{Association, GraphStore, RelationshipType};
use synaptic::memory::{upsert_memory, MemoryFields};

/// Open a fresh in-memory graph store with schema and migrations applied.
pub fn test_store() -> GraphStore {
    GraphStore::open_in_memory().unwrap()
}

/// Build a validated association with a single `semantic` discovery channel.
pub fn assoc(
    source: &str,
    target: &str,
    similarity: f64,
    relationship_type: RelationshipType,
) -> Association {
    Association::new(
        source,
        target,
        similarity,
        vec!["semantic".to_string()],
        relationship_type,
        None,
    )
    .unwrap()
}

/// Store one edge, panicking on failure.
pub fn link(
    store: &GraphStore,
    source: &str,
    target: &str,
    similarity: f64,
    relationship_type: RelationshipType,
) {
    store
        .store_association(&assoc(source, target, similarity, relationship_type))
        .unwrap();
}

/// Insert a memory row into the minimal `memories` view.
pub fn put_memory(store: &GraphStore, hash: &str, content: &str, memory_type: Option<&str>) {
    upsert_memory(
        store.connection(),
        &MemoryFields {
            content_hash: hash.to_string(),
            content: content.to_string(),
            memory_type: memory_type.map(String::from),
            tags: Vec::new(),
            created_at: Some(1_700_000_000.0),
        },
    )
    .unwrap();
}
