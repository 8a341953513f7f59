//! Read-only view of endpoint memory records.
//!
//! The graph subsystem does not own memory records; it reads the handful of
//! fields the relationship inference engine needs (content, memory_type,
//! tags, created_at) from the co-located `memories` table. Missing rows are
//! an expected outcome (the memory may have been purged), never an error.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::graph::Result;

/// The memory fields consumed by relationship inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFields {
    /// Stable content hash, used as the graph node key.
    pub content_hash: String,
    /// Full text content of the memory.
    pub content: String,
    /// Free-form memory kind label (e.g. `"decision"`, `"error"`), if known.
    pub memory_type: Option<String>,
    /// Tags attached by the memory store.
    pub tags: Vec<String>,
    /// Unix-epoch creation time in seconds, if known.
    pub created_at: Option<f64>,
}

/// Fetch the inference-relevant fields for one memory, or `None` if the
/// memory no longer exists.
pub fn get_memory_fields(conn: &Connection, content_hash: &str) -> Result<Option<MemoryFields>> {
    let row = conn
        .query_row(
            "SELECT content, memory_type, tags, created_at FROM memories WHERE content_hash = ?1",
            params![content_hash],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(content, memory_type, tags, created_at)| MemoryFields {
        content_hash: content_hash.to_string(),
        content,
        memory_type,
        tags: parse_tags(tags.as_deref()),
        created_at,
    }))
}

/// Insert or replace a memory row in the minimal view.
///
/// Used by tests and by embedders that co-locate the full memory store in the
/// same database file.
pub fn upsert_memory(conn: &Connection, fields: &MemoryFields) -> Result<()> {
    let tags_json = serde_json::to_string(&fields.tags)?;
    conn.execute(
        "INSERT OR REPLACE INTO memories (content_hash, content, memory_type, tags, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fields.content_hash,
            fields.content,
            fields.memory_type,
            tags_json,
            fields.created_at,
        ],
    )?;
    Ok(())
}

/// Tags are stored as a JSON array; older stores wrote comma-separated text.
fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
        return tags;
    }
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
