//! SQL DDL for the Synaptic graph tables.
//!
//! Defines the `memory_graph` edge table, the minimal `memories` view the
//! inference engine reads endpoint fields from, and the `schema_meta` table.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for Synaptic's core tables.
const SCHEMA_SQL: &str = r#"
-- Minimal view of the wider store's memory records. The graph subsystem only
-- reads content, memory_type, tags and created_at for relationship inference;
-- the full record lives with the memory store proper.
CREATE TABLE IF NOT EXISTS memories (
    content_hash TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    memory_type TEXT,
    tags TEXT,
    created_at REAL
);

-- Typed association graph between memories, one row per ordered pair.
-- Symmetric relationship types are stored once and reversed at query time.
CREATE TABLE IF NOT EXISTS memory_graph (
    source_hash TEXT NOT NULL,
    target_hash TEXT NOT NULL,
    similarity REAL NOT NULL,
    connection_types TEXT NOT NULL,
    metadata TEXT,
    created_at REAL NOT NULL,
    relationship_type TEXT DEFAULT 'related',
    PRIMARY KEY (source_hash, target_hash)
);

CREATE INDEX IF NOT EXISTS idx_graph_source ON memory_graph(source_hash);
CREATE INDEX IF NOT EXISTS idx_graph_target ON memory_graph(target_hash);
-- idx_graph_relationship is created by the v1 -> v2 migration, which runs
-- after this DDL; legacy tables do not have the column yet at this point.

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"memories".to_string()));
        assert!(tables.contains(&"memory_graph".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn edge_table_has_composite_primary_key() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO memory_graph (source_hash, target_hash, similarity, connection_types, created_at) \
             VALUES ('a', 'b', 0.5, '[\"semantic\"]', 0.0)",
            [],
        )
        .unwrap();

        // Same ordered pair violates the primary key
        let dup = conn.execute(
            "INSERT INTO memory_graph (source_hash, target_hash, similarity, connection_types, created_at) \
             VALUES ('a', 'b', 0.6, '[\"semantic\"]', 0.0)",
            [],
        );
        assert!(dup.is_err());

        // Reverse pair is a distinct row
        conn.execute(
            "INSERT INTO memory_graph (source_hash, target_hash, similarity, connection_types, created_at) \
             VALUES ('b', 'a', 0.5, '[\"semantic\"]', 0.0)",
            [],
        )
        .unwrap();
    }
}
