//! Knowledge-graph memory for AI agents — typed associations, traversal, and
//! reasoning over memory records, served via MCP.
//!
//! Synaptic persists a directed edge store between memories (keyed by opaque
//! content hashes) in SQLite and layers relationship semantics on top:
//!
//! | Type | Meaning | Symmetry |
//! |------|---------|----------|
//! | `related` | Generic association | symmetric |
//! | `contradicts` | The memories disagree | symmetric |
//! | `causes` | Source caused target | asymmetric |
//! | `fixes` | Source resolved target | asymmetric |
//! | `supports` | Source supports target | asymmetric |
//! | `follows` | Source precedes target | asymmetric |
//!
//! Symmetric edges are stored once; the query layer reverses them.
//!
//! # Architecture
//!
//! - **Storage**: one SQLite `memory_graph` table keyed by the ordered
//!   (source, target) pair, with last-write-wins upserts
//! - **Traversal**: hop-limited breadth-first search with visited-set cycle
//!   guards, plus Dijkstra shortest path weighted by `1 - similarity`
//! - **Inference**: a deterministic heuristic classifier proposing typed
//!   relationships with confidence scores, and a batch job that retrofits
//!   types onto legacy `related` edges
//! - **Transport**: MCP over stdio
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`memory`] — Read-only view of endpoint memory fields for inference
//! - [`graph`] — Core graph engine: associations, store, inference, reasoner

pub mod config;
pub mod db;
pub mod graph;
pub mod memory;
pub mod server;
pub mod tools;
