//! Persistence and traversal engine for the memory graph.
//!
//! [`GraphStore`] owns the `memory_graph` table: idempotent single-row
//! upserts keyed by the ordered (source, target) pair, bounded-commit batch
//! insertion, and all read algorithms — hop-limited cycle-safe BFS, weighted
//! shortest path (edge weight `1 - similarity`), induced-subgraph
//! extraction, and per-type fan-out counts.
//!
//! Traversal reads do not block writers; a long traversal under concurrent
//! mutation may miss or include an edge added mid-walk, which is an accepted
//! weak-consistency trade-off.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::graph::{Association, GraphTraversal, RelationshipType, Result};

/// Traversal direction relative to the queried node.
///
/// The default (`Both`) matches edges where the node appears as either
/// column, independent of whether the relationship type is symmetric — this
/// is what makes bidirectional queries on `contradicts`/`related` work from
/// a single stored row. Callers that care about directional meaning (the
/// reasoner does) must request `Outgoing` or `Incoming` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Follow edges where the node is the source.
    Outgoing,
    /// Follow edges where the node is the target.
    Incoming,
    /// Follow edges regardless of which column holds the node.
    #[default]
    Both,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "outgoing" => Ok(Self::Outgoing),
            "incoming" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

/// One node reached by a traversal, with the similarity of the edge that
/// first discovered it.
#[derive(Debug, Clone, Serialize)]
pub struct Neighbor {
    pub memory_hash: String,
    pub similarity: f64,
}

/// A fully materialized edge row.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAssociation {
    pub source_hash: String,
    pub target_hash: String,
    pub similarity: f64,
    pub connection_types: Vec<String>,
    pub relationship_type: RelationshipType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: f64,
}

/// The induced subgraph within a hop radius of a center node.
#[derive(Debug, Serialize)]
pub struct Subgraph {
    pub nodes: Vec<String>,
    pub edges: Vec<StoredAssociation>,
}

/// Outcome of a single upsert.
#[derive(Debug, Serialize)]
pub struct StoreOutcome {
    /// `true` when an existing (source, target) row was overwritten.
    pub updated: bool,
}

/// Outcome of a batch insertion.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub stored: usize,
    pub updated: usize,
}

/// Whole-table edge statistics, consumed by the CLI and the quality engine.
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub total_edges: u64,
    pub by_type: HashMap<String, u64>,
}

/// Relationship-type filter for internal adjacency queries.
enum TypeFilter<'a> {
    Any,
    One(RelationshipType),
    Set(&'a [RelationshipType]),
}

impl TypeFilter<'_> {
    fn matches(&self, stored: RelationshipType) -> bool {
        match self {
            Self::Any => true,
            Self::One(want) => stored == *want,
            Self::Set(set) => set.contains(&stored),
        }
    }
}

/// Handle to the persistent edge store.
///
/// Opened explicitly; a missing schema or failed migration is an open-time
/// error, not a first-query surprise.
pub struct GraphStore {
    conn: Connection,
}

impl GraphStore {
    /// Open (or create) the graph database at the given path.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_database(path)?,
        })
    }

    /// Open an ephemeral in-memory graph (tests, embedders).
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_memory_database()?,
        })
    }

    /// The underlying connection, shared with collaborators that co-locate
    /// their tables in the same database file.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Upsert one edge keyed by its ordered (source, target) pair.
    ///
    /// Idempotent: re-storing the same pair overwrites similarity, type and
    /// metadata (last write wins) without creating a duplicate or a reverse
    /// row. Symmetric types rely on query-time reversal, not double storage.
    pub fn store_association(&self, assoc: &Association) -> Result<StoreOutcome> {
        let updated = upsert_row(&self.conn, assoc)?;
        tracing::debug!(
            source = assoc.source_hash(),
            target = assoc.target_hash(),
            relationship = %assoc.relationship_type(),
            updated,
            "association stored"
        );
        Ok(StoreOutcome { updated })
    }

    /// Bulk edge insertion, committing in bounded-size groups to keep memory
    /// and lock-hold time flat on large graphs. `commit_interval` is the
    /// group size (values below 1 are treated as 1).
    pub fn store_batch(
        &mut self,
        assocs: &[Association],
        commit_interval: usize,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for chunk in assocs.chunks(commit_interval.max(1)) {
            let tx = self.conn.transaction()?;
            for assoc in chunk {
                if upsert_row(&tx, assoc)? {
                    outcome.updated += 1;
                }
                outcome.stored += 1;
            }
            tx.commit()?;
        }
        tracing::info!(
            stored = outcome.stored,
            updated = outcome.updated,
            "batch insertion committed"
        );
        Ok(outcome)
    }

    /// Fetch one edge by its ordered pair, or `None` if absent.
    pub fn get_association(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Option<StoredAssociation>> {
        let row = self
            .conn
            .query_row(
                "SELECT similarity, connection_types, metadata, created_at, relationship_type \
                 FROM memory_graph WHERE source_hash = ?1 AND target_hash = ?2",
                params![source, target],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((similarity, channels, metadata, created_at, relationship)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredAssociation {
            source_hash: source.to_string(),
            target_hash: target.to_string(),
            similarity,
            connection_types: serde_json::from_str(&channels).unwrap_or_default(),
            relationship_type: RelationshipType::from_stored(relationship.as_deref()),
            metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
            created_at,
        }))
    }

    /// Breadth-first connectivity query with a visited-node set.
    ///
    /// The visited set guarantees termination on cyclic subgraphs — a 3-node
    /// cycle is walked once. Results are in discovery order and exclude the
    /// starting node.
    pub fn find_connected(
        &self,
        node: &str,
        relationship_type: Option<RelationshipType>,
        direction: Direction,
        max_hops: u32,
    ) -> Result<Vec<Neighbor>> {
        let filter = match relationship_type {
            Some(rt) => TypeFilter::One(rt),
            None => TypeFilter::Any,
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(node.to_string());
        let mut found: Vec<Neighbor> = Vec::new();
        let mut frontier: Vec<String> = vec![node.to_string()];

        for _ in 0..max_hops {
            let mut next: Vec<String> = Vec::new();
            for current in &frontier {
                for (neighbor, similarity) in self.adjacent(current, direction, &filter)? {
                    if visited.insert(neighbor.clone()) {
                        found.push(Neighbor {
                            memory_hash: neighbor.clone(),
                            similarity,
                        });
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(found)
    }

    /// Dijkstra search weighting each edge `1 - similarity`, so the path
    /// with higher cumulative similarity wins even at equal hop count.
    ///
    /// Edges are walkable from either endpoint; `relationship_types`
    /// restricts the searched subgraph. Returns the hash sequence from
    /// `start` to `end`, or `None` when unreachable.
    pub fn shortest_path(
        &self,
        start: &str,
        end: &str,
        relationship_types: Option<&[RelationshipType]>,
    ) -> Result<Option<Vec<String>>> {
        if start == end {
            return Ok(Some(vec![start.to_string()]));
        }

        let filter = match relationship_types {
            Some(set) => TypeFilter::Set(set),
            None => TypeFilter::Any,
        };

        let mut dist: HashMap<String, f64> = HashMap::new();
        let mut prev: HashMap<String, String> = HashMap::new();
        let mut heap: BinaryHeap<QueueEntry> = BinaryHeap::new();

        dist.insert(start.to_string(), 0.0);
        heap.push(QueueEntry {
            cost: 0.0,
            node: start.to_string(),
        });

        while let Some(QueueEntry { cost, node }) = heap.pop() {
            if node == end {
                return Ok(Some(reconstruct_path(&prev, start, end)));
            }
            // Stale entry superseded by a cheaper relaxation
            if cost > *dist.get(&node).unwrap_or(&f64::INFINITY) {
                continue;
            }

            for (neighbor, similarity) in self.adjacent(&node, Direction::Both, &filter)? {
                let next_cost = cost + (1.0 - similarity);
                if next_cost < *dist.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    dist.insert(neighbor.clone(), next_cost);
                    prev.insert(neighbor.clone(), node.clone());
                    heap.push(QueueEntry {
                        cost: next_cost,
                        node: neighbor,
                    });
                }
            }
        }

        Ok(None)
    }

    /// Induced subgraph of everything reachable from `center` within
    /// `max_hops`: the reached node set plus every stored edge whose both
    /// endpoints fall inside it.
    pub fn get_memory_subgraph(&self, center: &str, max_hops: u32) -> Result<Subgraph> {
        let mut nodes: Vec<String> = vec![center.to_string()];
        let mut node_set: HashSet<String> = HashSet::new();
        node_set.insert(center.to_string());

        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((center.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_hops {
                continue;
            }
            for (neighbor, _) in self.adjacent(&current, Direction::Both, &TypeFilter::Any)? {
                if node_set.insert(neighbor.clone()) {
                    nodes.push(neighbor.clone());
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        let mut edges: Vec<StoredAssociation> = Vec::new();
        let mut stmt = self.conn.prepare(
            "SELECT target_hash, similarity, connection_types, metadata, created_at, relationship_type \
             FROM memory_graph WHERE source_hash = ?1",
        )?;
        for node in &nodes {
            let rows = stmt.query_map(params![node], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?;
            for row in rows {
                let (target, similarity, channels, metadata, created_at, relationship) = row?;
                if !node_set.contains(&target) {
                    continue;
                }
                edges.push(StoredAssociation {
                    source_hash: node.clone(),
                    target_hash: target,
                    similarity,
                    connection_types: serde_json::from_str(&channels).unwrap_or_default(),
                    relationship_type: RelationshipType::from_stored(relationship.as_deref()),
                    metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
                    created_at,
                });
            }
        }

        Ok(Subgraph { nodes, edges })
    }

    /// Per-type edge counts for one node, counting edges on either side.
    ///
    /// Consumed by the decay/quality engine as a cheap connectedness proxy.
    /// Isolated nodes yield an empty map, never an error. Unrecognized
    /// stored strings fold into `related`.
    pub fn get_relationship_types(&self, node: &str) -> Result<HashMap<String, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT relationship_type, COUNT(*) FROM memory_graph \
             WHERE source_hash = ?1 OR target_hash = ?1 GROUP BY relationship_type",
        )?;
        let rows = stmt.query_map(params![node], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for row in rows {
            let (raw, count) = row?;
            let canonical = RelationshipType::from_stored(raw.as_deref());
            *counts.entry(canonical.as_str().to_string()).or_insert(0) += count as u64;
        }
        Ok(counts)
    }

    /// Whole-table edge statistics.
    pub fn stats(&self) -> Result<GraphStats> {
        let total: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM memory_graph", [], |row| row.get(0))?;

        let mut stmt = self
            .conn
            .prepare("SELECT relationship_type, COUNT(*) FROM memory_graph GROUP BY relationship_type")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut by_type: HashMap<String, u64> = HashMap::new();
        for row in rows {
            let (raw, count) = row?;
            let canonical = RelationshipType::from_stored(raw.as_deref());
            *by_type.entry(canonical.as_str().to_string()).or_insert(0) += count as u64;
        }

        Ok(GraphStats {
            total_edges: total as u64,
            by_type,
        })
    }

    /// One-hop adjacency with relationship filtering applied on the read
    /// side, so unrecognized stored types degrade to `related` instead of
    /// failing the query.
    fn adjacent(
        &self,
        node: &str,
        direction: Direction,
        filter: &TypeFilter<'_>,
    ) -> Result<Vec<(String, f64)>> {
        let mut out: Vec<(String, f64)> = Vec::new();

        if matches!(direction, Direction::Outgoing | Direction::Both) {
            let mut stmt = self.conn.prepare(
                "SELECT target_hash, similarity, relationship_type FROM memory_graph \
                 WHERE source_hash = ?1 ORDER BY similarity DESC",
            )?;
            collect_adjacent(&mut stmt, node, filter, &mut out)?;
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            let mut stmt = self.conn.prepare(
                "SELECT source_hash, similarity, relationship_type FROM memory_graph \
                 WHERE target_hash = ?1 ORDER BY similarity DESC",
            )?;
            collect_adjacent(&mut stmt, node, filter, &mut out)?;
        }

        Ok(out)
    }
}

impl GraphTraversal for GraphStore {
    fn find_connected(
        &self,
        node: &str,
        relationship_type: Option<RelationshipType>,
        direction: Direction,
        max_hops: u32,
    ) -> Result<Vec<Neighbor>> {
        GraphStore::find_connected(self, node, relationship_type, direction, max_hops)
    }

    fn shortest_path(
        &self,
        start: &str,
        end: &str,
        relationship_types: Option<&[RelationshipType]>,
    ) -> Result<Option<Vec<String>>> {
        GraphStore::shortest_path(self, start, end, relationship_types)
    }
}

fn collect_adjacent(
    stmt: &mut rusqlite::Statement<'_>,
    node: &str,
    filter: &TypeFilter<'_>,
    out: &mut Vec<(String, f64)>,
) -> Result<()> {
    let rows = stmt.query_map(params![node], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    for row in rows {
        let (neighbor, similarity, relationship) = row?;
        if filter.matches(RelationshipType::from_stored(relationship.as_deref())) {
            out.push((neighbor, similarity));
        }
    }
    Ok(())
}

/// Upsert one row. Returns `true` when an existing row was overwritten.
fn upsert_row(conn: &Connection, assoc: &Association) -> Result<bool> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM memory_graph WHERE source_hash = ?1 AND target_hash = ?2",
            params![assoc.source_hash(), assoc.target_hash()],
            |row| row.get(0),
        )
        .optional()?;

    let channels = serde_json::to_string(assoc.connection_types())?;
    let metadata = assoc
        .metadata()
        .map(serde_json::to_string)
        .transpose()?;
    let created_at = assoc.created_at().unwrap_or_else(now_epoch);

    conn.execute(
        "INSERT INTO memory_graph \
         (source_hash, target_hash, similarity, connection_types, metadata, created_at, relationship_type) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(source_hash, target_hash) DO UPDATE SET \
         similarity = excluded.similarity, \
         connection_types = excluded.connection_types, \
         metadata = excluded.metadata, \
         relationship_type = excluded.relationship_type",
        params![
            assoc.source_hash(),
            assoc.target_hash(),
            assoc.similarity(),
            channels,
            metadata,
            created_at,
            assoc.relationship_type().as_str(),
        ],
    )?;

    Ok(existing.is_some())
}

/// Current time as unix-epoch seconds, millisecond precision.
fn now_epoch() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Min-heap entry for Dijkstra. Ordering is reversed on cost so
/// `BinaryHeap::pop` yields the cheapest frontier node; ties break on the
/// node key for determinism.
struct QueueEntry {
    cost: f64,
    node: String,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn reconstruct_path(prev: &HashMap<String, String>, start: &str, end: &str) -> Vec<String> {
    let mut path = vec![end.to_string()];
    let mut current = end;
    while current != start {
        let Some(parent) = prev.get(current) else {
            break;
        };
        path.push(parent.clone());
        current = parent;
    }
    path.reverse();
    path
}
