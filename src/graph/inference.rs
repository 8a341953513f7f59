//! Heuristic relationship-type classification.
//!
//! [`RelationshipInference`] is a stateless, deterministic classifier: given
//! two memories' kind, content, tags and timestamps it proposes one taxonomy
//! member plus a confidence score. It only reports the score — enforcement of
//! the confidence floor is the caller's job, so batch jobs can tune the bar
//! without touching the classifier.
//!
//! [`reclassify_associations`] retrofits the taxonomy onto edges stored with
//! the generic `related` type before typed relationships existed.

use rusqlite::params;
use serde::Serialize;

use crate::graph::{GraphStore, RelationshipType, Result};
use crate::memory::{get_memory_fields, MemoryFields};

/// Default confidence floor below which callers fall back to `related`.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Lexical cues suggesting a causal link.
const CAUSAL_CUES: &[&str] = &[
    "because",
    "caused",
    "causes",
    "led to",
    "resulted in",
    "due to",
    "triggered",
];

/// Lexical cues suggesting a corrective link.
const FIX_CUES: &[&str] = &[
    "fixed",
    "fixes",
    "resolved",
    "solved",
    "workaround",
    "patched",
    "remediation",
];

/// Lexical cues suggesting a contradiction.
const CONTRADICTION_CUES: &[&str] = &[
    "contradicts",
    "incorrect",
    "wrong",
    "no longer",
    "not true",
    "instead",
    "however",
];

/// Memory-kind pairings with a conventional relationship reading.
const KIND_PAIRINGS: &[(&str, &str, RelationshipType, f64)] = &[
    ("decision", "error", RelationshipType::Causes, 0.65),
    ("error", "fix", RelationshipType::Causes, 0.65),
    ("fix", "error", RelationshipType::Fixes, 0.7),
    ("solution", "problem", RelationshipType::Fixes, 0.7),
    ("evidence", "hypothesis", RelationshipType::Supports, 0.65),
    ("observation", "decision", RelationshipType::Supports, 0.6),
];

/// Memories created within this window are temporal-sequence candidates.
const FOLLOWS_WINDOW_SECS: f64 = 3600.0;

/// Stateless relationship classifier.
#[derive(Debug, Clone)]
pub struct RelationshipInference {
    min_confidence: f64,
}

impl Default for RelationshipInference {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl RelationshipInference {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// The confidence floor callers are expected to apply.
    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Propose a relationship type and a confidence in `[0, 1]` for an
    /// ordered memory pair. Deterministic: the same inputs always produce
    /// the same answer.
    pub fn infer(&self, source: &MemoryFields, target: &MemoryFields) -> (RelationshipType, f64) {
        let source_text = source.content.to_lowercase();
        let target_text = target.content.to_lowercase();
        let overlap = tag_overlap(&source.tags, &target.tags);

        let mut candidates: Vec<(RelationshipType, f64)> = Vec::new();

        // Lexical cues, strongest signals first
        if let Some(hits) = cue_hits(&source_text, &target_text, FIX_CUES) {
            candidates.push((RelationshipType::Fixes, 0.7 + 0.05 * hits as f64));
        }
        if let Some(hits) = cue_hits(&source_text, &target_text, CAUSAL_CUES) {
            candidates.push((RelationshipType::Causes, 0.7 + 0.05 * hits as f64));
        }
        if let Some(hits) = cue_hits(&source_text, &target_text, CONTRADICTION_CUES) {
            candidates.push((RelationshipType::Contradicts, 0.65 + 0.05 * hits as f64));
        }

        // Memory-kind pairing
        if let (Some(st), Some(tt)) = (&source.memory_type, &target.memory_type) {
            let (st, tt) = (st.to_lowercase(), tt.to_lowercase());
            for (from, to, relationship, confidence) in KIND_PAIRINGS {
                if st.contains(from) && tt.contains(to) {
                    candidates.push((*relationship, *confidence));
                }
            }
        }

        // Temporal ordering: source shortly before target
        if let (Some(s_at), Some(t_at)) = (source.created_at, target.created_at) {
            let delta = t_at - s_at;
            if delta > 0.0 && delta <= FOLLOWS_WINDOW_SECS {
                candidates.push((RelationshipType::Follows, 0.6));
            }
        }

        // Strong tag overlap alone reads as supporting evidence
        if overlap >= 0.5 {
            candidates.push((RelationshipType::Supports, 0.55 + 0.15 * overlap));
        }

        // Fold the best candidate; tag overlap nudges confidence upward
        let best = candidates
            .into_iter()
            .fold(None::<(RelationshipType, f64)>, |acc, cand| match acc {
                Some(best) if best.1 >= cand.1 => Some(best),
                _ => Some(cand),
            });

        match best {
            Some((relationship, confidence)) => {
                (relationship, (confidence + 0.1 * overlap).min(1.0))
            }
            None => (RelationshipType::Related, 0.4 + 0.2 * overlap),
        }
    }
}

/// Count how many cue phrases appear across both contents. `None` when no
/// cue matches.
fn cue_hits(source_text: &str, target_text: &str, cues: &[&str]) -> Option<usize> {
    let hits = cues
        .iter()
        .filter(|cue| source_text.contains(*cue) || target_text.contains(*cue))
        .count();
    (hits > 0).then_some(hits)
}

/// Jaccard overlap of two tag sets, 0.0 when either is empty.
fn tag_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a: std::collections::HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: std::collections::HashSet<&str> = b.iter().map(String::as_str).collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Outcome of a batch reclassification run.
#[derive(Debug, Default, Serialize)]
pub struct ReclassifyOutcome {
    /// Edges whose endpoints both resolved and which were inferred.
    pub processed: usize,
    /// Edges whose stored type actually changed.
    pub updated: usize,
    /// Edges skipped because an endpoint memory no longer exists.
    pub skipped: usize,
}

/// Re-run inference over every stored edge and update the relationship type
/// where it differs.
///
/// Missing endpoint memories are counted as skips, never treated as fatal.
/// Inferences below the engine's confidence floor fall back to `related`.
/// Updates commit in bounded groups of `commit_interval`.
pub fn reclassify_associations(
    store: &mut GraphStore,
    engine: &RelationshipInference,
    commit_interval: usize,
) -> Result<ReclassifyOutcome> {
    // Materialize the key set up front so the walk is stable under updates
    let edges: Vec<(String, String, RelationshipType)> = {
        let mut stmt = store.connection().prepare(
            "SELECT source_hash, target_hash, relationship_type FROM memory_graph",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;
        rows.map(|row| {
            row.map(|(s, t, rt)| (s, t, RelationshipType::from_stored(rt.as_deref())))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?
    };

    let mut outcome = ReclassifyOutcome::default();

    for chunk in edges.chunks(commit_interval.max(1)) {
        let tx = store.connection_mut().transaction()?;
        for (source, target, stored) in chunk {
            let Some(source_fields) = get_memory_fields(&tx, source)? else {
                outcome.skipped += 1;
                continue;
            };
            let Some(target_fields) = get_memory_fields(&tx, target)? else {
                outcome.skipped += 1;
                continue;
            };

            let (mut inferred, confidence) = engine.infer(&source_fields, &target_fields);
            if confidence < engine.min_confidence() {
                inferred = RelationshipType::Related;
            }
            outcome.processed += 1;

            if inferred != *stored {
                tx.execute(
                    "UPDATE memory_graph SET relationship_type = ?1 \
                     WHERE source_hash = ?2 AND target_hash = ?3",
                    params![inferred.as_str(), source, target],
                )?;
                outcome.updated += 1;
            }
        }
        tx.commit()?;
    }

    tracing::info!(
        processed = outcome.processed,
        updated = outcome.updated,
        skipped = outcome.skipped,
        "reclassification finished"
    );
    Ok(outcome)
}
