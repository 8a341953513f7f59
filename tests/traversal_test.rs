mod helpers;

use helpers::{link, test_store};
use synaptic::graph::{Direction, RelationshipType};

#[test]
fn asymmetric_edges_respect_direction() {
    let store = test_store();
    link(&store, "a", "b", 0.9, RelationshipType::Causes);

    // Outgoing from the target is empty
    let from_target = store
        .find_connected("b", Some(RelationshipType::Causes), Direction::Outgoing, 1)
        .unwrap();
    assert!(from_target.is_empty());

    // Outgoing from the source reaches the target
    let from_source = store
        .find_connected("a", Some(RelationshipType::Causes), Direction::Outgoing, 1)
        .unwrap();
    assert_eq!(from_source.len(), 1);
    assert_eq!(from_source[0].memory_hash, "b");

    // Both-direction queries see the edge from either endpoint
    let both_a = store
        .find_connected("a", Some(RelationshipType::Causes), Direction::Both, 1)
        .unwrap();
    assert_eq!(both_a[0].memory_hash, "b");
    let both_b = store
        .find_connected("b", Some(RelationshipType::Causes), Direction::Both, 1)
        .unwrap();
    assert_eq!(both_b[0].memory_hash, "a");
}

#[test]
fn symmetric_edge_is_bidirectional_from_one_row() {
    let store = test_store();
    link(&store, "a", "b", 0.8, RelationshipType::Contradicts);

    let from_a = store.find_connected("a", None, Direction::Both, 1).unwrap();
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a[0].memory_hash, "b");

    let from_b = store.find_connected("b", None, Direction::Both, 1).unwrap();
    assert_eq!(from_b.len(), 1);
    assert_eq!(from_b[0].memory_hash, "a");

    // Still a single stored row
    let count: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM memory_graph", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn cycle_terminates_without_duplicates() {
    let store = test_store();
    link(&store, "e", "f", 0.9, RelationshipType::Follows);
    link(&store, "f", "g", 0.9, RelationshipType::Follows);
    link(&store, "g", "e", 0.9, RelationshipType::Follows);

    let reached = store
        .find_connected("e", Some(RelationshipType::Follows), Direction::Both, 2)
        .unwrap();

    let mut hashes: Vec<&str> = reached.iter().map(|n| n.memory_hash.as_str()).collect();
    hashes.sort_unstable();
    assert_eq!(hashes, ["f", "g"], "each cycle node visited exactly once");
}

#[test]
fn hop_budget_bounds_the_walk() {
    let store = test_store();
    link(&store, "n0", "n1", 0.9, RelationshipType::Related);
    link(&store, "n1", "n2", 0.9, RelationshipType::Related);
    link(&store, "n2", "n3", 0.9, RelationshipType::Related);

    let one_hop = store.find_connected("n0", None, Direction::Both, 1).unwrap();
    assert_eq!(one_hop.len(), 1);

    let two_hops = store.find_connected("n0", None, Direction::Both, 2).unwrap();
    assert_eq!(two_hops.len(), 2);

    let all = store.find_connected("n0", None, Direction::Both, 10).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn type_filter_restricts_traversal() {
    let store = test_store();
    link(&store, "hub", "x", 0.9, RelationshipType::Causes);
    link(&store, "hub", "y", 0.9, RelationshipType::Fixes);

    let causes = store
        .find_connected("hub", Some(RelationshipType::Causes), Direction::Both, 1)
        .unwrap();
    assert_eq!(causes.len(), 1);
    assert_eq!(causes[0].memory_hash, "x");

    // Omitting the filter matches any type
    let any = store.find_connected("hub", None, Direction::Both, 1).unwrap();
    assert_eq!(any.len(), 2);
}

#[test]
fn relationship_type_counts_on_a_hub() {
    let store = test_store();
    link(&store, "c1", "hub", 0.9, RelationshipType::Causes);
    link(&store, "c2", "hub", 0.9, RelationshipType::Causes);
    link(&store, "f1", "hub", 0.9, RelationshipType::Fixes);
    link(&store, "hub", "r1", 0.9, RelationshipType::Related);

    let counts = store.get_relationship_types("hub").unwrap();
    assert_eq!(counts["causes"], 2);
    assert_eq!(counts["fixes"], 1);
    assert_eq!(counts["related"], 1);

    // Isolated node yields an empty map, never an error
    let empty = store.get_relationship_types("loner").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn subgraph_respects_the_hop_radius() {
    let store = test_store();
    link(&store, "center", "a", 0.9, RelationshipType::Related);
    link(&store, "a", "b", 0.9, RelationshipType::Related);
    link(&store, "b", "far", 0.9, RelationshipType::Related);
    // A back edge inside the radius must appear in the induced edge set
    link(&store, "b", "center", 0.7, RelationshipType::Supports);

    let subgraph = store.get_memory_subgraph("center", 2).unwrap();

    let mut nodes = subgraph.nodes.clone();
    nodes.sort_unstable();
    assert_eq!(nodes, ["a", "b", "center"], "'far' needs a third hop");

    assert_eq!(subgraph.edges.len(), 3);
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.source_hash == "b" && e.target_hash == "center"));
    assert!(!subgraph
        .edges
        .iter()
        .any(|e| e.source_hash == "b" && e.target_hash == "far"));
}

#[test]
fn subgraph_of_isolated_node_is_just_the_center() {
    let store = test_store();
    let subgraph = store.get_memory_subgraph("alone", 3).unwrap();
    assert_eq!(subgraph.nodes, ["alone"]);
    assert!(subgraph.edges.is_empty());
}
