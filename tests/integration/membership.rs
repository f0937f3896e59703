//! Integration test: membership changes.
//!
//! Grow and shrink a registry through its public API and check that
//! counts, error handling, and key distribution behave at every step.

use hrw_integration_tests::{SAMPLE_SIZE, assert_uniform, equal_weight_registry, random_keys};
use hrw_placement::{Node, Registry, RegistryError};

/// Seven equal nodes, remove one, add two: every step stays uniform.
#[test]
fn test_uniform_through_remove_and_add() {
    let mut registry = Registry::default();
    for i in 0..7 {
        registry.add_node(Node::new(i.to_string(), 1.0)).unwrap();
    }
    assert_eq!(registry.node_count(), 7);
    assert_uniform(&registry, &random_keys(100, SAMPLE_SIZE));

    registry.remove_node("0").unwrap();
    assert_eq!(registry.node_count(), 6);
    assert_uniform(&registry, &random_keys(101, SAMPLE_SIZE));

    registry.add_node(Node::new("new0", 1.0)).unwrap();
    registry.add_node(Node::new("new1", 1.0)).unwrap();
    assert_eq!(registry.node_count(), 8);
    assert_uniform(&registry, &random_keys(102, SAMPLE_SIZE));
}

#[test]
fn test_failed_mutations_leave_registry_untouched() {
    let mut registry = equal_weight_registry(&["a", "b", "c"]);
    let keys = random_keys(103, 500);
    let before: Vec<String> = keys
        .iter()
        .map(|k| registry.get_node(k).unwrap().to_string())
        .collect();

    assert_eq!(
        registry.add_node(Node::new("b", 10.0)),
        Err(RegistryError::DuplicateNode("b".to_string()))
    );
    assert_eq!(
        registry.remove_node("d"),
        Err(RegistryError::NodeNotFound("d".to_string()))
    );
    assert_eq!(registry.node_count(), 3);

    for (key, owner) in keys.iter().zip(&before) {
        assert_eq!(registry.get_node(key).unwrap(), owner);
    }
}

#[test]
fn test_drain_to_empty() {
    let mut registry = equal_weight_registry(&["a", "b"]);
    registry.remove_node("a").unwrap();
    assert_eq!(registry.get_node("k").unwrap(), "b");

    registry.remove_node("b").unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.get_node("k"), Err(RegistryError::EmptyRegistry));
    assert!(registry.get_nodes_ranked("k").is_empty());
}

#[test]
fn test_independent_registries_agree() {
    // Two owners that learned about the same nodes in different orders.
    let names: Vec<String> = (0..12).map(|i| format!("cache-{i:02}")).collect();
    let left = equal_weight_registry(&names);
    let mut right = Registry::default();
    for name in names.iter().rev() {
        right.add_node(Node::new(name.clone(), 1.0)).unwrap();
    }

    for key in random_keys(104, 2_000) {
        assert_eq!(left.get_node(&key), right.get_node(&key));
        assert_eq!(left.top_nodes(&key, 3), right.top_nodes(&key, 3));
    }
}
