//! Shared helpers for the placement integration tests.
//!
//! Provides seeded random key generation and share accounting over a
//! [`Registry`], plus [`assert_uniform`] for checking that equal-weight
//! nodes each receive their fair share.

use std::collections::BTreeMap;

use hrw_placement::{Node, Registry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of sampled keys per distribution check.
pub const SAMPLE_SIZE: usize = 10_000;

/// Maximum allowed distance between a node's share and its ideal share.
pub const MAX_SHARE_DIFFERENCE: f64 = 0.03;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate `count` random 11-character alphanumeric keys from a seed.
pub fn random_keys(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (0..11)
                .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
                .collect()
        })
        .collect()
}

/// Build a registry where every named node has weight 1.
pub fn equal_weight_registry<S: AsRef<str>>(names: &[S]) -> Registry {
    names
        .iter()
        .map(|name| Node::new(name.as_ref(), 1.0))
        .collect()
}

/// Fraction of `keys` owned by each node.
pub fn owner_shares(registry: &Registry, keys: &[String]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        let owner = registry.get_node(key).expect("registry must not be empty");
        *counts.entry(owner.to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(node, count)| (node, count as f64 / keys.len() as f64))
        .collect()
}

/// Assert every node in `registry` owns roughly `1 / node_count` of `keys`.
pub fn assert_uniform(registry: &Registry, keys: &[String]) {
    let shares = owner_shares(registry, keys);
    let ideal = 1.0 / registry.node_count() as f64;

    for name in registry.node_names() {
        let share = shares.get(name).copied().unwrap_or(0.0);
        assert!(
            (share - ideal).abs() <= MAX_SHARE_DIFFERENCE,
            "expected {ideal:.2}, got {share:.2} on node {name}"
        );
    }
}
