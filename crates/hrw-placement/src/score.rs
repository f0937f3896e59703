//! Weighted HRW scoring.
//!
//! For each (key, node) pair the mixed hash is turned into a uniform `u` in
//! `[0, 1)` and scored as `weight / -ln(u)`. Taking the maximum of these
//! scores across nodes selects each node with probability proportional to its
//! weight.
//!
//! `u == 0` happens with probability 2^-53. In that case `-ln(u)` is `+inf`
//! and the score collapses to `0.0` rather than `NaN`; the pair simply loses.

use crate::hash::{key_hash, mix, to_unit_float};

/// Score a key against a node whose identity hash is already known.
pub fn score(key: &str, identity_hash: u64, weight: f64) -> f64 {
    score_hashed(key_hash(key), identity_hash, weight)
}

/// Score using a precomputed key hash.
///
/// Lookups hash the key once and call this for every node.
pub fn score_hashed(key_hash: u64, identity_hash: u64, weight: f64) -> f64 {
    let u = to_unit_float(mix(key_hash, identity_hash));
    weight * (1.0 / -u.ln())
}
