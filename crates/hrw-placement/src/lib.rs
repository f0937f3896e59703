//! Weighted rendezvous hashing for deterministic key placement.
//!
//! This crate implements highest random weight (HRW) hashing: every
//! (key, node) pair gets an independent pseudo-random score and the key is
//! owned by the node with the highest score. Nodes carry weights, and a
//! node's long-run share of keys is proportional to its weight.
//!
//! Adding or removing a node only moves the keys that node wins or loses;
//! every other key keeps its owner. Node identity hashes depend only on node
//! names, so independent registries holding the same nodes always agree.
//!
//! - [`Registry`] holds the node set and answers lookups
//!   ([`Registry::get_node`], [`Registry::get_nodes_ranked`]).
//! - [`score`] is the underlying per-pair scoring function.

mod error;
pub mod hash;
mod registry;
mod score;

pub use error::{RegistryError, Result};
pub use registry::{Migration, Node, Registry, ScoredNode};
pub use score::{score, score_hashed};
