//! Node registry and key selection.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{RegistryError, Result};
use crate::hash::{identity_hash, key_hash};
use crate::score::score_hashed;

fn default_weight() -> f64 {
    1.0
}

/// A named, weighted node as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node name.
    pub name: String,
    /// Relative share of keys this node should receive.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Node {
    /// Create a node descriptor.
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Per-node record kept by the registry.
#[derive(Debug, Clone, PartialEq)]
struct NodeEntry {
    weight: f64,
    /// Cached `identity_hash(name)`.
    identity_hash: u64,
}

impl NodeEntry {
    fn new(name: &str, weight: f64) -> Self {
        Self {
            weight,
            identity_hash: identity_hash(name),
        }
    }
}

/// A node together with its score for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredNode<'a> {
    /// Node name.
    pub name: &'a str,
    /// Weighted HRW score for the key.
    pub score: f64,
}

/// A key whose best node differs between two registry states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that must move.
    pub key: String,
    /// The node that owned it before the change.
    pub from: String,
    /// The node that owns it after the change.
    pub to: String,
}

/// Registry of weighted nodes answering rendezvous hashing queries.
///
/// Nodes are kept ordered by name, so scans (and therefore tie-breaks) are
/// deterministic across instances. The registry does no internal locking:
/// lookups take `&self`, mutations take `&mut self`. Callers that need
/// concurrent reads during membership changes should build a new registry
/// and swap it in.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    nodes: BTreeMap<String, NodeEntry>,
}

impl Registry {
    /// Build a registry from an initial node list.
    ///
    /// If the list names the same node more than once, the last occurrence
    /// wins.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut registry = Self::default();
        for node in nodes {
            let entry = NodeEntry::new(&node.name, node.weight);
            if registry.nodes.insert(node.name.clone(), entry).is_some() {
                debug!(node = %node.name, "duplicate node in initial list, keeping last");
            }
        }
        debug!(count = registry.nodes.len(), "built registry");
        registry
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return all node names, in ascending order.
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// Return `true` if a node with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Return the weight of a node, if present.
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.nodes.get(name).map(|entry| entry.weight)
    }

    /// Add a node.
    ///
    /// The weight is stored as given. Fails with
    /// [`RegistryError::DuplicateNode`] if the name is taken; to change a
    /// node's weight, remove it and add it again.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        match self.nodes.entry(node.name) {
            Entry::Occupied(occupied) => {
                Err(RegistryError::DuplicateNode(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let entry = NodeEntry::new(vacant.key(), node.weight);
                debug!(node = %vacant.key(), weight = node.weight, "added node to registry");
                vacant.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove a node by name.
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        match self.nodes.remove(name) {
            Some(_) => {
                debug!(node = %name, "removed node from registry");
                Ok(())
            }
            None => Err(RegistryError::NodeNotFound(name.to_string())),
        }
    }

    /// Score every node for `key`, in ascending name order.
    fn scored<'a>(&'a self, key: &str) -> impl Iterator<Item = ScoredNode<'a>> + 'a {
        let key_hash = key_hash(key);
        self.nodes.iter().map(move |(name, entry)| ScoredNode {
            name: name.as_str(),
            score: score_hashed(key_hash, entry.identity_hash, entry.weight),
        })
    }

    /// Return every node's score for `key`, unsorted.
    pub fn scores(&self, key: &str) -> Vec<ScoredNode<'_>> {
        self.scored(key).collect()
    }

    /// Return the node responsible for `key`.
    ///
    /// On an exact score tie the node with the smallest name wins, which is
    /// always the first entry of [`get_nodes_ranked`](Self::get_nodes_ranked).
    pub fn get_node(&self, key: &str) -> Result<&str> {
        let mut best: Option<ScoredNode<'_>> = None;
        for candidate in self.scored(key) {
            match best {
                Some(current) if candidate.score.total_cmp(&current.score).is_le() => {}
                _ => best = Some(candidate),
            }
        }

        let best = best.ok_or(RegistryError::EmptyRegistry)?;
        trace!(key, node = best.name, score = best.score, "selected node");
        Ok(best.name)
    }

    /// Return all node names ordered from best to worst for `key`.
    ///
    /// Returns an empty list when the registry is empty.
    pub fn get_nodes_ranked(&self, key: &str) -> Vec<&str> {
        let mut scored = self.scores(key);
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(b.name)));
        scored.into_iter().map(|s| s.name).collect()
    }

    /// Return the `n` best nodes for `key`.
    ///
    /// If fewer than `n` nodes exist, returns all of them.
    pub fn top_nodes(&self, key: &str, n: usize) -> Vec<&str> {
        let mut ranked = self.get_nodes_ranked(key);
        ranked.truncate(n);
        ranked
    }

    /// Compute which keys change owner between two registry states.
    ///
    /// Keys are skipped when either registry is empty.
    pub fn diff<K: AsRef<str>>(old: &Registry, new: &Registry, keys: &[K]) -> Vec<Migration> {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            let (Ok(from), Ok(to)) = (old.get_node(key), new.get_node(key)) else {
                continue;
            };
            if from != to {
                migrations.push(Migration {
                    key: key.to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        migrations
    }
}

impl FromIterator<Node> for Registry {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::new(iter)
    }
}
