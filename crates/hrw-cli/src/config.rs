//! TOML configuration for the `hrw` command.
//!
//! ```toml
//! [[nodes]]
//! name = "cache-a"
//! weight = 2.0
//!
//! [[nodes]]
//! name = "cache-b"   # weight defaults to 1.0
//!
//! [log]
//! level = "debug"
//! ```

use std::path::Path;

use anyhow::{Context, bail};
use hrw_placement::Node;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Initial node list.
    pub nodes: Vec<Node>,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or start empty if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Replace the configured nodes with ones given on the command line.
    pub fn override_nodes(&mut self, specs: &[String]) -> anyhow::Result<()> {
        if specs.is_empty() {
            return Ok(());
        }
        self.nodes = specs
            .iter()
            .map(|s| parse_node_spec(s))
            .collect::<anyhow::Result<_>>()?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.nodes.iter().try_for_each(validate_node)
    }
}

/// Reject nodes the registry cannot place keys with sensibly.
pub fn validate_node(node: &Node) -> anyhow::Result<()> {
    if node.name.is_empty() {
        bail!("node name must not be empty");
    }
    if !node.weight.is_finite() || node.weight < 0.0 {
        bail!(
            "node {} has invalid weight {} (must be finite and >= 0)",
            node.name,
            node.weight
        );
    }
    Ok(())
}

/// Parse and validate a `name` or `name=weight` node spec.
///
/// `=` separates the weight so names like `10.0.0.1:6379` stay intact.
pub fn parse_node_spec(spec: &str) -> anyhow::Result<Node> {
    let node = match spec.rsplit_once('=') {
        Some((name, weight)) => {
            let weight: f64 = weight
                .trim()
                .parse()
                .with_context(|| format!("invalid weight in node spec {spec:?}"))?;
            Node::new(name.trim(), weight)
        }
        None => Node::new(spec.trim(), 1.0),
    };
    validate_node(&node)?;
    Ok(node)
}
