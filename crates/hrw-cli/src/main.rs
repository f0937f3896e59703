//! `hrw` — query a weighted rendezvous hashing registry from the shell.
//!
//! # Usage
//!
//! ```text
//! hrw -c nodes.toml lookup user:42          # best node for a key
//! hrw -c nodes.toml rank user:42 -n 3       # top 3 nodes with scores
//! hrw --node a --node b=2 nodes             # nodes given inline
//! hrw -c nodes.toml distribution -n 100000  # sampled share per node
//! hrw -c nodes.toml diff --remove a --add d=1.5
//! ```

mod config;
mod telemetry;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hrw_placement::{Registry, RegistryError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use config::{CliConfig, parse_node_spec};

/// Length of sampled keys.
const SAMPLE_KEY_LEN: usize = 11;
const SAMPLE_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "hrw", version, about = "Weighted rendezvous hashing lookups")]
struct Cli {
    /// Path to TOML config file with the node list.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node as `name` or `name=weight`; replaces the config's node list.
    ///
    /// Can be specified multiple times.
    #[arg(long = "node", global = true)]
    nodes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node responsible for a key.
    Lookup {
        /// Key to place.
        key: String,
    },

    /// Print nodes ranked from best to worst for a key, with scores.
    Rank {
        /// Key to place.
        key: String,

        /// Only print the top N nodes.
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// List the configured nodes and their weights.
    Nodes,

    /// Sample random keys and report each node's share.
    Distribution {
        /// Number of keys to sample.
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        /// Seed for key generation (random if omitted).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Report how many sampled keys move after a membership change.
    Diff {
        /// Node to remove (can be repeated).
        #[arg(long)]
        remove: Vec<String>,

        /// Node to add as `name` or `name=weight` (can be repeated).
        #[arg(long)]
        add: Vec<String>,

        /// Number of keys to sample.
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        /// Seed for key generation (random if omitted).
        #[arg(long)]
        seed: Option<u64>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.override_nodes(&cli.nodes)?;
    telemetry::init(&config.log.level);

    let registry = Registry::new(config.nodes);
    debug!(nodes = registry.node_count(), "loaded registry");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Lookup { key } => cmd_lookup(&registry, &key, &mut out),
        Commands::Rank { key, top } => cmd_rank(&registry, &key, top, &mut out),
        Commands::Nodes => cmd_nodes(&registry, &mut out),
        Commands::Distribution { count, seed } => {
            let keys = sample_keys(resolve_seed(seed), count);
            cmd_distribution(&registry, &keys, &mut out)
        }
        Commands::Diff {
            remove,
            add,
            count,
            seed,
        } => {
            let keys = sample_keys(resolve_seed(seed), count);
            cmd_diff(&registry, &remove, &add, &keys, &mut out)
        }
    }
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_lookup(registry: &Registry, key: &str, out: &mut impl Write) -> Result<()> {
    let node = registry
        .get_node(key)
        .context("no nodes configured (use --config or --node)")?;
    writeln!(out, "{node}")?;
    Ok(())
}

fn cmd_rank(
    registry: &Registry,
    key: &str,
    top: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let scores: BTreeMap<&str, f64> = registry
        .scores(key)
        .into_iter()
        .map(|s| (s.name, s.score))
        .collect();
    let ranked = match top {
        Some(n) => registry.top_nodes(key, n),
        None => registry.get_nodes_ranked(key),
    };

    for (position, name) in ranked.iter().enumerate() {
        writeln!(out, "{:>3}  {:<24} {:.6}", position + 1, name, scores[name])?;
    }
    Ok(())
}

fn cmd_nodes(registry: &Registry, out: &mut impl Write) -> Result<()> {
    for name in registry.node_names() {
        let weight = registry.weight(name).unwrap_or_default();
        writeln!(out, "{name:<24} {weight}")?;
    }
    Ok(())
}

fn cmd_distribution(registry: &Registry, keys: &[String], out: &mut impl Write) -> Result<()> {
    let counts = count_owners(registry, keys)?;
    let total_weight: f64 = registry
        .node_names()
        .iter()
        .filter_map(|name| registry.weight(name))
        .sum();

    writeln!(out, "{:<24} {:>8} {:>8} {:>8}", "node", "keys", "share", "ideal")?;
    for name in registry.node_names() {
        let count = counts.get(name).copied().unwrap_or(0);
        let share = count as f64 / keys.len().max(1) as f64;
        let ideal = if total_weight > 0.0 {
            registry.weight(name).unwrap_or_default() / total_weight
        } else {
            0.0
        };
        writeln!(out, "{name:<24} {count:>8} {share:>8.4} {ideal:>8.4}")?;
    }
    Ok(())
}

fn cmd_diff(
    registry: &Registry,
    remove: &[String],
    add: &[String],
    keys: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut changed = registry.clone();
    for name in remove {
        changed.remove_node(name)?;
    }
    for spec in add {
        changed.add_node(parse_node_spec(spec)?)?;
    }

    let migrations = Registry::diff(registry, &changed, keys);
    let mut flows: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for m in &migrations {
        *flows.entry((m.from.as_str(), m.to.as_str())).or_default() += 1;
    }

    let moved = migrations.len() as f64 / keys.len().max(1) as f64;
    info!(moved = migrations.len(), sampled = keys.len(), "computed diff");
    writeln!(
        out,
        "{} of {} keys moved ({:.2}%)",
        migrations.len(),
        keys.len(),
        moved * 100.0
    )?;
    for ((from, to), count) in flows {
        writeln!(out, "  {from} -> {to}: {count}")?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

/// Count how many keys each node owns.
fn count_owners<'a>(
    registry: &'a Registry,
    keys: &[String],
) -> Result<BTreeMap<&'a str, usize>, RegistryError> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(registry.get_node(key)?).or_default() += 1;
    }
    Ok(counts)
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

/// Generate `count` random alphanumeric keys from a seed.
fn sample_keys(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (0..SAMPLE_KEY_LEN)
                .map(|_| SAMPLE_CHARSET[rng.random_range(0..SAMPLE_CHARSET.len())] as char)
                .collect()
        })
        .collect()
}
