//! Ordered map demo.
//!
//! Fills a map with random numeric keys, walks it, exercises the typed
//! accessors, then deletes every key while checking the tree after each
//! step. Set `RUST_LOG=debug` to see the library's own diagnostics.

use std::collections::BTreeSet;

use clap::{Parser, ValueEnum};
use ordmap::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Engine backing the demo map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// Red-black tree
    #[default]
    RedBlack,
    /// AVL tree with balance factors and parent links
    Avl,
    /// AVL tree with stored heights, recursive
    RecursiveAvl,
}

/// Command line options
#[derive(Parser, Debug, Clone)]
#[command(name = "ordmap-demo", about = "Exercise an ordered map with random keys")]
struct DemoConfig {
    /// Tree engine
    #[arg(long, default_value = "red-black", value_enum)]
    engine: EngineKind,

    /// Number of random puts; keys are drawn from 0..count
    #[arg(long, default_value = "20")]
    count: u64,

    /// Order keys as integers instead of strings
    #[arg(long, default_value = "false")]
    numeric: bool,

    /// Seed for the key generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Key to look up, type-check and delete
    #[arg(long, default_value = "9")]
    probe: String,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DemoConfig::parse();
    tracing::info!(engine = ?config.engine, count = config.count, "starting demo");

    match config.engine {
        EngineKind::RedBlack => run::<RedBlackTree<String, Value>>(&config),
        EngineKind::Avl => run::<AvlTree<String, Value>>(&config),
        EngineKind::RecursiveAvl => run::<RecursiveAvlTree<String, Value>>(&config),
    }
}

fn run<E>(config: &DemoConfig)
where
    E: TreeEngine<Key = String, Value = Value> + Default,
{
    let map: OrderedMap<E> = OrderedMap::new();
    if config.numeric {
        map.set_comparator(Comparator::numeric());
    }

    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut inserted = BTreeSet::new();
    for _ in 0..config.count {
        let key = rng.gen_range(0..config.count.max(1)).to_string();
        tracing::info!(%key, "add key");
        map.put(key.clone(), Value::String(key.clone()));
        inserted.insert(key);
    }
    tracing::info!(len = map.len(), height = map.height(), "map filled");

    let mut entries = map.iter();
    while entries.has_next() {
        if let Some((key, value)) = entries.next() {
            tracing::info!(%key, %value, "iterator");
        }
    }

    let probe = &config.probe;
    report_lookup(&map, probe);
    if let Err(error) = map.get_int(probe) {
        tracing::info!(%error, "typed get rejected");
    }
    report_check(&map);

    map.delete(probe);
    report_lookup(&map, probe);
    tracing::info!(keys = ?map.key_list(), len = map.len(), "key list");
    tracing::info!(keys = ?map.key_sorted_list(), len = map.len(), "sorted key list");

    for key in &inserted {
        let found = map.get(key);
        tracing::info!(%key, ?found, "delete key");
        map.delete(key);
        if !map.check() {
            tracing::error!(len = map.len(), "tree is broken");
        }
    }

    tracing::info!(keys = ?map.key_list(), len = map.len(), "key list");
    tracing::info!(keys = ?map.key_sorted_list(), len = map.len(), "sorted key list");
    report_check(&map);
}

fn report_lookup<E>(map: &OrderedMap<E>, key: &String)
where
    E: TreeEngine<Key = String, Value = Value>,
{
    match map.get(key) {
        Some(value) => tracing::info!(%key, %value, "key exists"),
        None => tracing::info!(%key, "key does not exist"),
    }
}

fn report_check<E>(map: &OrderedMap<E>)
where
    E: TreeEngine<Key = String, Value = Value>,
{
    match map.verify() {
        Ok(()) => tracing::info!(len = map.len(), "tree invariants hold"),
        Err(violation) => tracing::error!(%violation, "tree invariants broken"),
    }
}
