//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use tiered_grid::config::NetworkConfig;
use tiered_grid::devices::{Consumer, Generator};
use tiered_grid::grid::{Coord, Direction};
use tiered_grid::sim::layout::{free_ports, random_tree};
use tiered_grid::sim::world::GridWorld;
use tiered_grid::voltage::Tier;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Network bounds with a short expiry for tick-driven tests.
pub fn network_config(max_network_size: usize, cache_expiry_ticks: u64) -> NetworkConfig {
    NetworkConfig {
        max_network_size,
        cache_expiry_ticks,
    }
}

/// A consumer that takes anything offered for a long while.
pub fn hungry(tier: Tier) -> Consumer {
    Consumer::new(tier, 1_000_000, 1_000_000, 0)
}

/// Source at the origin, `len` cables along +x, `sink` right after them.
pub fn line_world(len: i32, source: Generator, sink: Consumer) -> GridWorld {
    let mut world = GridWorld::new();
    world.place_device(Coord::new(0, 0, 0), source);
    for x in 1..=len {
        world.place_cable(Coord::new(x, 0, 0));
    }
    world.place_device(Coord::new(len + 1, 0, 0), sink);
    world
}

/// Most consumers [`tree_world`] attaches; keeps a T1 packet splittable
/// between all of them.
pub const MAX_TREE_CONSUMERS: usize = 16;

/// A seeded cable tree with a generator on its first free port and a
/// consumer on every `spacing`-th remaining port, up to
/// [`MAX_TREE_CONSUMERS`].
///
/// Returns `(world, source, cables, consumers)`.
pub fn tree_world(
    cells: usize,
    seed: u64,
    spacing: usize,
) -> (GridWorld, Coord, Vec<Coord>, Vec<Coord>) {
    let mut world = GridWorld::new();
    let cables = random_tree(&mut world, Coord::new(0, 0, 0), cells, seed);
    let ports: Vec<(Coord, Direction)> = free_ports(&world, &cables);

    let source = ports[0].0;
    world.place_device(source, Generator::new(Tier::T1, 32, 1000));

    let mut consumers = Vec::new();
    for (spot, _) in ports.iter().skip(1).step_by(spacing.max(1)) {
        if consumers.len() == MAX_TREE_CONSUMERS {
            break;
        }
        // Ports next to an already placed machine would chain machines.
        if spot.neighbors().iter().any(|n| world.device(*n).is_some()) {
            continue;
        }
        world.place_device(*spot, hungry(Tier::T1));
        consumers.push(*spot);
    }
    (world, source, cables, consumers)
}
