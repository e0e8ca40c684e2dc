//! Fair-share distribution scenarios through the cache and a real world.

mod common;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tiered_grid::config::OvervoltageConfig;
use tiered_grid::devices::{Consumer, Device};
use tiered_grid::distribute::{DistributionRequest, Distributor};
use tiered_grid::grid::{Coord, Direction, DirectionSet};
use tiered_grid::network::NetworkCache;
use tiered_grid::sim::world::GridWorld;
use tiered_grid::voltage::{Tier, TierTable};

fn distributor() -> Distributor {
    Distributor::new(TierTable::default(), OvervoltageConfig::default())
}

/// Source at the origin feeding a cable bus along +x with one consumer
/// hanging above each bus cable.
fn bus_world(consumers: &[Consumer]) -> (GridWorld, Vec<Coord>) {
    let mut world = GridWorld::new();
    let mut spots = Vec::new();
    for (i, consumer) in consumers.iter().enumerate() {
        let bus = Coord::new(i as i32 + 1, 0, 0);
        world.place_cable(bus);
        let spot = bus.relative(Direction::Up);
        world.place_device(spot, consumer.clone());
        spots.push(spot);
    }
    (world, spots)
}

fn t1_request(available: u64) -> DistributionRequest {
    DistributionRequest {
        available,
        packet_limit: 32,
        packet_size: 32,
        source_tier: Some(Tier::T1),
    }
}

#[test]
fn hundred_energy_three_hungry_sinks() {
    common::init_tracing();
    let sink = Consumer::new(Tier::T1, 1000, 50, 0);
    let (mut world, spots) = bus_world(&[sink.clone(), sink.clone(), sink]);
    let mut cache = NetworkCache::new(&common::network_config(4096, 100));
    let sinks = cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);
    assert_eq!(sinks.len(), 3);

    let report = distributor().distribute(&mut world, &t1_request(100), &sinks);
    assert_eq!(report.total, 30);
    assert_eq!(report.remaining, 70);
    for spot in spots {
        assert_eq!(world.device(spot).map(|d| d.stored()), Some(10));
    }
}

#[test]
fn transfers_are_conserved_and_bounded() {
    common::init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let n = rng.random_range(1..=8);
        let consumers: Vec<Consumer> = (0..n)
            .map(|_| {
                let capacity = rng.random_range(0..=64);
                let max_input = rng.random_range(1..=64);
                Consumer::new(Tier::T1, capacity, max_input, 0)
            })
            .collect();
        let (mut world, spots) = bus_world(&consumers);
        let mut cache = NetworkCache::new(&common::network_config(4096, 100));
        let sinks = cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);

        let available = rng.random_range(0..=200);
        let before: u64 = spots.iter().filter_map(|s| world.device(*s)).map(|d| d.stored()).sum();
        let report = distributor().distribute(&mut world, &t1_request(available), &sinks);
        let after: u64 = spots.iter().filter_map(|s| world.device(*s)).map(|d| d.stored()).sum();

        assert!(report.total <= available.min(32));
        assert_eq!(report.total + report.remaining, available);
        assert_eq!(after - before, report.total);
        assert_eq!(
            report.transfers.iter().map(|t| t.amount).sum::<u64>(),
            report.total
        );
    }
}

#[test]
fn shares_are_even_when_nobody_is_capped() {
    common::init_tracing();
    let sink = common::hungry(Tier::T2);
    let (mut world, _) = bus_world(&[sink.clone(), sink.clone(), sink.clone(), sink]);
    let mut cache = NetworkCache::new(&common::network_config(4096, 100));
    let sinks = cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);

    let request = DistributionRequest {
        available: 1000,
        packet_limit: 128,
        packet_size: 128,
        source_tier: Some(Tier::T2),
    };
    let report = distributor().distribute(&mut world, &request, &sinks);
    assert_eq!(report.transfers.len(), 4);
    assert!(report.transfers.iter().all(|t| t.amount == 32));
}

#[test]
fn untiered_packets_never_overvolt() {
    common::init_tracing();
    let (mut world, _) = bus_world(&[common::hungry(Tier::T1), Consumer::untiered(100, 100, 0)]);
    let mut cache = NetworkCache::new(&common::network_config(4096, 100));
    let sinks = cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);

    let request = DistributionRequest {
        available: 60,
        packet_limit: 60,
        packet_size: 0,
        source_tier: None,
    };
    let report = distributor().distribute(&mut world, &request, &sinks);
    assert!(report.overvolted.is_empty());
    assert_eq!(report.total, 60);
    assert!(world.events().is_empty());
}

#[test]
fn lazy_protection_skips_sinks_without_demand() {
    common::init_tracing();
    // Full T1 consumer next to a T2 feed: no demand, no consequence.
    let (mut world, _) = bus_world(&[Consumer::new(Tier::T1, 0, 32, 0)]);
    let mut cache = NetworkCache::new(&common::network_config(4096, 100));
    let sinks = cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);

    let request = DistributionRequest {
        available: 500,
        packet_limit: 128,
        packet_size: 128,
        source_tier: Some(Tier::T2),
    };
    let report = distributor().distribute(&mut world, &request, &sinks);
    assert!(report.overvolted.is_empty());
    assert!(world.events().is_empty());
}
