//! Simulation engine that drives placements, safety checks and energy flow.

use tracing::debug;

use crate::config::GridConfig;
use crate::devices::{Device, Machine};
use crate::distribute::{DistributionRequest, Distributor};
use crate::grid::{Coord, Direction, DirectionSet, GridOracle};
use crate::network::{CacheRegistry, CacheStats, NetworkCache, ReachableSink, WorldId};
use crate::overvoltage::OvervoltageEvaluator;
use crate::voltage::TierTable;

use super::clock::Clock;
use super::types::TickResult;
use super::world::{Cell, GridWorld, WorldEvent};

/// Simulation engine owning one world, its network cache and the grid
/// configuration.
///
/// Every placement is checked for overvoltage right away and once more on
/// the following tick, when neighbours placed in the same tick are in
/// place. Every change to the world, including cells lost to overvoltage
/// destruction, is fed back into cache invalidation.
pub struct Engine {
    config: GridConfig,
    world: GridWorld,
    world_id: WorldId,
    registry: CacheRegistry,
    evaluator: OvervoltageEvaluator,
    distributor: Distributor,
    tiers: TierTable,
    /// (due tick, placed cell)
    pending_checks: Vec<(u64, Coord)>,
    events_seen: usize,
    current: TickResult,
}

impl Engine {
    /// Creates an engine over an empty world.
    pub fn new(config: GridConfig) -> Self {
        Self::with_world(config, GridWorld::new())
    }

    /// Creates an engine over a prebuilt world.
    ///
    /// Cells already in `world` are not checked for overvoltage. Out-of-range
    /// config values are clamped before use.
    pub fn with_world(config: GridConfig, world: GridWorld) -> Self {
        let config = config.clamped();
        let tiers = config.tier_table();
        let world_id = WorldId(0);
        let mut registry = CacheRegistry::new(config.network.clone());
        registry.load_world(world_id);

        let mut engine = Self {
            evaluator: OvervoltageEvaluator::new(config.overvoltage.clone()),
            distributor: Distributor::new(tiers, config.overvoltage.clone()),
            events_seen: world.events().len(),
            config,
            world,
            world_id,
            registry,
            tiers,
            pending_checks: Vec::new(),
            current: TickResult::default(),
        };
        engine.sync_world();
        engine
    }

    /// Places an all-faces cable and runs the placement check.
    ///
    /// Returns whether the check applied a consequence.
    pub fn place_cable(&mut self, coord: Coord) -> bool {
        self.world.place_cable(coord);
        self.after_placement(coord)
    }

    /// Places a cable restricted to `mask` and runs the placement check.
    pub fn place_cable_with(&mut self, coord: Coord, mask: DirectionSet) -> bool {
        self.world.place_cable_with(coord, mask);
        self.after_placement(coord)
    }

    /// Places a machine and runs the placement check.
    pub fn place_device(&mut self, coord: Coord, device: impl Into<Machine>) -> bool {
        self.world.place_device(coord, device);
        self.after_placement(coord)
    }

    /// Clears a cell and invalidates every network it was part of.
    pub fn remove(&mut self, coord: Coord) -> Option<Cell> {
        let old = self.world.remove(coord);
        self.sync_world();
        old
    }

    /// Executes one tick and returns what happened during it.
    ///
    /// Order: advance the world tick, tick every machine, run the delayed
    /// placement checks that are due, then let every extracting machine
    /// distribute in coordinate order.
    pub fn step(&mut self) -> TickResult {
        self.sync_world();
        let before = self.cache_stats();

        self.world.advance_ticks(1);
        self.world.tick_devices();
        let tick = self.world.current_tick();

        let (due, later): (Vec<_>, Vec<_>) = self
            .pending_checks
            .drain(..)
            .partition(|(at, _)| *at <= tick);
        self.pending_checks = later;
        for (_, coord) in due {
            if !self.world.is_empty(coord) {
                self.run_check(coord);
            }
        }

        let sources: Vec<Coord> = self
            .world
            .devices()
            .filter(|(_, d)| d.capability(None).is_some_and(|c| c.can_extract))
            .map(|(c, _)| c)
            .collect();
        for source in sources {
            self.distribute_from(source);
            self.sync_world();
        }

        let after = self.cache_stats();
        let mut result = std::mem::take(&mut self.current);
        result.tick = tick;
        result.cache_hits = after.hits - before.hits;
        result.cache_misses = after.misses - before.misses;
        result.truncated_scans = after.truncated_scans - before.truncated_scans;
        debug!(
            tick,
            sources = result.sources,
            energy = result.energy_moved,
            incidents = result.incidents(),
            "tick complete"
        );
        result
    }

    /// Executes `ticks` steps and returns their records.
    pub fn run(&mut self, ticks: u64) -> Vec<TickResult> {
        let mut clock = Clock::new(self.world.current_tick(), ticks);
        let mut results = Vec::with_capacity(clock.remaining() as usize);
        clock.run(|_| results.push(self.step()));
        results
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Direct world access. Changes made here are invalidated on the next
    /// engine call but never checked for overvoltage.
    pub fn world_mut(&mut self) -> &mut GridWorld {
        &mut self.world
    }

    pub fn world_id(&self) -> WorldId {
        self.world_id
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The network cache of the engine's world.
    pub fn cache(&self) -> Option<&NetworkCache> {
        self.registry.cache(self.world_id)
    }

    /// Placement checks scheduled for a later tick.
    pub fn pending_checks(&self) -> usize {
        self.pending_checks.len()
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache().map(NetworkCache::stats).unwrap_or_default()
    }

    fn after_placement(&mut self, coord: Coord) -> bool {
        self.sync_world();
        if !self.config.overvoltage.enabled {
            return false;
        }
        let fired = self.run_check(coord);
        self.pending_checks
            .push((self.world.current_tick() + 1, coord));
        fired
    }

    fn run_check(&mut self, coord: Coord) -> bool {
        self.current.placement_checks += 1;
        let fired = self.evaluator.check_on_placement(&mut self.world, coord);
        if fired {
            self.current.placement_incidents += 1;
        }
        self.sync_world();
        fired
    }

    fn distribute_from(&mut self, source: Coord) {
        let Some(own) = self.world.capability_at(source, None) else {
            return;
        };
        if !own.can_extract || self.output_of(source) == 0 {
            return;
        }
        let sinks =
            self.registry
                .get_reachable(self.world_id, &self.world, source, DirectionSet::ALL);
        if sinks.is_empty() {
            return;
        }
        self.current.sources += 1;

        if own.bridge {
            // Each face emits at its own tier to the sinks behind it.
            for face in Direction::ALL {
                let group: Vec<ReachableSink> =
                    sinks.iter().filter(|s| s.via == face).copied().collect();
                if group.is_empty() {
                    continue;
                }
                let face_tier = self
                    .world
                    .capability_at(source, Some(face))
                    .and_then(|c| c.tier);
                let Some(tier) = face_tier else {
                    continue;
                };
                let ceiling = self.tiers.max_packet(tier);
                let request = DistributionRequest {
                    available: self.output_of(source),
                    packet_limit: ceiling,
                    packet_size: ceiling,
                    source_tier: Some(tier),
                };
                self.deliver(source, &request, &group);
            }
            return;
        }

        let available = self.output_of(source);
        let request = match own.tier {
            Some(tier) => {
                let ceiling = self.tiers.max_packet(tier);
                DistributionRequest {
                    available,
                    packet_limit: available.min(ceiling),
                    packet_size: ceiling,
                    source_tier: Some(tier),
                }
            }
            None => DistributionRequest {
                available,
                packet_limit: available,
                packet_size: 0,
                source_tier: None,
            },
        };
        self.deliver(source, &request, &sinks);
    }

    fn deliver(&mut self, source: Coord, request: &DistributionRequest, sinks: &[ReachableSink]) {
        if request.available == 0 {
            return;
        }
        let report = self.distributor.distribute(&mut self.world, request, sinks);
        // The source may already be gone if a consequence destroyed it.
        self.world.extract(source, report.total);
        self.current.transfers += report.transfers.len();
        self.current.energy_moved += report.total;
        self.current.overvolted_sinks += report.overvolted.len();
    }

    fn output_of(&self, source: Coord) -> u64 {
        self.world.device(source).map_or(0, |d| d.max_output())
    }

    /// Feeds journaled cell changes and new destruction events into
    /// invalidation.
    ///
    /// A change also counts as a change of its six neighbours, so a machine
    /// attached to a walked cable drops the networks through that cable.
    fn sync_world(&mut self) {
        let mut dropped = 0;
        for coord in self.world.take_changes() {
            dropped += self.registry.invalidate_at(self.world_id, coord);
            for n in coord.neighbors() {
                dropped += self.registry.invalidate_at(self.world_id, n);
            }
        }
        let fresh = self.world.events().get(self.events_seen..).unwrap_or(&[]);
        for event in fresh {
            if let WorldEvent::Destroyed {
                center,
                radius,
                removed,
            } = event
            {
                self.current.cells_destroyed += removed;
                dropped +=
                    self.registry
                        .invalidate_radius(self.world_id, *center, radius.ceil() as i32);
            }
        }
        self.events_seen = self.world.events().len();
        self.current.invalidated += dropped;
    }
}
