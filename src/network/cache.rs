//! Per-world cache of source-to-sink reachability.
//!
//! A record maps a source coordinate to the sinks a bounded scan found from
//! it, together with the conductor cells the scan walked. The conductor set
//! is the invalidation key: any change at one of those cells, at a listed
//! sink, at the source or next to the source drops the record. Records also
//! expire after `cache_expiry_ticks`, and every hit re-validates its sinks
//! against the live world because capabilities can vanish without an
//! invalidation event.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::scan::bounded_scan;
use crate::config::NetworkConfig;
use crate::grid::{Coord, Direction, DirectionSet, GridOracle};
use crate::voltage::Tier;

/// Snapshot of a sink reachable from a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReachableSink {
    pub coord: Coord,
    /// Face of the sink the network touches.
    pub side: Direction,
    /// Face of the source the path to this sink leaves through.
    pub via: Direction,
    /// Tier on that face, `None` for untiered sinks.
    pub tier: Option<Tier>,
}

#[derive(Debug)]
struct CachedNetwork {
    sinks: Vec<ReachableSink>,
    conductors: HashSet<Coord>,
    directions: DirectionSet,
    created_at: u64,
    visited: usize,
    truncated: bool,
}

/// Read-only description of a cached record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkSummary {
    pub sink_count: usize,
    pub conductor_count: usize,
    pub created_at: u64,
    pub visited: usize,
    pub truncated: bool,
}

/// Counters exposed for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a valid record.
    pub hits: u64,
    /// Lookups with no usable record (including expired ones).
    pub misses: u64,
    /// Misses caused by an expired record.
    pub expired: u64,
    /// Scans executed.
    pub scans: u64,
    /// Scans that ran out of cell budget.
    pub truncated_scans: u64,
    /// Records dropped by invalidation.
    pub invalidated: u64,
}

/// Reachability cache for one world.
#[derive(Debug)]
pub struct NetworkCache {
    max_network_size: usize,
    expiry_ticks: u64,
    records: HashMap<Coord, CachedNetwork>,
    /// Cell -> keys of the records whose conductors or sinks include it.
    index: HashMap<Coord, HashSet<Coord>>,
    stats: CacheStats,
}

impl NetworkCache {
    /// Creates an empty cache bounded by `config`.
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            max_network_size: config.max_network_size,
            expiry_ticks: config.cache_expiry_ticks,
            records: HashMap::new(),
            index: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the live sinks reachable from `source` through `directions`.
    ///
    /// A valid record is re-validated and returned without scanning. A
    /// missing or expired record, or one scanned with different directions,
    /// triggers a fresh bounded scan whose result replaces it. The returned
    /// list is a copy in scan order.
    pub fn get_reachable<O>(
        &mut self,
        oracle: &O,
        source: Coord,
        directions: DirectionSet,
    ) -> Vec<ReachableSink>
    where
        O: GridOracle + ?Sized,
    {
        if directions.is_empty() {
            return Vec::new();
        }

        let now = oracle.current_tick();
        if let Some(record) = self.records.get(&source) {
            let fresh = now.saturating_sub(record.created_at) <= self.expiry_ticks;
            if fresh && record.directions == directions {
                self.stats.hits += 1;
                trace!(%source, sinks = record.sinks.len(), "network cache hit");
                return revalidate(oracle, &record.sinks);
            }
            if !fresh {
                self.stats.expired += 1;
            }
        }

        self.stats.misses += 1;
        self.remove(source);
        let record = self.scan(oracle, source, directions, now);
        let sinks = record.sinks.clone();
        self.insert(source, record);
        sinks
    }

    /// Drops every record affected by a change at `coord`.
    ///
    /// That is every record whose conductors or sinks contain `coord`, the
    /// record keyed at `coord`, and the records keyed at its six neighbours.
    /// Returns the number of records dropped.
    pub fn invalidate_at(&mut self, coord: Coord) -> usize {
        let mut keys: Vec<Coord> = self
            .index
            .get(&coord)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        keys.push(coord);
        keys.extend(coord.neighbors());

        let dropped = keys.into_iter().filter(|k| self.remove(*k)).count();
        if dropped > 0 {
            self.stats.invalidated += dropped as u64;
            debug!(%coord, dropped, "invalidated cached networks");
        }
        dropped
    }

    /// Drops every record keyed within `radius` (euclidean) of `center`.
    pub fn invalidate_radius(&mut self, center: Coord, radius: i32) -> usize {
        let r = i64::from(radius.max(0));
        let keys: Vec<Coord> = self
            .records
            .keys()
            .filter(|k| k.distance_sq(center) <= r * r)
            .copied()
            .collect();

        let dropped = keys.into_iter().filter(|k| self.remove(*k)).count();
        if dropped > 0 {
            self.stats.invalidated += dropped as u64;
            debug!(%center, radius, dropped, "invalidated cached networks in radius");
        }
        dropped
    }

    /// Drops all records. Counters are kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` when a record (valid or not) is held for `source`.
    pub fn contains(&self, source: Coord) -> bool {
        self.records.contains_key(&source)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Describes the record held for `source`, if any.
    pub fn summary(&self, source: Coord) -> Option<NetworkSummary> {
        self.records.get(&source).map(|r| NetworkSummary {
            sink_count: r.sinks.len(),
            conductor_count: r.conductors.len(),
            created_at: r.created_at,
            visited: r.visited,
            truncated: r.truncated,
        })
    }

    fn scan<O>(
        &mut self,
        oracle: &O,
        source: Coord,
        directions: DirectionSet,
        now: u64,
    ) -> CachedNetwork
    where
        O: GridOracle + ?Sized,
    {
        let limit = self.max_network_size;
        let outcome = bounded_scan(oracle, source, directions, limit, |c| c.can_receive);
        self.stats.scans += 1;

        if outcome.truncated {
            self.stats.truncated_scans += 1;
            warn!(
                %source,
                visited = outcome.visited,
                limit = self.max_network_size,
                "network scan hit the size bound, caching a partial network"
            );
        } else {
            debug!(
                %source,
                visited = outcome.visited,
                sinks = outcome.nodes.len(),
                "network scan complete"
            );
        }

        CachedNetwork {
            sinks: outcome
                .nodes
                .iter()
                .map(|n| ReachableSink {
                    coord: n.coord,
                    side: n.side,
                    via: n.via,
                    tier: n.capability.tier,
                })
                .collect(),
            conductors: outcome.conductors,
            directions,
            created_at: now,
            visited: outcome.visited,
            truncated: outcome.truncated,
        }
    }

    fn insert(&mut self, key: Coord, record: CachedNetwork) {
        let cells = record
            .conductors
            .iter()
            .copied()
            .chain(record.sinks.iter().map(|s| s.coord));
        for cell in cells {
            self.index.entry(cell).or_default().insert(key);
        }
        self.records.insert(key, record);
    }

    fn remove(&mut self, key: Coord) -> bool {
        let Some(record) = self.records.remove(&key) else {
            return false;
        };
        let cells = record
            .conductors
            .iter()
            .copied()
            .chain(record.sinks.iter().map(|s| s.coord));
        for cell in cells {
            if let Some(keys) = self.index.get_mut(&cell) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.index.remove(&cell);
                }
            }
        }
        true
    }
}

/// Keeps the sinks that still receive on the recorded face, with live tiers.
fn revalidate<O>(oracle: &O, sinks: &[ReachableSink]) -> Vec<ReachableSink>
where
    O: GridOracle + ?Sized,
{
    sinks
        .iter()
        .filter_map(|sink| {
            let live = oracle.capability_at(sink.coord, Some(sink.side))?;
            live.can_receive.then_some(ReachableSink {
                tier: live.tier,
                ..*sink
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::Consumer;
    use crate::sim::world::GridWorld;

    fn cfg(max_network_size: usize, cache_expiry_ticks: u64) -> NetworkConfig {
        NetworkConfig {
            max_network_size,
            cache_expiry_ticks,
        }
    }

    /// Source at the origin, cables along +x, consumer at the end.
    fn line_world(len: i32) -> GridWorld {
        let mut world = GridWorld::new();
        for x in 1..=len {
            world.place_cable(Coord::new(x, 0, 0));
        }
        world.place_device(Coord::new(len + 1, 0, 0), Consumer::new(Tier::T1, 100, 32, 0));
        world
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let world = line_world(3);
        let mut cache = NetworkCache::new(&cfg(64, 10));
        let origin = Coord::new(0, 0, 0);

        let first = cache.get_reachable(&world, origin, DirectionSet::ALL);
        let second = cache.get_reachable(&world, origin, DirectionSet::ALL);

        assert_eq!(first, second);
        assert_eq!(cache.stats().scans, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn expiry_is_inclusive() {
        let mut world = line_world(3);
        let mut cache = NetworkCache::new(&cfg(64, 5));
        let origin = Coord::new(0, 0, 0);

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        world.advance_ticks(5);
        cache.get_reachable(&world, origin, DirectionSet::ALL);
        assert_eq!(cache.stats().scans, 1);

        world.advance_ticks(1);
        cache.get_reachable(&world, origin, DirectionSet::ALL);
        assert_eq!(cache.stats().scans, 2);
        assert_eq!(cache.stats().expired, 1);
    }

    #[test]
    fn vanished_sink_is_filtered_without_rescan() {
        let mut world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        assert_eq!(cache.get_reachable(&world, origin, DirectionSet::ALL).len(), 1);
        world.remove(Coord::new(3, 0, 0));
        assert!(cache.get_reachable(&world, origin, DirectionSet::ALL).is_empty());
        assert_eq!(cache.stats().scans, 1);
    }

    #[test]
    fn invalidating_a_conductor_drops_the_record() {
        let world = line_world(4);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        assert_eq!(cache.invalidate_at(Coord::new(3, 0, 0)), 1);
        assert!(!cache.contains(origin));
        assert_eq!(cache.stats().invalidated, 1);
    }

    #[test]
    fn invalidating_a_sink_or_neighbor_drops_the_record() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        cache.invalidate_at(Coord::new(3, 0, 0));
        assert!(cache.is_empty());

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        // Never visited by the scan, but adjacent to the source.
        cache.invalidate_at(Coord::new(0, 1, 0));
        assert!(cache.is_empty());
    }

    #[test]
    fn unrelated_invalidation_keeps_the_record() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        assert_eq!(cache.invalidate_at(Coord::new(40, 40, 40)), 0);
        assert!(cache.contains(origin));
    }

    #[test]
    fn invalidate_radius_uses_squared_distance() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let a = Coord::new(0, 0, 0);
        let b = Coord::new(10, 0, 0);

        cache.get_reachable(&world, a, DirectionSet::ALL);
        cache.get_reachable(&world, b, DirectionSet::ALL);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.invalidate_radius(Coord::new(3, 4, 0), 5), 1);
        assert!(!cache.contains(a));
        assert!(cache.contains(b));
    }

    #[test]
    fn direction_change_forces_rescan() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        assert_eq!(cache.get_reachable(&world, origin, DirectionSet::ALL).len(), 1);
        let west = cache.get_reachable(&world, origin, DirectionSet::single(Direction::West));
        assert!(west.is_empty());
        assert_eq!(cache.stats().scans, 2);
    }

    #[test]
    fn empty_directions_skip_the_cache() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));

        assert!(cache
            .get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::EMPTY)
            .is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn truncated_scan_is_cached_and_flagged() {
        let world = line_world(100);
        let mut cache = NetworkCache::new(&cfg(16, 100));
        let origin = Coord::new(0, 0, 0);

        assert!(cache.get_reachable(&world, origin, DirectionSet::ALL).is_empty());
        let summary = cache.summary(origin);
        assert_eq!(summary.as_ref().map(|s| s.truncated), Some(true));
        assert_eq!(summary.as_ref().map(|s| s.visited), Some(16));
        assert_eq!(cache.stats().truncated_scans, 1);
    }

    #[test]
    fn index_is_cleaned_on_removal() {
        let world = line_world(3);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        let origin = Coord::new(0, 0, 0);

        cache.get_reachable(&world, origin, DirectionSet::ALL);
        cache.invalidate_at(origin);
        assert!(cache.index.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let world = line_world(2);
        let mut cache = NetworkCache::new(&cfg(64, 100));
        cache.get_reachable(&world, Coord::new(0, 0, 0), DirectionSet::ALL);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.index.is_empty());
    }
}
