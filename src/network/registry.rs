//! Per-world ownership of network caches.
//!
//! The host creates a cache when a world loads and drops it when the world
//! unloads. Nothing here is global: the registry is an ordinary value owned
//! by whoever drives the worlds.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::cache::{NetworkCache, ReachableSink};
use crate::config::NetworkConfig;
use crate::grid::{Coord, DirectionSet, GridOracle};

/// Opaque host identifier of a world (dimension, level, shard).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// One [`NetworkCache`] per loaded world.
#[derive(Debug)]
pub struct CacheRegistry {
    config: NetworkConfig,
    worlds: HashMap<WorldId, NetworkCache>,
}

impl CacheRegistry {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            worlds: HashMap::new(),
        }
    }

    /// World-load hook. Returns the (possibly pre-existing) cache.
    pub fn load_world(&mut self, world: WorldId) -> &mut NetworkCache {
        let config = &self.config;
        self.worlds.entry(world).or_insert_with(|| {
            debug!(%world, "network cache created");
            NetworkCache::new(config)
        })
    }

    /// World-unload hook: drops the world's cache entirely.
    pub fn unload_world(&mut self, world: WorldId) -> bool {
        let removed = self.worlds.remove(&world).is_some();
        if removed {
            debug!(%world, "network cache dropped");
        }
        removed
    }

    /// Drops every record of `world` but keeps its cache instance.
    pub fn clear_world(&mut self, world: WorldId) {
        if let Some(cache) = self.worlds.get_mut(&world) {
            cache.clear();
        }
    }

    pub fn cache(&self, world: WorldId) -> Option<&NetworkCache> {
        self.worlds.get(&world)
    }

    pub fn is_loaded(&self, world: WorldId) -> bool {
        self.worlds.contains_key(&world)
    }

    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// [`NetworkCache::get_reachable`] on `world`, creating its cache on
    /// first use.
    pub fn get_reachable<O>(
        &mut self,
        world: WorldId,
        oracle: &O,
        source: Coord,
        directions: DirectionSet,
    ) -> Vec<ReachableSink>
    where
        O: GridOracle + ?Sized,
    {
        self.load_world(world)
            .get_reachable(oracle, source, directions)
    }

    /// [`NetworkCache::invalidate_at`] on `world`; no-op for unknown worlds.
    pub fn invalidate_at(&mut self, world: WorldId, coord: Coord) -> usize {
        self.worlds
            .get_mut(&world)
            .map_or(0, |cache| cache.invalidate_at(coord))
    }

    /// [`NetworkCache::invalidate_radius`] on `world`; no-op for unknown worlds.
    pub fn invalidate_radius(&mut self, world: WorldId, center: Coord, radius: i32) -> usize {
        self.worlds
            .get_mut(&world)
            .map_or(0, |cache| cache.invalidate_radius(center, radius))
    }
}
