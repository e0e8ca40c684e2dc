//! Network topology: bounded scans, the reachability cache and its
//! per-world registry.

pub mod cache;
pub mod registry;
pub mod scan;

pub use cache::{CacheStats, NetworkCache, NetworkSummary, ReachableSink};
pub use registry::{CacheRegistry, WorldId};
