//! Per-tick record produced by the simulation engine.

/// Everything that happened during one engine tick.
///
/// Placements and removals made between two steps are booked on the
/// following tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    /// World tick this record describes.
    pub tick: u64,
    /// Extracting devices that distributed this tick.
    pub sources: usize,
    /// Non-zero transfers made.
    pub transfers: usize,
    /// Energy moved from sources to sinks.
    pub energy_moved: u64,
    /// Sinks that were hit by an overvoltage during flow.
    pub overvolted_sinks: usize,
    /// Placement checks executed (immediate and delayed).
    pub placement_checks: usize,
    /// Placement checks that applied at least one consequence.
    pub placement_incidents: usize,
    /// Cells removed by area destruction.
    pub cells_destroyed: usize,
    /// Cache records dropped by invalidation.
    pub invalidated: usize,
    /// Cache lookups answered from a valid record.
    pub cache_hits: u64,
    /// Cache lookups that needed a scan.
    pub cache_misses: u64,
    /// Scans that ran out of cell budget.
    pub truncated_scans: u64,
}

impl TickResult {
    /// Total overvoltage incidents, at placement and during flow.
    pub fn incidents(&self) -> usize {
        self.placement_incidents + self.overvolted_sinks
    }
}
