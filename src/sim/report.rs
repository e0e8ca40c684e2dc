//! Post-hoc run summary computed from per-tick records.

use std::fmt;

use super::types::TickResult;

/// Aggregate figures for a complete engine run.
///
/// Computed post-hoc from `Vec<TickResult>` so the summary always agrees
/// with the per-tick data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Number of ticks covered.
    pub ticks: usize,
    /// Total energy moved from sources to sinks.
    pub energy_moved: u64,
    /// Largest amount moved in a single tick.
    pub peak_tick_energy: u64,
    /// Placement checks that applied a consequence.
    pub placement_incidents: usize,
    /// Sinks overvolted during flow.
    pub flow_incidents: usize,
    /// Cells removed by overvoltage destruction.
    pub cells_destroyed: usize,
    /// Cache records dropped by invalidation.
    pub invalidated: usize,
    /// Share of cache lookups answered without a scan (0.0 to 1.0).
    pub cache_hit_rate: f32,
    /// Scans that hit the network size bound.
    pub truncated_scans: u64,
}

impl RunReport {
    /// Computes the summary from the complete tick record vector.
    pub fn from_results(results: &[TickResult]) -> Self {
        let mut report = Self {
            ticks: results.len(),
            ..Self::default()
        };
        let mut hits = 0_u64;
        let mut lookups = 0_u64;

        for r in results {
            report.energy_moved += r.energy_moved;
            report.peak_tick_energy = report.peak_tick_energy.max(r.energy_moved);
            report.placement_incidents += r.placement_incidents;
            report.flow_incidents += r.overvolted_sinks;
            report.cells_destroyed += r.cells_destroyed;
            report.invalidated += r.invalidated;
            report.truncated_scans += r.truncated_scans;
            hits += r.cache_hits;
            lookups += r.cache_hits + r.cache_misses;
        }

        if lookups > 0 {
            report.cache_hit_rate = hits as f32 / lookups as f32;
        }
        report
    }

    /// Mean energy moved per tick.
    pub fn mean_tick_energy(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.energy_moved as f64 / self.ticks as f64
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Grid Run Report ---")?;
        writeln!(f, "Ticks:                 {}", self.ticks)?;
        writeln!(
            f,
            "Energy moved:          {} ({:.1}/tick, peak {})",
            self.energy_moved,
            self.mean_tick_energy(),
            self.peak_tick_energy
        )?;
        writeln!(
            f,
            "Overvoltage incidents: {} at placement, {} during flow",
            self.placement_incidents, self.flow_incidents
        )?;
        writeln!(f, "Cells destroyed:       {}", self.cells_destroyed)?;
        writeln!(f, "Cache hit rate:        {:.1}%", self.cache_hit_rate * 100.0)?;
        writeln!(f, "Records invalidated:   {}", self.invalidated)?;
        write!(f, "Truncated scans:       {}", self.truncated_scans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(energy_moved: u64, cache_hits: u64, cache_misses: u64) -> TickResult {
        TickResult {
            energy_moved,
            cache_hits,
            cache_misses,
            ..TickResult::default()
        }
    }

    #[test]
    fn totals_and_peak() {
        let results: Vec<TickResult> = [10, 40, 25]
            .iter()
            .map(|&e| make_result(e, 0, 0))
            .collect();
        let report = RunReport::from_results(&results);
        assert_eq!(report.ticks, 3);
        assert_eq!(report.energy_moved, 75);
        assert_eq!(report.peak_tick_energy, 40);
        assert!((report.mean_tick_energy() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn cache_hit_rate() {
        let results = vec![make_result(0, 0, 1), make_result(0, 3, 0)];
        let report = RunReport::from_results(&results);
        assert!((report.cache_hit_rate - 0.75).abs() < 1e-6);
    }

    #[test]
    fn incidents_are_split_by_origin() {
        let mut results = vec![TickResult::default(); 4];
        results[0].placement_incidents = 2;
        results[2].overvolted_sinks = 1;
        results[3].cells_destroyed = 7;
        let report = RunReport::from_results(&results);
        assert_eq!(report.placement_incidents, 2);
        assert_eq!(report.flow_incidents, 1);
        assert_eq!(report.cells_destroyed, 7);
    }

    #[test]
    fn empty_results() {
        let report = RunReport::from_results(&[]);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.mean_tick_energy(), 0.0);
    }

    #[test]
    fn display_mentions_every_section() {
        let text = RunReport::from_results(&[make_result(5, 1, 1)]).to_string();
        assert!(text.contains("Energy moved:          5"));
        assert!(text.contains("Cache hit rate:        50.0%"));
    }
}
