//! Fair-share energy distribution from one source per call.

use tracing::trace;

use crate::config::OvervoltageConfig;
use crate::grid::{Coord, HostWorld};
use crate::network::ReachableSink;
use crate::overvoltage::{apply_consequence, consequence};
use crate::voltage::{Tier, TierTable, gap};

/// What a source offers in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistributionRequest {
    /// Energy the source currently holds.
    pub available: u64,
    /// Most energy the source may hand out this tick.
    pub packet_limit: u64,
    /// Voltage of the packets the source emits.
    pub packet_size: u64,
    /// Tier of the source; derived from `packet_size` when absent.
    pub source_tier: Option<Tier>,
}

/// Energy delivered to one sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub sink: Coord,
    pub amount: u64,
}

/// Result of one distribution call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Non-zero transfers in sink order.
    pub transfers: Vec<Transfer>,
    /// Sum of `transfers`.
    pub total: u64,
    /// Source energy left after the call (`available - total`).
    pub remaining: u64,
    /// Sinks that had demand.
    pub demanding: usize,
    /// Sinks hit by an overvoltage consequence instead of receiving.
    pub overvolted: Vec<Coord>,
}

/// Splits a source's energy evenly between its hungry sinks.
#[derive(Clone, Debug)]
pub struct Distributor {
    tiers: TierTable,
    overvoltage: OvervoltageConfig,
}

impl Distributor {
    pub fn new(tiers: TierTable, overvoltage: OvervoltageConfig) -> Self {
        Self { tiers, overvoltage }
    }

    /// Delivers up to `min(available, packet_limit)` across `sinks`.
    ///
    /// Every sink with simulated demand gets an equal share (at least 1 while
    /// energy remains), in `sinks` order. A sink whose tier cannot take
    /// `packet_size` suffers the overvoltage consequence and receives nothing.
    /// The caller is responsible for removing `total` from the source.
    pub fn distribute<W>(
        &self,
        world: &mut W,
        request: &DistributionRequest,
        sinks: &[ReachableSink],
    ) -> DistributionReport
    where
        W: HostWorld + ?Sized,
    {
        let budget = request.available.min(request.packet_limit);
        let mut report = DistributionReport {
            remaining: request.available,
            ..DistributionReport::default()
        };
        if budget == 0 {
            return report;
        }

        let demanding: Vec<&ReachableSink> = sinks
            .iter()
            .filter(|s| world.receive(s.coord, s.side, u64::MAX, true) > 0)
            .collect();
        report.demanding = demanding.len();
        if demanding.is_empty() {
            return report;
        }

        let share = (budget / demanding.len() as u64).max(1);
        let source_tier = request
            .source_tier
            .unwrap_or_else(|| self.tiers.tier_for_packet(request.packet_size));
        let mut left = budget;

        for sink in demanding {
            if let Some(sink_tier) = sink.tier {
                let compatible = self.tiers.can_receive(sink_tier, request.packet_size);
                if self.overvoltage.enabled && !compatible {
                    let kind = consequence(gap(source_tier, sink_tier).max(1));
                    apply_consequence(world, &self.overvoltage, sink.coord, kind);
                    report.overvolted.push(sink.coord);
                    continue;
                }
            }
            if left == 0 {
                continue;
            }

            let offer = share.min(left);
            let accepted = world.receive(sink.coord, sink.side, offer, false).min(offer);
            if accepted > 0 {
                left -= accepted;
                report.transfers.push(Transfer {
                    sink: sink.coord,
                    amount: accepted,
                });
            }
        }

        report.total = budget - left;
        report.remaining = request.available - report.total;
        trace!(
            total = report.total,
            share,
            demanding = report.demanding,
            "distributed energy"
        );
        report
    }
}
