//! Tiered voltage model: tier ordering, packet ceilings and gap rules.

use std::fmt;

/// Voltage tier, ordered from lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    T1,
    T2,
    T3,
    T4,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 4] = [Tier::T1, Tier::T2, Tier::T3, Tier::T4];

    /// Numeric rank used for gap arithmetic (`T1` = 1).
    pub const fn rank(self) -> i32 {
        match self {
            Tier::T1 => 1,
            Tier::T2 => 2,
            Tier::T3 => 3,
            Tier::T4 => 4,
        }
    }

    /// Looks a tier up by rank.
    pub fn from_rank(rank: i32) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| t.rank() == rank)
    }

    const fn index(self) -> usize {
        (self.rank() - 1) as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.rank())
    }
}

/// Rank difference between a source and a consumer.
///
/// Positive means the source can emit more than the consumer absorbs.
pub fn gap(source: Tier, consumer: Tier) -> i32 {
    source.rank() - consumer.rank()
}

/// Returns `true` when `source` would overvolt `consumer`.
pub fn would_overvolt(source: Tier, consumer: Tier) -> bool {
    gap(source, consumer) > 0
}

/// Maximum packet size per tier.
///
/// Loaded once from configuration and read-only afterwards. Ceilings are
/// expected to be strictly increasing (see `GridConfig::validate`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierTable {
    max_packet: [u64; 4],
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            max_packet: [32, 128, 512, 2048],
        }
    }
}

impl TierTable {
    pub fn new(max_packet: [u64; 4]) -> Self {
        Self { max_packet }
    }

    /// Packet ceiling of `tier`.
    pub fn max_packet(&self, tier: Tier) -> u64 {
        self.max_packet[tier.index()]
    }

    /// Smallest tier whose ceiling fits `size`, saturating at the top tier.
    pub fn tier_for_packet(&self, size: u64) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|t| size <= self.max_packet(*t))
            .unwrap_or(Tier::T4)
    }

    /// Returns `true` when a node of `tier` can absorb a packet of `packet_size`.
    pub fn can_receive(&self, tier: Tier, packet_size: u64) -> bool {
        packet_size <= self.max_packet(tier)
    }
}
