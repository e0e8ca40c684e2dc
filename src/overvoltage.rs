//! Placement-time overvoltage evaluation and its consequences.
//!
//! Evaluation only queries the world and produces [`Verdict`]s. Applying a
//! verdict is the single effectful step and goes through [`WorldActions`].
//!
//! # Consequences
//!
//! | gap | consequence |
//! |-----|-------------|
//! | ≤0  | none |
//! | 1   | fire in every empty neighbour cell, node survives |
//! | 2   | area destruction at `explosion_radius` |
//! | ≥3  | destruction at 1.5× radius plus shock damage to nearby entities |

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::OvervoltageConfig;
use crate::grid::{
    Capability, Coord, Direction, DirectionSet, GridOracle, NodeClass, WorldActions,
};
use crate::network::scan::bounded_scan;
use crate::voltage::{Tier, gap};

/// Radius of the entity shock for gaps of 3 or more.
pub const SHOCK_RADIUS: f32 = 4.0;
/// Damage dealt by the shock; lethal for an unarmoured player.
pub const SHOCK_DAMAGE: f32 = 40.0;
/// Burning status applied together with the shock.
pub const SHOCK_BURN_SECONDS: u32 = 8;
/// Explosion radius multiplier for gaps of 3 or more.
const SEVERE_RADIUS_SCALE: f32 = 1.5;

/// Outcome class of an overvoltage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Consequence {
    None,
    Ignite,
    Destroy,
    DestroyAndShock,
}

/// Maps a tier gap to its consequence.
pub fn consequence(gap: i32) -> Consequence {
    match gap {
        i32::MIN..=0 => Consequence::None,
        1 => Consequence::Ignite,
        2 => Consequence::Destroy,
        _ => Consequence::DestroyAndShock,
    }
}

/// A consequence due at a specific node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub target: Coord,
    pub gap: i32,
    pub consequence: Consequence,
}

/// Applies `kind` at `target`. Returns `false` for [`Consequence::None`].
pub fn apply_consequence<W>(
    world: &mut W,
    config: &OvervoltageConfig,
    target: Coord,
    kind: Consequence,
) -> bool
where
    W: GridOracle + WorldActions + ?Sized,
{
    match kind {
        Consequence::None => return false,
        Consequence::Ignite => {
            let empty: Vec<Coord> = target
                .neighbors()
                .into_iter()
                .filter(|c| world.is_empty(*c))
                .collect();
            for cell in empty {
                world.apply_ignite(cell);
            }
        }
        Consequence::Destroy => {
            world.apply_area_destruction(target, config.explosion_radius);
        }
        Consequence::DestroyAndShock => {
            world.apply_area_destruction(target, config.explosion_radius * SEVERE_RADIUS_SCALE);
            world.apply_entity_damage(target, SHOCK_RADIUS, SHOCK_DAMAGE, SHOCK_BURN_SECONDS);
        }
    }
    info!(%target, ?kind, "overvoltage consequence applied");
    true
}

/// Runs the placement-time safety check.
#[derive(Clone, Debug)]
pub struct OvervoltageEvaluator {
    config: OvervoltageConfig,
}

impl OvervoltageEvaluator {
    pub fn new(config: OvervoltageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OvervoltageConfig {
        &self.config
    }

    /// Evaluates the network around `placed` and applies every verdict.
    ///
    /// Returns whether any consequence was applied. Always `false` when the
    /// overvoltage model is disabled.
    pub fn check_on_placement<W>(&self, world: &mut W, placed: Coord) -> bool
    where
        W: GridOracle + WorldActions + ?Sized,
    {
        if !self.config.enabled {
            return false;
        }
        let verdicts = self.evaluate(&*world, placed);
        let mut applied = false;
        for v in verdicts {
            applied |= apply_consequence(world, &self.config, v.target, v.consequence);
        }
        applied
    }

    /// Computes the verdicts for a placement at `placed` without touching
    /// the world. Each target appears at most once, with its worst gap.
    pub fn evaluate<O>(&self, oracle: &O, placed: Coord) -> Vec<Verdict>
    where
        O: GridOracle + ?Sized,
    {
        match oracle.capability_at(placed, None) {
            Some(cap) if cap.bridge => self.evaluate_bridge(oracle, placed),
            own => self.evaluate_network(oracle, placed, own),
        }
    }

    /// Each face of a bridge is paired against the sinks behind it alone.
    fn evaluate_bridge<O>(&self, oracle: &O, placed: Coord) -> Vec<Verdict>
    where
        O: GridOracle + ?Sized,
    {
        let mut worst = WorstGaps::default();
        for face in Direction::ALL {
            let Some(face_tier) = oracle.capability_at(placed, Some(face)).and_then(|c| c.tier)
            else {
                continue;
            };
            let out = bounded_scan(
                oracle,
                placed,
                DirectionSet::single(face),
                self.config.max_scan_size,
                |c| c.can_receive && !c.bridge && c.tier.is_some(),
            );
            for node in &out.nodes {
                if let Some(sink_tier) = node.capability.tier {
                    worst.record(node.coord, gap(face_tier, sink_tier));
                }
            }
        }
        debug!(%placed, "bridge placement evaluated per face");
        worst.into_verdicts()
    }

    /// Pairs every source against every consumer of the placed network.
    fn evaluate_network<O>(
        &self,
        oracle: &O,
        placed: Coord,
        own: Option<Capability>,
    ) -> Vec<Verdict>
    where
        O: GridOracle + ?Sized,
    {
        let out = bounded_scan(
            oracle,
            placed,
            DirectionSet::ALL,
            self.config.max_scan_size,
            pairable,
        );

        let mut sources: Vec<Tier> = Vec::new();
        let mut consumers: Vec<(Coord, Tier)> = Vec::new();
        let own = own.filter(pairable).map(|c| (placed, c));
        let found = out.nodes.iter().map(|n| (n.coord, n.capability));
        for (coord, cap) in own.into_iter().chain(found) {
            let (Some(class), Some(tier)) = (cap.class(), cap.tier) else {
                continue;
            };
            if class.is_source() {
                sources.push(tier);
            }
            if class.is_consumer() {
                consumers.push((coord, tier));
            }
        }

        let mut worst = WorstGaps::default();
        for (coord, consumer_tier) in &consumers {
            for source_tier in &sources {
                worst.record(*coord, gap(*source_tier, *consumer_tier));
            }
        }
        debug!(
            %placed,
            sources = sources.len(),
            consumers = consumers.len(),
            truncated = out.truncated,
            "placement network evaluated"
        );
        worst.into_verdicts()
    }
}

/// Tiered, non-bridge nodes that take part in source/consumer pairing.
fn pairable(c: &Capability) -> bool {
    c.tier.is_some() && !matches!(c.class(), None | Some(NodeClass::Bridge))
}

/// Worst positive gap per target, in first-seen order.
#[derive(Default)]
struct WorstGaps {
    order: Vec<Coord>,
    gaps: HashMap<Coord, i32>,
}

impl WorstGaps {
    fn record(&mut self, target: Coord, gap: i32) {
        if gap <= 0 {
            return;
        }
        match self.gaps.get_mut(&target) {
            Some(g) => *g = (*g).max(gap),
            None => {
                self.order.push(target);
                self.gaps.insert(target, gap);
            }
        }
    }

    fn into_verdicts(self) -> Vec<Verdict> {
        self.order
            .into_iter()
            .map(|target| {
                let gap = self.gaps.get(&target).copied().unwrap_or_default();
                Verdict {
                    target,
                    gap,
                    consequence: consequence(gap),
                }
            })
            .collect()
    }
}
