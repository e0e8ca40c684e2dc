//! Contracts between the grid core and the host world.
//!
//! The core never owns world state. It reads the lattice through
//! [`GridOracle`], moves energy through [`EnergyAccess`], and hands every
//! destructive effect to [`WorldActions`].

use super::{Coord, Direction, DirectionSet};
use crate::voltage::Tier;

/// Energy capability of a cell as seen from one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capability {
    /// The cell can hand energy out.
    pub can_extract: bool,
    /// The cell can accept energy.
    pub can_receive: bool,
    /// Voltage tier on this face. `None` means the node is not tiered.
    pub tier: Option<Tier>,
    /// The cell is a multi-tier bridge (one tier per face).
    pub bridge: bool,
}

impl Capability {
    pub const fn source(tier: Tier) -> Self {
        Self {
            can_extract: true,
            can_receive: false,
            tier: Some(tier),
            bridge: false,
        }
    }

    pub const fn consumer(tier: Tier) -> Self {
        Self {
            can_extract: false,
            can_receive: true,
            tier: Some(tier),
            bridge: false,
        }
    }

    pub const fn bidirectional(tier: Tier) -> Self {
        Self {
            can_extract: true,
            can_receive: true,
            tier: Some(tier),
            bridge: false,
        }
    }

    /// A bridge face: both directions, tier of that face.
    pub const fn bridge_face(tier: Tier) -> Self {
        Self {
            can_extract: true,
            can_receive: true,
            tier: Some(tier),
            bridge: true,
        }
    }

    /// Classifies this capability, or `None` when it can neither extract
    /// nor receive.
    pub fn class(&self) -> Option<NodeClass> {
        if self.bridge {
            return Some(NodeClass::Bridge);
        }
        match (self.can_extract, self.can_receive) {
            (true, true) => Some(NodeClass::Bidirectional),
            (true, false) => Some(NodeClass::Source),
            (false, true) => Some(NodeClass::Consumer),
            (false, false) => None,
        }
    }
}

/// Role a tiered node plays in overvoltage pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Source,
    Consumer,
    /// Storage: counts as source and consumer at once.
    Bidirectional,
    /// Multi-tier node evaluated per face, never paired.
    Bridge,
}

impl NodeClass {
    pub fn is_source(self) -> bool {
        matches!(self, NodeClass::Source | NodeClass::Bidirectional)
    }

    pub fn is_consumer(self) -> bool {
        matches!(self, NodeClass::Consumer | NodeClass::Bidirectional)
    }
}

/// Read-only view of the lattice. Implementations must not cache.
pub trait GridOracle {
    /// Returns `true` when `coord` holds a pass-through conductor.
    fn is_conductor(&self, coord: Coord) -> bool;

    /// Directions a conductor at `coord` connects to. Empty for anything
    /// that is not a conductor.
    fn connected_directions(&self, coord: Coord) -> DirectionSet;

    /// Energy capability of the cell at `coord`, queried through `side`
    /// (the face of that cell being touched). `None` side asks for the
    /// cell's intrinsic capability.
    fn capability_at(&self, coord: Coord, side: Option<Direction>) -> Option<Capability>;

    /// Monotonic per-world tick counter.
    fn current_tick(&self) -> u64;

    /// Returns `true` when nothing occupies `coord`.
    fn is_empty(&self, coord: Coord) -> bool;
}

/// Committing and simulated energy transfer into a node.
pub trait EnergyAccess {
    /// Offers `amount` to the node at `coord` through `side` and returns
    /// how much it accepts. With `simulate` set nothing changes.
    fn receive(&mut self, coord: Coord, side: Direction, amount: u64, simulate: bool) -> u64;
}

/// Destructive world effects applied by overvoltage consequences.
pub trait WorldActions {
    /// Sets fire in the (empty) cell at `coord`.
    fn apply_ignite(&mut self, coord: Coord);

    /// Destroys everything within `radius` of `center`.
    fn apply_area_destruction(&mut self, center: Coord, radius: f32);

    /// Damages and sets burning every living entity within `radius`.
    fn apply_entity_damage(&mut self, center: Coord, radius: f32, amount: f32, burn_seconds: u32);
}

/// A world that can be queried, fed energy and damaged.
pub trait HostWorld: GridOracle + EnergyAccess + WorldActions {}

impl<T: GridOracle + EnergyAccess + WorldActions + ?Sized> HostWorld for T {}
