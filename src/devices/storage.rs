use crate::devices::types::{Device, DeviceContext};
use crate::grid::{Capability, Direction};
use crate::voltage::Tier;

/// An energy storage block that charges and discharges through any face.
///
/// `Storage` tracks its charge and enforces separate per-tick charge and
/// discharge limits. It is both a source and a consumer at its tier.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Voltage tier on every face.
    pub tier: Tier,

    /// Storage capacity.
    pub capacity: u64,

    /// Maximum energy accepted per tick.
    pub max_charge: u64,

    /// Maximum energy handed out per tick.
    pub max_discharge: u64,

    stored: u64,
    charged_this_tick: u64,
    discharged_this_tick: u64,
}

impl Storage {
    /// Creates a new storage block with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `tier` - Voltage tier of the block
    /// * `capacity` - Storage capacity (must be > 0)
    /// * `stored` - Initial charge (must be <= capacity)
    /// * `max_charge` - Per-tick charge limit
    /// * `max_discharge` - Per-tick discharge limit
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or the initial charge exceeds it.
    pub fn new(tier: Tier, capacity: u64, stored: u64, max_charge: u64, max_discharge: u64) -> Self {
        assert!(capacity > 0, "storage capacity must be > 0");
        assert!(stored <= capacity, "initial charge exceeds capacity");

        Self {
            tier,
            capacity,
            max_charge,
            max_discharge,
            stored,
            charged_this_tick: 0,
            discharged_this_tick: 0,
        }
    }

    /// State of charge as a fraction (0.0 to 1.0).
    pub fn soc(&self) -> f32 {
        self.stored as f32 / self.capacity as f32
    }
}

impl Device for Storage {
    fn capability(&self, _side: Option<Direction>) -> Option<Capability> {
        Some(Capability::bidirectional(self.tier))
    }

    fn receive(&mut self, _side: Direction, amount: u64, simulate: bool) -> u64 {
        let space = self.capacity - self.stored;
        let rate = self.max_charge.saturating_sub(self.charged_this_tick);
        let accepted = amount.min(space).min(rate);
        if !simulate {
            self.stored += accepted;
            self.charged_this_tick += accepted;
        }
        accepted
    }

    fn extract(&mut self, amount: u64, simulate: bool) -> u64 {
        let taken = amount.min(self.max_output());
        if !simulate {
            self.stored -= taken;
            self.discharged_this_tick += taken;
        }
        taken
    }

    fn max_output(&self) -> u64 {
        self.max_discharge
            .saturating_sub(self.discharged_this_tick)
            .min(self.stored)
    }

    fn stored(&self) -> u64 {
        self.stored
    }

    fn on_tick(&mut self, _context: &DeviceContext) {
        self.charged_this_tick = 0;
        self.discharged_this_tick = 0;
    }

    fn device_type(&self) -> &'static str {
        "Storage"
    }
}
