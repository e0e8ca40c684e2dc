use crate::devices::types::{Device, DeviceContext};
use crate::grid::{Capability, Direction};
use crate::voltage::Tier;

/// A machine that buffers incoming energy and burns a fixed amount of it
/// every tick.
///
/// Input is limited per tick by `max_input` and overall by the free buffer
/// space, so a full consumer reports no demand.
#[derive(Debug, Clone)]
pub struct Consumer {
    /// Highest voltage tier the machine tolerates, `None` for untiered.
    pub tier: Option<Tier>,

    /// Buffer size.
    pub capacity: u64,

    /// Most energy accepted per tick.
    pub max_input: u64,

    /// Energy burned per tick.
    pub consumption: u64,

    stored: u64,
    received_this_tick: u64,
}

impl Consumer {
    /// Creates a new tiered consumer with an empty buffer.
    ///
    /// # Arguments
    ///
    /// * `tier` - Highest tier the machine tolerates
    /// * `capacity` - Buffer size (zero makes a machine that never wants energy)
    /// * `max_input` - Per-tick input cap
    /// * `consumption` - Energy burned per tick
    pub fn new(tier: Tier, capacity: u64, max_input: u64, consumption: u64) -> Self {
        Self {
            tier: Some(tier),
            capacity,
            max_input,
            consumption,
            stored: 0,
            received_this_tick: 0,
        }
    }

    /// Creates a consumer outside the tier model.
    pub fn untiered(capacity: u64, max_input: u64, consumption: u64) -> Self {
        Self {
            tier: None,
            ..Self::new(Tier::T1, capacity, max_input, consumption)
        }
    }

    fn headroom(&self) -> u64 {
        let space = self.capacity.saturating_sub(self.stored);
        let rate = self.max_input.saturating_sub(self.received_this_tick);
        space.min(rate)
    }
}

impl Device for Consumer {
    fn capability(&self, _side: Option<Direction>) -> Option<Capability> {
        Some(Capability {
            can_extract: false,
            can_receive: true,
            tier: self.tier,
            bridge: false,
        })
    }

    fn receive(&mut self, _side: Direction, amount: u64, simulate: bool) -> u64 {
        let accepted = amount.min(self.headroom());
        if !simulate {
            self.stored += accepted;
            self.received_this_tick += accepted;
        }
        accepted
    }

    fn extract(&mut self, _amount: u64, _simulate: bool) -> u64 {
        0
    }

    fn max_output(&self) -> u64 {
        0
    }

    fn stored(&self) -> u64 {
        self.stored
    }

    fn on_tick(&mut self, _context: &DeviceContext) {
        self.stored = self.stored.saturating_sub(self.consumption);
        self.received_this_tick = 0;
    }

    fn device_type(&self) -> &'static str {
        "Consumer"
    }
}
