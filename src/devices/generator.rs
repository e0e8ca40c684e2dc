use crate::devices::types::{Device, DeviceContext};
use crate::grid::{Capability, Direction};
use crate::voltage::Tier;

/// A generator that produces a fixed amount of energy every tick into an
/// internal buffer.
///
/// Generators only extract; offering them energy does nothing. A generator
/// without a tier emits packets the network treats as harmless.
#[derive(Debug, Clone)]
pub struct Generator {
    /// Voltage tier of emitted packets, `None` for untiered generators.
    pub tier: Option<Tier>,

    /// Energy produced per tick.
    pub generation: u64,

    /// Buffer size.
    pub capacity: u64,

    /// Per-tick output cap, on top of the tier ceiling.
    pub max_output: u64,

    stored: u64,
}

impl Generator {
    /// Creates a new tiered generator with an empty buffer.
    ///
    /// # Arguments
    ///
    /// * `tier` - Voltage tier of the emitted packets
    /// * `generation` - Energy produced per tick
    /// * `capacity` - Buffer size (must be > 0)
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(tier: Tier, generation: u64, capacity: u64) -> Self {
        assert!(capacity > 0, "generator capacity must be > 0");
        Self {
            tier: Some(tier),
            generation,
            capacity,
            max_output: u64::MAX,
            stored: 0,
        }
    }

    /// Creates a generator without a voltage tier.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn untiered(generation: u64, capacity: u64) -> Self {
        Self {
            tier: None,
            ..Self::new(Tier::T1, generation, capacity)
        }
    }

    /// Caps what the generator hands out per tick.
    pub fn with_max_output(mut self, max_output: u64) -> Self {
        self.max_output = max_output;
        self
    }

    /// Starts the generator with `stored` energy (clamped to capacity).
    pub fn with_stored(mut self, stored: u64) -> Self {
        self.stored = stored.min(self.capacity);
        self
    }
}

impl Device for Generator {
    fn capability(&self, _side: Option<Direction>) -> Option<Capability> {
        Some(Capability {
            can_extract: true,
            can_receive: false,
            tier: self.tier,
            bridge: false,
        })
    }

    fn receive(&mut self, _side: Direction, _amount: u64, _simulate: bool) -> u64 {
        0
    }

    fn extract(&mut self, amount: u64, simulate: bool) -> u64 {
        let taken = amount.min(self.stored);
        if !simulate {
            self.stored -= taken;
        }
        taken
    }

    fn max_output(&self) -> u64 {
        self.max_output.min(self.stored)
    }

    fn stored(&self) -> u64 {
        self.stored
    }

    fn on_tick(&mut self, _context: &DeviceContext) {
        self.stored = self.stored.saturating_add(self.generation).min(self.capacity);
    }

    fn device_type(&self) -> &'static str {
        "Generator"
    }
}
