//! Common types and traits for grid machines.

use crate::grid::{Capability, Direction};

/// Contextual information passed to devices once per tick.
///
/// # Fields
/// * `tick` - World tick being simulated
pub struct DeviceContext {
    pub tick: u64,
}

impl DeviceContext {
    /// Creates a new DeviceContext for the given tick.
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }
}

/// Trait defining a machine that sits in a lattice cell and takes part in
/// the energy network.
///
/// Energy amounts are whole units. A device decides on its own what it
/// accepts and what it hands out; the network only offers and asks.
pub trait Device {
    /// Returns what the device exposes on `side`, or its intrinsic
    /// capability when `side` is `None`.
    fn capability(&self, side: Option<Direction>) -> Option<Capability>;

    /// Offers `amount` through `side` and returns how much is accepted.
    ///
    /// # Arguments
    ///
    /// * `side` - Face of the device the energy arrives through
    /// * `amount` - Energy offered
    /// * `simulate` - When set, report the acceptance without changing state
    fn receive(&mut self, side: Direction, amount: u64, simulate: bool) -> u64;

    /// Removes up to `amount` of stored energy and returns what was taken.
    fn extract(&mut self, amount: u64, simulate: bool) -> u64;

    /// Most energy the device may still hand out this tick.
    fn max_output(&self) -> u64;

    /// Energy currently held.
    fn stored(&self) -> u64;

    /// Advances internal state by one tick.
    fn on_tick(&mut self, context: &DeviceContext);

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}
