//! Grid machines that occupy lattice cells.

/// Energy consumer with an input buffer.
pub mod consumer;
/// Fixed-rate energy generator.
pub mod generator;
/// Charge/discharge storage block.
pub mod storage;
/// Multi-tier bridge.
pub mod transformer;
pub mod types;

use crate::grid::{Capability, Direction};

// Re-export the main types for convenience
pub use consumer::Consumer;
pub use generator::Generator;
pub use storage::Storage;
pub use transformer::Transformer;
pub use types::Device;
pub use types::DeviceContext;

/// Any machine the in-memory world can hold.
#[derive(Debug, Clone)]
pub enum Machine {
    Generator(Generator),
    Consumer(Consumer),
    Storage(Storage),
    Transformer(Transformer),
}

impl Machine {
    fn as_device(&self) -> &dyn Device {
        match self {
            Machine::Generator(d) => d,
            Machine::Consumer(d) => d,
            Machine::Storage(d) => d,
            Machine::Transformer(d) => d,
        }
    }

    fn as_device_mut(&mut self) -> &mut dyn Device {
        match self {
            Machine::Generator(d) => d,
            Machine::Consumer(d) => d,
            Machine::Storage(d) => d,
            Machine::Transformer(d) => d,
        }
    }
}

impl Device for Machine {
    fn capability(&self, side: Option<Direction>) -> Option<Capability> {
        self.as_device().capability(side)
    }

    fn receive(&mut self, side: Direction, amount: u64, simulate: bool) -> u64 {
        self.as_device_mut().receive(side, amount, simulate)
    }

    fn extract(&mut self, amount: u64, simulate: bool) -> u64 {
        self.as_device_mut().extract(amount, simulate)
    }

    fn max_output(&self) -> u64 {
        self.as_device().max_output()
    }

    fn stored(&self) -> u64 {
        self.as_device().stored()
    }

    fn on_tick(&mut self, context: &DeviceContext) {
        self.as_device_mut().on_tick(context)
    }

    fn device_type(&self) -> &'static str {
        self.as_device().device_type()
    }
}

impl From<Generator> for Machine {
    fn from(d: Generator) -> Self {
        Machine::Generator(d)
    }
}

impl From<Consumer> for Machine {
    fn from(d: Consumer) -> Self {
        Machine::Consumer(d)
    }
}

impl From<Storage> for Machine {
    fn from(d: Storage) -> Self {
        Machine::Storage(d)
    }
}

impl From<Transformer> for Machine {
    fn from(d: Transformer) -> Self {
        Machine::Transformer(d)
    }
}
