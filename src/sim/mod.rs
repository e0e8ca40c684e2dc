/// Tick counter for engine runs.
pub mod clock;
pub mod engine;
/// Synthetic cable layouts.
pub mod layout;
pub mod report;
pub mod types;
/// In-memory host world.
pub mod world;
