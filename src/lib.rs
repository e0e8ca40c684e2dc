//! Tiered voltage power grid for a voxel world.
//!
//! The core is the network topology cache ([`network`]), the voltage model
//! ([`voltage`]), the overvoltage safety model ([`overvoltage`]) and the
//! fair-share distributor ([`distribute`]). It talks to the host world only
//! through the traits in [`grid`]. [`sim`] provides an in-memory world and
//! an engine to drive it.

pub mod config;
pub mod devices;
pub mod distribute;
pub mod grid;
/// Telemetry export.
pub mod io;
/// Network topology cache and bounded scans.
pub mod network;
pub mod overvoltage;
/// Simulation engine, in-memory world and layouts.
pub mod sim;
pub mod voltage;
