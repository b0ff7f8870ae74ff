//! Microbe pool simulation: schooling agents, predators, fights, engulfment
//! and energy-driven reproduction in a wrapping 2D arena.
//!
//! [`World`] owns every agent and energy point and advances them one frame
//! per [`World::tick`]. Each agent sees the rest of the world through a
//! read-only [`WorldView`] while it picks a behavior and moves; the world then
//! resolves contacts, births and deaths.

pub mod agent;
pub mod behaviors;
pub mod commands;
pub mod dna;
pub mod energy_point;
pub mod render;
pub mod spatial;
pub mod stats;
pub mod world;

pub use agent::{Agent, Kind, Mode, Newborn, Relations, TickReport, Timers, DEATH_SIZE};
pub use commands::{CommandOutcome, CommandParseError, ShellCommand};
pub use dna::Dna;
pub use energy_point::EnergyPoint;
pub use render::{DisplayList, DrawCommand, Rgba, Surface};
pub use spatial::{NeighborIndex, SpatialGrid, WorldView};
pub use stats::{EventCounters, TickSummary, WorldStats};
pub use world::World;
