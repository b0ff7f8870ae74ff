//! Building blocks shared by the LifePool crates: generation-checked handles,
//! the arena that owns simulated agents, and frame timing.

pub mod arena;
pub mod clock;
pub mod entity;

pub use arena::Arena;
pub use clock::{FpsMeter, FrameClock};
pub use entity::{Entity, EntityAllocator};
