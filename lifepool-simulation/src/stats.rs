//! Counters reported by the world.

use serde::{Deserialize, Serialize};

/// Cumulative event counts since the last clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    pub eat_events: u64,
    pub combat_events: u64,
    pub escape_events: u64,
}

/// Point-in-time statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub frame: u64,
    pub agents: usize,
    pub predators: usize,
    pub energy_points: usize,
    pub fps: u32,
    pub events: EventCounters,
}

/// Births and deaths during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub births: usize,
    pub deaths: usize,
}
