//! Serializable per-frame view of the world.

use lifepool_simulation::{Agent, DisplayList, EnergyPoint, Kind, Mode, World, WorldStats};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Agent state for serialization
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentState {
    pub id: u32,
    pub generation: u32,
    pub kind: Kind,
    pub mode: Mode,
    pub x: f32,
    pub y: f32,
    pub heading_x: f32,
    pub heading_y: f32,
    pub size: f32,
    pub energy: f32,
    pub hue: f32,
}

impl From<&Agent> for AgentState {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.index(),
            generation: agent.id.generation(),
            kind: agent.kind,
            mode: agent.mode,
            x: agent.position.x,
            y: agent.position.y,
            heading_x: agent.velocity.x,
            heading_y: agent.velocity.y,
            size: agent.dna.size,
            energy: agent.energy,
            hue: agent.dna.hue,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnergyPointState {
    pub x: f32,
    pub y: f32,
    pub energy: f32,
}

impl From<&EnergyPoint> for EnergyPointState {
    fn from(point: &EnergyPoint) -> Self {
        Self {
            x: point.position.x,
            y: point.position.y,
            energy: point.energy,
        }
    }
}

/// Complete simulation state for serialization
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Seconds since the run started
    pub timestamp: f64,
    pub stats: WorldStats,
    pub agents: Vec<AgentState>,
    pub energy_points: Vec<EnergyPointState>,
    /// Recorded draw calls, when requested
    pub scene: Option<DisplayList>,
}

impl FrameSnapshot {
    /// Capture the current world state.
    ///
    /// Populations of at least `parallel_threshold` agents are converted on
    /// the rayon pool.
    pub fn capture(world: &World, timestamp: f64, parallel_threshold: usize, include_scene: bool) -> Self {
        let agents: Vec<&Agent> = world.agents().values().collect();
        let agents: Vec<AgentState> = if agents.len() >= parallel_threshold {
            agents.par_iter().map(|agent| AgentState::from(*agent)).collect()
        } else {
            agents.iter().map(|agent| AgentState::from(*agent)).collect()
        };

        let scene = include_scene.then(|| {
            let mut list = DisplayList::new();
            world.draw(&mut list);
            list
        });

        Self {
            frame: world.frame(),
            timestamp,
            stats: world.stats(),
            agents,
            energy_points: world.energy_points().iter().map(EnergyPointState::from).collect(),
            scene,
        }
    }
}
