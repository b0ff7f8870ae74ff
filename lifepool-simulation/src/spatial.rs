//! Neighbor queries over the agent arena.
//!
//! Agents never hold references to each other; every lookup goes through a
//! [`WorldView`], which resolves handles against the arena and reports
//! missing or dead agents as absent.

use std::collections::HashMap;

use glam::Vec2;
use lifepool_config::{Config, ScanPolicy};
use lifepool_core::{Arena, Entity};
use smallvec::SmallVec;

use crate::agent::Agent;

/// Candidate handles returned by a neighbor query
pub type Candidates = SmallVec<[Entity; 32]>;

// --- Spatial Partitioning ---

/// Uniform grid of agent handles, rebuilt every tick
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), SmallVec<[Entity; 8]>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        SpatialGrid {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Refill the grid with every live agent
    pub fn rebuild(&mut self, agents: &Arena<Agent>) {
        self.cells.clear();
        for (entity, agent) in agents.iter() {
            if agent.is_alive() {
                self.insert(entity, agent.position);
            }
        }
    }

    pub fn insert(&mut self, entity: Entity, position: Vec2) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(entity);
    }

    /// Handles in every cell that could hold a point within `radius` of `center`
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Candidates {
        let mut result = Candidates::new();
        let reach = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_of(center);

        for x in cx - reach..=cx + reach {
            for y in cy - reach..=cy + reach {
                if let Some(entities) = self.cells.get(&(x, y)) {
                    result.extend(entities.iter().copied());
                }
            }
        }
        result
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Strategy used to produce neighbor candidates
#[derive(Debug, Clone)]
pub enum NeighborIndex {
    /// The first `limit` live agents in storage order, regardless of distance
    Bounded { limit: usize },
    Grid(SpatialGrid),
}

impl NeighborIndex {
    pub fn from_policy(policy: ScanPolicy) -> Self {
        match policy {
            ScanPolicy::Bounded { limit } => NeighborIndex::Bounded { limit },
            ScanPolicy::Grid { cell_size } => NeighborIndex::Grid(SpatialGrid::new(cell_size)),
        }
    }

    pub fn rebuild(&mut self, agents: &Arena<Agent>) {
        if let NeighborIndex::Grid(grid) = self {
            grid.rebuild(agents);
        }
    }

    /// Make an agent spawned mid-tick visible to later queries in the same tick
    pub fn note_spawn(&mut self, entity: Entity, position: Vec2) {
        if let NeighborIndex::Grid(grid) = self {
            grid.insert(entity, position);
        }
    }

    pub fn clear(&mut self) {
        if let NeighborIndex::Grid(grid) = self {
            grid.clear();
        }
    }

    /// Candidate handles near `center`, never including `exclude`.
    /// Callers still filter by distance and liveness.
    pub fn candidates(
        &self,
        agents: &Arena<Agent>,
        center: Vec2,
        radius: f32,
        exclude: Entity,
    ) -> Candidates {
        match self {
            NeighborIndex::Bounded { limit } => agents
                .iter()
                .filter(|(entity, agent)| *entity != exclude && agent.is_alive())
                .take(*limit)
                .map(|(entity, _)| entity)
                .collect(),
            NeighborIndex::Grid(grid) => grid
                .query_radius(center, radius)
                .into_iter()
                .filter(|entity| *entity != exclude)
                .collect(),
        }
    }
}

/// A live agent found by a neighbor query
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub id: Entity,
    pub agent: &'a Agent,
    /// Vector from the querying agent to this one
    pub offset: Vec2,
    pub distance: f32,
}

/// Read-only view of the world handed to an agent during its update.
///
/// The agent being updated is not in the arena while it holds the view, so
/// it never shows up among its own neighbors.
pub struct WorldView<'a> {
    agents: &'a Arena<Agent>,
    index: &'a NeighborIndex,
    config: &'a Config,
    bounds: Vec2,
}

impl<'a> WorldView<'a> {
    pub fn new(
        agents: &'a Arena<Agent>,
        index: &'a NeighborIndex,
        config: &'a Config,
        bounds: Vec2,
    ) -> Self {
        Self {
            agents,
            index,
            config,
            bounds,
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Width and height of the arena
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Resolve a handle to a live agent
    pub fn agent(&self, id: Entity) -> Option<&'a Agent> {
        self.agents.get(id).filter(|agent| agent.is_alive())
    }

    /// Live agents within `radius` of `me`
    pub fn neighbors(&self, me: &Agent, radius: f32) -> SmallVec<[Neighbor<'a>; 16]> {
        let agents = self.agents;
        self.index
            .candidates(agents, me.position, radius, me.id)
            .into_iter()
            .filter_map(|id| {
                let agent = agents.get(id).filter(|agent| agent.is_alive())?;
                let offset = agent.position - me.position;
                let distance = offset.length();
                (distance <= radius).then_some(Neighbor {
                    id,
                    agent,
                    offset,
                    distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, Kind};
    use crate::dna::Dna;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn populate(positions: &[Vec2]) -> Arena<Agent> {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut arena = Arena::new();
        for &position in positions {
            let dna = Dna::random(&mut rng);
            arena.insert_with(|id| Agent::new(id, Kind::Normal, position, Vec2::X, dna, 100.0));
        }
        arena
    }

    #[test]
    fn grid_only_returns_nearby_cells() {
        let arena = populate(&[Vec2::new(10.0, 10.0), Vec2::new(15.0, 12.0), Vec2::new(900.0, 500.0)]);
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&arena);

        let found = grid.query_radius(Vec2::new(12.0, 12.0), 20.0);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn bounded_scan_caps_candidates() {
        let positions: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32, 0.0)).collect();
        let arena = populate(&positions);
        let ids = arena.entities();
        let index = NeighborIndex::Bounded { limit: 4 };

        let found = index.candidates(&arena, Vec2::ZERO, 1.0, ids[0]);
        assert_eq!(found.len(), 4);
        assert!(!found.contains(&ids[0]));
    }

    #[test]
    fn view_filters_by_radius_and_hides_the_querying_agent() {
        let mut arena = populate(&[Vec2::ZERO, Vec2::new(30.0, 0.0), Vec2::new(80.0, 0.0)]);
        let ids = arena.entities();
        let me = arena.take(ids[0]).unwrap();
        let config = Config::default();
        let index = NeighborIndex::from_policy(ScanPolicy::Bounded { limit: 60 });
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let near = view.neighbors(&me, 50.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id, ids[1]);
        assert!((near[0].distance - 30.0).abs() < 1e-4);
        assert!(view.agent(ids[0]).is_none());
    }
}
