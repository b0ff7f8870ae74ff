//! Boids-style schooling for normal agents.

use glam::Vec2;

use crate::agent::Agent;
use crate::spatial::WorldView;

/// Steer by separation, alignment and cohesion over nearby agents, each
/// weighted by the agent's own traits. Predators never flock.
///
/// # Arguments
/// * `agent` - The agent being steered
/// * `view` - Everyone else
pub fn flock(agent: &mut Agent, view: &WorldView<'_>) {
    if agent.is_predator() {
        return;
    }
    let behavior = &view.config().behavior;
    let neighbors = view.neighbors(agent, behavior.flock_radius);
    if neighbors.is_empty() {
        return;
    }

    let mut separation = Vec2::ZERO;
    let mut heading_sum = Vec2::ZERO;
    let mut position_sum = Vec2::ZERO;

    for neighbor in &neighbors {
        if neighbor.distance < behavior.separation_radius && neighbor.distance > f32::EPSILON {
            // Closer neighbors push harder
            separation -= neighbor.offset / (neighbor.distance * neighbor.distance);
        }
        heading_sum += neighbor.agent.velocity;
        position_sum += neighbor.agent.position;
    }

    let count = neighbors.len() as f32;
    let alignment = (heading_sum / count).normalize_or_zero();
    let cohesion = (position_sum / count - agent.position).normalize_or_zero();
    let separation = separation.normalize_or_zero();

    let dna = &agent.dna;
    let steer = separation * dna.separation + alignment * dna.alignment + cohesion * dna.cohesion;
    agent.velocity += steer * behavior.flock_strength;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Kind;
    use crate::dna::Dna;
    use crate::spatial::NeighborIndex;
    use lifepool_config::Config;
    use lifepool_core::{Arena, Entity};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dna(alignment: f32, cohesion: f32, separation: f32) -> Dna {
        let mut dna = Dna::random(&mut SmallRng::seed_from_u64(0));
        dna.alignment = alignment;
        dna.cohesion = cohesion;
        dna.separation = separation;
        dna
    }

    #[test]
    fn cohesion_pulls_toward_the_group() {
        let config = Config::default();
        let mut arena = Arena::new();
        for y in [-10.0, 10.0] {
            arena.insert_with(|id| Agent::new(id, Kind::Normal, Vec2::new(40.0, y), Vec2::X, dna(0.0, 0.0, 0.0), 100.0));
        }
        let index = NeighborIndex::Bounded { limit: 60 };
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let mut agent = Agent::new(Entity::new(99, 0), Kind::Normal, Vec2::ZERO, Vec2::Y, dna(0.0, 1.0, 0.0), 100.0);
        flock(&mut agent, &view);
        assert!(agent.velocity.x > 0.0);
    }

    #[test]
    fn separation_pushes_away_from_crowding() {
        let config = Config::default();
        let mut arena = Arena::new();
        arena.insert_with(|id| Agent::new(id, Kind::Normal, Vec2::new(5.0, 0.0), Vec2::Y, dna(0.0, 0.0, 0.0), 100.0));
        let index = NeighborIndex::Bounded { limit: 60 };
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let mut agent = Agent::new(Entity::new(99, 0), Kind::Normal, Vec2::ZERO, Vec2::Y, dna(0.0, 0.0, 1.0), 100.0);
        flock(&mut agent, &view);
        assert!(agent.velocity.x < 0.0);
    }

    #[test]
    fn predators_ignore_the_school() {
        let config = Config::default();
        let mut arena = Arena::new();
        arena.insert_with(|id| Agent::new(id, Kind::Normal, Vec2::new(5.0, 0.0), Vec2::Y, dna(1.0, 1.0, 1.0), 100.0));
        let index = NeighborIndex::Bounded { limit: 60 };
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let mut predator = Agent::new(Entity::new(99, 0), Kind::Predator, Vec2::ZERO, Vec2::X, dna(1.0, 1.0, 1.0), 100.0);
        flock(&mut predator, &view);
        assert_eq!(predator.velocity, Vec2::X);
    }
}
