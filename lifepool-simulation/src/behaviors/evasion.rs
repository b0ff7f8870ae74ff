//! Fleeing from agents much larger than oneself.

use lifepool_core::Entity;
use log::trace;
use ordered_float::OrderedFloat;

use crate::agent::Agent;
use crate::spatial::WorldView;

/// An agent this many times larger than us is a threat
pub const THREAT_SIZE_RATIO: f32 = 3.0;

/// Nearest agent within the threat radius that is at least
/// [`THREAT_SIZE_RATIO`] times our size
pub fn find_threat(agent: &Agent, view: &WorldView<'_>) -> Option<Entity> {
    let radius = view.config().behavior.threat_radius;
    view.neighbors(agent, radius)
        .into_iter()
        .filter(|n| n.agent.dna.size >= agent.dna.size * THREAT_SIZE_RATIO)
        .min_by_key(|n| OrderedFloat(n.distance))
        .map(|n| n.id)
}

pub fn begin_flee(agent: &mut Agent, threat: Entity, duration: u32) {
    agent.relations.flee_from = Some(threat);
    agent.timers.escape = duration;
    trace!("Agent {} fleeing from {}", agent.id, threat);
}

pub fn end_flee(agent: &mut Agent) {
    agent.relations.flee_from = None;
    agent.timers.escape = 0;
}

/// Head straight away from the threat until it is out of range, gone, or
/// the flee timer runs out
pub fn flee(agent: &mut Agent, view: &WorldView<'_>) {
    let Some(threat_id) = agent.relations.flee_from else {
        return;
    };
    let give_up = view.config().behavior.flee_give_up_radius;

    match view.agent(threat_id) {
        Some(threat) => {
            let away = agent.position - threat.position;
            if away.length() > give_up || agent.timers.escape == 0 {
                end_flee(agent);
                return;
            }
            if let Some(direction) = away.try_normalize() {
                agent.velocity = direction;
            }
        }
        None => end_flee(agent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Kind;
    use crate::dna::Dna;
    use crate::spatial::NeighborIndex;
    use glam::Vec2;
    use lifepool_config::Config;
    use lifepool_core::Arena;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sized(size: f32) -> Dna {
        let mut dna = Dna::random(&mut SmallRng::seed_from_u64(1));
        dna.size = size;
        dna
    }

    #[test]
    fn only_much_larger_agents_are_threats() {
        let config = Config::default();
        let mut arena = Arena::new();
        let near_small = arena.insert_with(|id| Agent::new(id, Kind::Normal, Vec2::new(10.0, 0.0), Vec2::X, sized(5.0), 100.0));
        let big = arena.insert_with(|id| Agent::new(id, Kind::Predator, Vec2::new(60.0, 0.0), Vec2::X, sized(6.0), 100.0));
        let index = NeighborIndex::Bounded { limit: 60 };
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let me = Agent::new(Entity::new(50, 0), Kind::Normal, Vec2::ZERO, Vec2::X, sized(2.0), 100.0);
        assert_eq!(find_threat(&me, &view), Some(big));
        assert_ne!(find_threat(&me, &view), Some(near_small));
    }

    #[test]
    fn fleeing_points_away_and_gives_up_when_the_timer_expires() {
        let config = Config::default();
        let mut arena = Arena::new();
        let threat = arena.insert_with(|id| Agent::new(id, Kind::Predator, Vec2::new(20.0, 0.0), Vec2::X, sized(9.0), 100.0));
        let index = NeighborIndex::Bounded { limit: 60 };
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));

        let mut me = Agent::new(Entity::new(50, 0), Kind::Normal, Vec2::ZERO, Vec2::X, sized(2.0), 100.0);
        begin_flee(&mut me, threat, 10);
        flee(&mut me, &view);
        assert_eq!(me.velocity, Vec2::new(-1.0, 0.0));

        me.timers.escape = 0;
        flee(&mut me, &view);
        assert_eq!(me.relations.flee_from, None);
    }
}
