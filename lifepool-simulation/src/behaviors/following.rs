//! Smaller agents trailing a larger "lord".

use glam::Vec2;
use lifepool_config::BehaviorSettings;
use lifepool_core::Entity;
use log::trace;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::agent::Agent;
use crate::spatial::WorldView;

/// Nearest agent within the follow radius that is larger than `min_size`.
/// Predators never follow anyone.
pub fn find_lord(agent: &Agent, view: &WorldView<'_>, min_size: f32) -> Option<Entity> {
    if agent.is_predator() {
        return None;
    }
    let radius = view.config().behavior.follow_radius;
    view.neighbors(agent, radius)
        .into_iter()
        .filter(|n| n.agent.dna.size > min_size)
        .min_by_key(|n| OrderedFloat(n.distance))
        .map(|n| n.id)
}

pub fn attach(agent: &mut Agent, lord: Entity) {
    agent.relations.lord = Some(lord);
    agent.relations.follow_offset = None;
    agent.timers.lord_recheck = 0;
    trace!("Agent {} now follows {}", agent.id, lord);
}

pub fn release_lord(agent: &mut Agent) {
    agent.relations.lord = None;
    agent.relations.follow_offset = None;
    agent.timers.lord_recheck = 0;
}

/// A point behind the lord's heading, inside a cone of
/// `follow_offset_spread_deg` either side
fn offset_behind<R: Rng + ?Sized>(lord_heading: Vec2, settings: &BehaviorSettings, rng: &mut R) -> Vec2 {
    let spread = settings.follow_offset_spread_deg.abs().to_radians();
    let behind = lord_heading.y.atan2(lord_heading.x) + std::f32::consts::PI;
    let angle = if spread > 0.0 {
        behind + rng.gen_range(-spread..=spread)
    } else {
        behind
    };
    let distance = rng.gen_range(settings.follow_offset_min..=settings.follow_offset_max);
    Vec2::new(angle.cos(), angle.sin()) * distance
}

/// Keep station behind the lord, periodically switching to a larger lord
/// nearby. Following ends once the lord is gone or too far away.
pub fn follow<R: Rng + ?Sized>(agent: &mut Agent, view: &WorldView<'_>, rng: &mut R) {
    let Some(lord_id) = agent.relations.lord else {
        return;
    };
    let settings = &view.config().behavior;

    let mut lord = match view.agent(lord_id) {
        Some(lord) if lord.position.distance(agent.position) <= settings.follow_give_up_radius => lord,
        _ => {
            release_lord(agent);
            return;
        }
    };

    if agent.timers.lord_recheck == 0 {
        agent.timers.lord_recheck = settings.lord_recheck_interval;
        if let Some(bigger_id) = find_lord(agent, view, lord.dna.size) {
            if let Some(bigger) = view.agent(bigger_id) {
                attach(agent, bigger_id);
                agent.timers.lord_recheck = settings.lord_recheck_interval;
                lord = bigger;
            }
        }
    }

    let offset = match agent.relations.follow_offset {
        Some(offset) => offset,
        None => {
            let offset = offset_behind(lord.velocity, settings, rng);
            agent.relations.follow_offset = Some(offset);
            offset
        }
    };

    let station = lord.position + offset;
    if let Some(direction) = (station - agent.position).try_normalize() {
        agent.velocity += direction * settings.follow_strength * (0.5 + agent.dna.social);
    }
}
