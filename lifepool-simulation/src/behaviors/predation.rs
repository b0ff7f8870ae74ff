//! Predators selecting and chasing prey.

use std::cmp::Reverse;

use lifepool_core::Entity;
use log::trace;
use ordered_float::OrderedFloat;

use crate::agent::Agent;
use crate::behaviors::turn_towards;
use crate::spatial::WorldView;

/// Largest strictly smaller non-predator within the hunt radius.
/// Ties on size go to the nearest candidate.
pub fn find_prey(hunter: &Agent, view: &WorldView<'_>) -> Option<Entity> {
    let radius = view.config().behavior.hunt_radius;
    view.neighbors(hunter, radius)
        .into_iter()
        .filter(|n| !n.agent.is_predator() && n.agent.dna.size < hunter.dna.size)
        .max_by_key(|n| (OrderedFloat(n.agent.dna.size), Reverse(OrderedFloat(n.distance))))
        .map(|n| n.id)
}

/// Drop the current target and rest before looking for another
pub fn abandon_hunt(hunter: &mut Agent, cooldown: u32) {
    if let Some(target) = hunter.relations.hunt_target.take() {
        trace!("Predator {} gave up on {}", hunter.id, target);
    }
    hunter.timers.hunt_cooldown = cooldown;
}

/// The target as long as it is alive and within the give-up radius
fn resolve_target<'a>(hunter: &Agent, target: Entity, view: &WorldView<'a>) -> Option<&'a Agent> {
    let give_up = view.config().behavior.hunt_give_up_radius;
    view.agent(target)
        .filter(|prey| prey.energy > 0.0)
        .filter(|prey| prey.position.distance(hunter.position) <= give_up)
}

/// Whether a pursuit of `target` can go on this tick
pub fn is_huntable(hunter: &Agent, target: Entity, view: &WorldView<'_>) -> bool {
    resolve_target(hunter, target, view).is_some()
}

/// Turn toward the target at a bounded rate. The hunt is abandoned when the
/// target dies, disappears, or gets beyond the give-up radius.
pub fn hunt(hunter: &mut Agent, view: &WorldView<'_>) {
    let Some(target_id) = hunter.relations.hunt_target else {
        return;
    };
    let behavior = &view.config().behavior;

    match resolve_target(hunter, target_id, view) {
        Some(prey) => {
            hunter.velocity = turn_towards(
                hunter.velocity,
                prey.position - hunter.position,
                behavior.max_turn_rate,
            );
        }
        None => abandon_hunt(hunter, behavior.hunt_cooldown),
    }
}
