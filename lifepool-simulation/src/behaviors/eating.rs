//! Engulfing a sufficiently smaller agent.

use lifepool_config::EatingSettings;
use log::debug;

use crate::agent::Agent;

/// What an eater gained from a meal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meal {
    pub size_gained: f32,
    pub energy_gained: f32,
}

/// Size ratio an eater must exceed; predators need a smaller margin
pub fn engulf_threshold(eater: &Agent, settings: &EatingSettings) -> f32 {
    if eater.is_predator() {
        settings.predator_threshold
    } else {
        settings.normal_threshold
    }
}

pub fn can_engulf(eater: &Agent, victim: &Agent, settings: &EatingSettings) -> bool {
    eater.dna.size > victim.dna.size * engulf_threshold(eater, settings)
}

/// Eat `victim`: the eater absorbs part of its size and energy and the
/// victim is marked dead. A predator that catches its hunt target rests
/// for `hunt_cooldown` ticks.
pub fn engulf(eater: &mut Agent, victim: &mut Agent, settings: &EatingSettings, hunt_cooldown: u32) -> Meal {
    let mut size_gained = victim.dna.size * settings.size_gain;
    let mut energy_gained = victim.energy.max(0.0) * settings.energy_gain;
    if eater.is_predator() {
        size_gained *= settings.predator_size_gain_factor;
        energy_gained += settings.predator_energy_bonus;
    }

    eater.dna.size += size_gained;
    eater.energy += energy_gained;
    victim.mark_dead();

    if eater.relations.hunt_target == Some(victim.id) {
        eater.relations.hunt_target = None;
        eater.timers.hunt_cooldown = hunt_cooldown;
    }

    debug!(
        "Agent {} engulfed {} (+{:.2} size, +{:.1} energy)",
        eater.id, victim.id, size_gained, energy_gained
    );
    Meal {
        size_gained,
        energy_gained,
    }
}
