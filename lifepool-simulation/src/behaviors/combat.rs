//! Duels between agents of similar size, and the onlookers they draw.

use glam::Vec2;
use lifepool_config::{CombatSettings, Config};
use lifepool_core::{Arena, Entity};
use log::debug;
use rand::Rng;

use crate::agent::Agent;
use crate::spatial::{NeighborIndex, WorldView};

/// Outcome of one exchange of blows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exchange {
    pub size_loss: f32,
    pub first_died: bool,
    pub second_died: bool,
}

/// Two touching agents start a fight when neither is busy or cooling down
/// and their sizes are within the configured ratio band
pub fn can_start_combat(a: &Agent, b: &Agent, settings: &CombatSettings) -> bool {
    if a.timers.combat_cooldown > 0 || b.timers.combat_cooldown > 0 {
        return false;
    }
    if is_engaged(a) || is_engaged(b) {
        return false;
    }
    let ratio = a.dna.size / b.dna.size;
    (settings.size_ratio_min..=settings.size_ratio_max).contains(&ratio)
}

/// Already fighting, fleeing or hunting
fn is_engaged(agent: &Agent) -> bool {
    agent.relations.opponent.is_some()
        || agent.relations.flee_from.is_some()
        || agent.relations.hunt_target.is_some()
}

pub fn start_combat(a: &mut Agent, b: &mut Agent) {
    a.relations.opponent = Some(b.id);
    b.relations.opponent = Some(a.id);
    debug!("Combat started between {} and {}", a.id, b.id);
}

/// Leave combat and rest before the next one
pub fn end_combat(agent: &mut Agent, cooldown: u32) {
    agent.relations.opponent = None;
    agent.timers.combat_cooldown = cooldown;
}

/// Resolve one collision between opponents.
///
/// Both bounce back with damped velocity and lose the same random amount of
/// size plus a fixed energy cost. If exactly one of them dies, the survivor
/// collects the winner's bonus and leaves combat.
pub fn exchange_blows<R: Rng + ?Sized>(
    first: &mut Agent,
    second: &mut Agent,
    settings: &CombatSettings,
    rng: &mut R,
) -> Exchange {
    first.velocity = -first.velocity * settings.bounce_damping;
    second.velocity = -second.velocity * settings.bounce_damping;

    let size_loss = rng.gen_range(settings.size_loss_min..=settings.size_loss_max);
    for fighter in [&mut *first, &mut *second] {
        fighter.dna.size -= size_loss;
        fighter.energy -= settings.energy_cost;
        if !fighter.is_alive() {
            fighter.mark_dead();
        }
    }

    let first_died = !first.is_alive();
    let second_died = !second.is_alive();
    match (first_died, second_died) {
        (false, true) => declare_winner(first, settings),
        (true, false) => declare_winner(second, settings),
        _ => {}
    }

    Exchange {
        size_loss,
        first_died,
        second_died,
    }
}

fn declare_winner(winner: &mut Agent, settings: &CombatSettings) {
    winner.energy += settings.winner_bonus;
    end_combat(winner, settings.cooldown);
    debug!("Agent {} won its fight", winner.id);
}

/// Close in on the opponent; a vanished opponent ends the fight
pub fn pursue_opponent(agent: &mut Agent, view: &WorldView<'_>) {
    let Some(opponent_id) = agent.relations.opponent else {
        return;
    };
    match view.agent(opponent_id) {
        Some(opponent) => {
            if let Some(direction) = (opponent.position - agent.position).try_normalize() {
                agent.velocity = direction;
            }
        }
        None => end_combat(agent, view.config().combat.cooldown),
    }
}

/// Curious agents near a new fight show an exclamation cue, and the ones not
/// already close are pulled toward it. Returns how many were drawn in.
///
/// # Arguments
/// * `agents` - Arena with at most one of the fighters taken out
/// * `center` - Midpoint of the fight
/// * `fighters` - Both combatants, never counted as observers
pub fn rally_observers(
    agents: &mut Arena<Agent>,
    index: &NeighborIndex,
    center: Vec2,
    fighters: [Entity; 2],
    config: &Config,
) -> usize {
    let behavior = &config.behavior;
    let candidates = index.candidates(agents, center, behavior.observer_radius, fighters[0]);

    let mut drawn = 0;
    for id in candidates {
        if fighters.contains(&id) {
            continue;
        }
        let Some(observer) = agents.get_mut(id) else {
            continue;
        };
        if !observer.is_alive() || observer.dna.curiosity <= config.combat.curiosity_threshold {
            continue;
        }
        let to_fight = center - observer.position;
        let distance = to_fight.length();
        if distance > behavior.observer_radius {
            continue;
        }

        observer.timers.exclamation = behavior.exclamation_duration;
        if distance > behavior.observer_close_distance {
            observer.velocity += to_fight / distance * behavior.observer_pull;
        }
        drawn += 1;
    }
    drawn
}
