//! The simulated microbe and its per-tick state machine.

use std::fmt;

use glam::Vec2;
use lifepool_config::{AgentSettings, Config, ReproductionSettings, SpeedModel};
use lifepool_core::Entity;
use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behaviors::{combat, evasion, flocking, following, predation};
use crate::dna::Dna;
use crate::spatial::WorldView;

/// Agents at or below this size are dead
pub const DEATH_SIZE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Normal,
    Predator,
}

/// What an agent did with its heading on the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Fleeing,
    Hunting,
    Following,
    Fighting,
    Flocking,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Fleeing => "fleeing",
            Mode::Hunting => "hunting",
            Mode::Following => "following",
            Mode::Fighting => "fighting",
            Mode::Flocking => "flocking",
        };
        f.write_str(name)
    }
}

/// Handles to other agents. Any of them may go stale; lookups go through
/// [`WorldView`] and stale handles are scrubbed by the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relations {
    pub lord: Option<Entity>,
    /// Where to sit relative to the lord, fixed while following the same lord
    pub follow_offset: Option<Vec2>,
    pub opponent: Option<Entity>,
    pub flee_from: Option<Entity>,
    pub hunt_target: Option<Entity>,
}

/// Countdown timers, in ticks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    pub combat_cooldown: u32,
    pub hunt_cooldown: u32,
    pub escape: u32,
    /// Ticks left to show the "!" cue above a curious onlooker
    pub exclamation: u32,
    pub lord_recheck: u32,
}

impl Timers {
    fn tick(&mut self) {
        for timer in [
            &mut self.combat_cooldown,
            &mut self.hunt_cooldown,
            &mut self.escape,
            &mut self.exclamation,
            &mut self.lord_recheck,
        ] {
            *timer = timer.saturating_sub(1);
        }
    }
}

/// Events from a single [`Agent::update`] the world keeps counters for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub escape_started: bool,
}

/// Everything needed to place a new agent, before it has a handle
#[derive(Debug, Clone, PartialEq)]
pub struct Newborn {
    pub kind: Kind,
    pub position: Vec2,
    pub heading: Vec2,
    pub dna: Dna,
    pub energy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Entity,
    pub kind: Kind,
    pub position: Vec2,
    /// Unit heading after every update
    pub velocity: Vec2,
    pub dna: Dna,
    pub energy: f32,
    pub age: u64,
    pub mode: Mode,
    pub relations: Relations,
    pub timers: Timers,
}

impl Agent {
    pub fn new(id: Entity, kind: Kind, position: Vec2, heading: Vec2, dna: Dna, energy: f32) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: heading.try_normalize().unwrap_or(Vec2::X),
            dna,
            energy,
            age: 0,
            mode: Mode::Idle,
            relations: Relations::default(),
            timers: Timers::default(),
        }
    }

    pub fn from_newborn(id: Entity, newborn: Newborn) -> Self {
        Self::new(id, newborn.kind, newborn.position, newborn.heading, newborn.dna, newborn.energy)
    }

    pub fn is_predator(&self) -> bool {
        self.kind == Kind::Predator
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0 && self.dna.size > DEATH_SIZE
    }

    /// Kill the agent in place. It is removed from the arena at the end of the tick.
    pub fn mark_dead(&mut self) {
        self.energy = 0.0;
    }

    /// Distance covered per tick in the current mode
    pub fn speed(&self, settings: &AgentSettings) -> f32 {
        let base = match settings.speed_model {
            SpeedModel::Fixed => settings.base_speed,
            SpeedModel::Trait => self.dna.base_speed,
        };
        let kind = match self.kind {
            Kind::Predator => settings.predator_speed_multiplier,
            Kind::Normal => 1.0,
        };
        let flee = if self.mode == Mode::Fleeing {
            settings.flee_speed_multiplier
        } else {
            1.0
        };
        base * kind * flee
    }

    /// Advance the agent by one tick: age, pick a mode, steer, move and wrap.
    ///
    /// Interactions that mutate other agents (eating, fighting) are resolved
    /// by the world afterwards.
    pub fn update<R: Rng + ?Sized>(&mut self, view: &WorldView<'_>, rng: &mut R) -> TickReport {
        let config = view.config();
        let mut report = TickReport::default();

        self.age += 1;
        self.energy -= config.agent.metabolic_cost;
        self.timers.tick();
        let previous_heading = self.velocity;

        let mode = self.select_mode(view, &mut report);
        if mode != self.mode {
            trace!("Agent {} mode {} -> {}", self.id, self.mode, mode);
            self.mode = mode;
        }

        match self.mode {
            Mode::Hunting => predation::hunt(self, view),
            Mode::Fleeing => evasion::flee(self, view),
            Mode::Fighting => combat::pursue_opponent(self, view),
            Mode::Following => following::follow(self, view, rng),
            Mode::Flocking => flocking::flock(self, view),
            Mode::Idle => {}
        }

        if !matches!(self.mode, Mode::Fleeing | Mode::Hunting) {
            self.apply_curiosity(&config.agent, rng);
        }

        // A zero vector keeps the previous heading instead of producing NaN
        self.velocity = self
            .velocity
            .try_normalize()
            .or_else(|| previous_heading.try_normalize())
            .unwrap_or(Vec2::X);

        self.position += self.velocity * self.speed(&config.agent);
        self.wrap(view.bounds());
        report
    }

    /// Pick this tick's mode. Higher-priority behaviors win:
    /// hunting, fleeing, fighting, following, then flocking.
    fn select_mode(&mut self, view: &WorldView<'_>, report: &mut TickReport) -> Mode {
        let behavior = &view.config().behavior;

        if self.is_predator() && self.relations.flee_from.is_none() && self.timers.hunt_cooldown == 0 {
            if self.relations.hunt_target.is_none() {
                if let Some(prey) = predation::find_prey(self, view) {
                    self.relations.hunt_target = Some(prey);
                    trace!("Predator {} started hunting {}", self.id, prey);
                }
            }
            if let Some(target) = self.relations.hunt_target {
                if predation::is_huntable(self, target, view) {
                    return Mode::Hunting;
                }
                predation::abandon_hunt(self, behavior.hunt_cooldown);
            }
        }

        if self.relations.flee_from.is_none() {
            if let Some(threat) = evasion::find_threat(self, view) {
                evasion::begin_flee(self, threat, behavior.flee_duration);
                report.escape_started = true;
            }
        }
        if self.relations.flee_from.is_some() {
            return Mode::Fleeing;
        }

        if self.relations.opponent.is_some() {
            return Mode::Fighting;
        }

        if self.is_predator() {
            return Mode::Idle;
        }

        if self.relations.lord.is_none() {
            if let Some(lord) = following::find_lord(self, view, self.dna.size) {
                following::attach(self, lord);
            }
        }
        if self.relations.lord.is_some() {
            Mode::Following
        } else {
            Mode::Flocking
        }
    }

    fn apply_curiosity<R: Rng + ?Sized>(&mut self, settings: &AgentSettings, rng: &mut R) {
        let chance = (settings.curiosity_jitter_chance * self.dna.curiosity).clamp(0.0, 1.0);
        if rng.gen_bool(chance as f64) {
            let half = settings.curiosity_jitter.abs() / 2.0;
            if half > 0.0 {
                self.velocity += Vec2::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half));
            }
        }
    }

    /// Toroidal wrap: leaving past one edge re-enters just outside the other
    pub fn wrap(&mut self, bounds: Vec2) {
        let size = self.dna.size;
        if self.position.x > bounds.x {
            self.position.x = -size;
        } else if self.position.x < -size {
            self.position.x = bounds.x;
        }
        if self.position.y > bounds.y {
            self.position.y = -size;
        } else if self.position.y < -size {
            self.position.y = bounds.y;
        }
    }

    /// Whether the energy and state conditions for reproduction hold
    pub fn can_reproduce(&self, settings: &ReproductionSettings) -> bool {
        self.is_alive()
            && self.energy > settings.energy_threshold
            && self.relations.flee_from.is_none()
            && self.relations.hunt_target.is_none()
            && self.relations.opponent.is_none()
    }

    /// Roll for reproduction. The caller is responsible for the population cap.
    pub fn try_reproduce<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &Config) -> Option<Newborn> {
        let settings = &config.reproduction;
        if self.can_reproduce(settings) && rng.gen_bool(settings.chance.clamp(0.0, 1.0)) {
            Some(self.reproduce(rng, config))
        } else {
            None
        }
    }

    /// Pay the reproduction cost and produce a mutated child next to this agent
    pub fn reproduce<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &Config) -> Newborn {
        let settings = &config.reproduction;
        self.energy -= settings.energy_cost;

        let half = settings.spawn_jitter.abs() / 2.0;
        let mut jitter = || if half > 0.0 { rng.gen_range(-half..=half) } else { 0.0 };
        let position = self.position + Vec2::new(jitter(), jitter());

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        Newborn {
            kind: self.kind,
            position,
            heading: Vec2::new(angle.cos(), angle.sin()),
            dna: self.dna.mutate(rng, settings),
            energy: config.agent.initial_energy,
        }
    }

    /// Drop every relation whose target satisfies `gone`, resetting the
    /// state tied to it. Returns whether anything changed.
    pub fn forget(&mut self, gone: impl Fn(Entity) -> bool, hunt_cooldown: u32) -> bool {
        let mut changed = false;
        if self.relations.lord.map_or(false, &gone) {
            following::release_lord(self);
            changed = true;
        }
        if self.relations.opponent.map_or(false, &gone) {
            self.relations.opponent = None;
            changed = true;
        }
        if self.relations.flee_from.map_or(false, &gone) {
            evasion::end_flee(self);
            changed = true;
        }
        if self.relations.hunt_target.map_or(false, &gone) {
            predation::abandon_hunt(self, hunt_cooldown);
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::NeighborIndex;
    use lifepool_config::ScanPolicy;
    use lifepool_core::Arena;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn lone_agent(kind: Kind, position: Vec2) -> Agent {
        let dna = Dna::random(&mut SmallRng::seed_from_u64(9));
        Agent::new(Entity::new(0, 0), kind, position, Vec2::X, dna, 100.0)
    }

    #[test]
    fn wrap_reenters_from_the_opposite_edge() {
        let bounds = Vec2::new(100.0, 50.0);
        let mut agent = lone_agent(Kind::Normal, Vec2::new(101.0, 10.0));
        agent.wrap(bounds);
        assert_eq!(agent.position.x, -agent.dna.size);

        agent.position = Vec2::new(10.0, -agent.dna.size - 0.1);
        agent.wrap(bounds);
        assert_eq!(agent.position.y, 50.0);
    }

    #[test]
    fn update_keeps_a_unit_heading() {
        let config = Config::default();
        let arena: Arena<Agent> = Arena::new();
        let index = NeighborIndex::from_policy(ScanPolicy::Bounded { limit: 60 });
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));
        let mut rng = SmallRng::seed_from_u64(2);

        let mut agent = lone_agent(Kind::Normal, Vec2::new(500.0, 300.0));
        agent.velocity = Vec2::ZERO;
        for _ in 0..50 {
            agent.update(&view, &mut rng);
            assert!((agent.velocity.length() - 1.0).abs() < 1e-4);
        }
        assert_eq!(agent.age, 50);
    }

    #[test]
    fn a_vanished_hunt_target_is_dropped_before_choosing_a_mode() {
        let config = Config::default();
        let arena: Arena<Agent> = Arena::new();
        let index = NeighborIndex::from_policy(ScanPolicy::Bounded { limit: 60 });
        let view = WorldView::new(&arena, &index, &config, Vec2::new(1280.0, 720.0));
        let mut rng = SmallRng::seed_from_u64(3);

        let mut predator = lone_agent(Kind::Predator, Vec2::new(500.0, 300.0));
        predator.relations.hunt_target = Some(Entity::new(4, 2));
        predator.update(&view, &mut rng);

        assert_eq!(predator.mode, Mode::Idle);
        assert_eq!(predator.relations.hunt_target, None);
        assert_eq!(predator.timers.hunt_cooldown, config.behavior.hunt_cooldown);
    }

    #[test]
    fn predators_are_faster_and_fleeing_is_faster_still() {
        let settings = AgentSettings::default();
        let mut normal = lone_agent(Kind::Normal, Vec2::ZERO);
        let predator = lone_agent(Kind::Predator, Vec2::ZERO);

        assert_eq!(normal.speed(&settings), 1.0);
        assert_eq!(predator.speed(&settings), 3.0);
        normal.mode = Mode::Fleeing;
        assert_eq!(normal.speed(&settings), 1.5);
    }

    #[test]
    fn reproduction_splits_energy_and_places_the_child_nearby() {
        let config = Config::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut parent = lone_agent(Kind::Normal, Vec2::new(200.0, 200.0));
        parent.energy = 150.0;

        let child = parent.reproduce(&mut rng, &config);
        assert_eq!(parent.energy, 90.0);
        assert_eq!(child.energy, config.agent.initial_energy);
        assert_eq!(child.kind, Kind::Normal);
        assert!((child.position.x - 200.0).abs() <= 10.0);
        assert!((child.position.y - 200.0).abs() <= 10.0);
        assert!(child.dna.is_within_bounds());
    }

    #[test]
    fn busy_agents_do_not_reproduce() {
        let settings = ReproductionSettings::default();
        let mut agent = lone_agent(Kind::Normal, Vec2::ZERO);
        agent.energy = 150.0;
        assert!(agent.can_reproduce(&settings));

        agent.relations.flee_from = Some(Entity::new(3, 0));
        assert!(!agent.can_reproduce(&settings));

        agent.relations.flee_from = None;
        agent.energy = 120.0;
        assert!(!agent.can_reproduce(&settings));
    }

    #[test]
    fn forget_clears_only_matching_relations() {
        let stale = Entity::new(7, 0);
        let kept = Entity::new(8, 0);
        let mut agent = lone_agent(Kind::Normal, Vec2::ZERO);
        agent.relations.lord = Some(stale);
        agent.relations.follow_offset = Some(Vec2::new(40.0, 0.0));
        agent.relations.flee_from = Some(kept);
        agent.timers.escape = 30;

        assert!(agent.forget(|id| id == stale, 120));
        assert_eq!(agent.relations.lord, None);
        assert_eq!(agent.relations.follow_offset, None);
        assert_eq!(agent.relations.flee_from, Some(kept));
        assert_eq!(agent.timers.escape, 30);
    }
}
