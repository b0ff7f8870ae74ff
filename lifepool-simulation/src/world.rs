//! The world: owns agents and energy points, runs the per-frame tick and
//! applies user commands.

use std::collections::HashSet;
use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec2;
use lifepool_config::Config;
use lifepool_core::{Arena, Entity, FpsMeter};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::agent::{Agent, Kind, Newborn};
use crate::behaviors::{combat, eating};
use crate::commands::{CommandOutcome, ShellCommand};
use crate::dna::Dna;
use crate::energy_point::EnergyPoint;
use crate::render::{self, Rgba, Surface};
use crate::spatial::{NeighborIndex, WorldView};
use crate::stats::{EventCounters, TickSummary, WorldStats};

/// Extra reach added to an agent's own size when looking for bodies it
/// might be touching
const CONTACT_REACH: f32 = 40.0;

pub struct World {
    config: Config,
    bounds: Vec2,
    agents: Arena<Agent>,
    energy_points: Vec<EnergyPoint>,
    index: NeighborIndex,
    rng: SmallRng,
    events: EventCounters,
    fps: FpsMeter,
    frame: u64,
    since_scrub: Duration,
}

impl World {
    /// Create an empty world. The RNG is seeded from `config.rng_seed` when set.
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let bounds = Vec2::new(config.world.width, config.world.height);
        let index = NeighborIndex::from_policy(config.spatial.policy);

        info!(
            "Created world {}x{} (population cap {})",
            bounds.x, bounds.y, config.world.population_cap
        );

        Self {
            config,
            bounds,
            agents: Arena::new(),
            energy_points: Vec::new(),
            index,
            rng,
            events: EventCounters::default(),
            fps: FpsMeter::new(),
            frame: 0,
            since_scrub: Duration::ZERO,
        }
    }

    /// Spawn the initial schools and predators named in the config
    pub fn populate(&mut self) {
        for _ in 0..self.config.world.initial_schools {
            self.spawn_school();
        }
        for _ in 0..self.config.world.initial_predators {
            self.spawn_predator();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn agents(&self) -> &Arena<Agent> {
        &self.agents
    }

    pub fn agent(&self, id: Entity) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: Entity) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn energy_points(&self) -> &[EnergyPoint] {
        &self.energy_points
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    fn room(&self) -> usize {
        self.config.world.population_cap.saturating_sub(self.agents.len())
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            frame: self.frame,
            agents: self.agents.len(),
            predators: self.agents.values().filter(|agent| agent.is_predator()).count(),
            energy_points: self.energy_points.len(),
            fps: self.fps.fps(),
            events: self.events,
        }
    }

    /// Add an agent unless the population cap has been reached
    pub fn insert_agent(&mut self, newborn: Newborn) -> Option<Entity> {
        if self.agents.len() >= self.config.world.population_cap {
            return None;
        }
        let position = newborn.position;
        let id = self.agents.insert_with(|id| Agent::from_newborn(id, newborn));
        self.index.note_spawn(id, position);
        Some(id)
    }

    pub fn add_energy_point(&mut self, point: EnergyPoint) {
        self.energy_points.push(point);
    }

    // --- Tick ---

    /// Run one full frame of the simulation.
    ///
    /// # Arguments
    /// * `elapsed` - Real time since the previous tick, used for the fps
    ///   meter and the periodic relation scrub
    pub fn tick(&mut self, elapsed: Duration) -> TickSummary {
        self.frame += 1;
        self.fps.record(elapsed);

        self.update_energy_points();
        self.index.rebuild(&self.agents);

        let mut summary = TickSummary::default();
        let cap = self.config.world.population_cap;

        // Children inserted during the loop are not in this snapshot and
        // first move next tick, but are visible to later queries now.
        for id in self.agents.entities() {
            let Some(mut agent) = self.agents.take(id) else {
                continue;
            };

            if agent.is_alive() {
                let view = WorldView::new(&self.agents, &self.index, &self.config, self.bounds);
                let report = agent.update(&view, &mut self.rng);
                if report.escape_started {
                    self.events.escape_events += 1;
                }

                if agent.is_alive() {
                    resolve_contacts(
                        &mut agent,
                        &mut self.agents,
                        &self.index,
                        &self.config,
                        &mut self.rng,
                        &mut self.events,
                    );
                }

                // The agent being updated is out of the arena, hence the +1
                if agent.is_alive() && self.agents.len() + 1 < cap {
                    if let Some(newborn) = agent.try_reproduce(&mut self.rng, &self.config) {
                        let position = newborn.position;
                        let child = self.agents.insert_with(|id| Agent::from_newborn(id, newborn));
                        self.index.note_spawn(child, position);
                        summary.births += 1;
                        debug!("Agent {} born from {} at ({:.0}, {:.0})", child, id, position.x, position.y);
                    }
                }
            }

            if self.agents.restore(id, agent).is_err() {
                warn!("Agent {} could not be returned to the arena", id);
            }
        }

        let dead = self.agents.retain(|_, agent| agent.is_alive());
        summary.deaths = dead.len();
        if summary.births > 0 || summary.deaths > 0 {
            debug!(
                "Frame {}: {} born, {} died, population {}",
                self.frame,
                summary.births,
                summary.deaths,
                self.agents.len()
            );
        }

        self.since_scrub += elapsed;
        if self.since_scrub.as_secs_f32() >= self.config.world.scrub_interval_secs {
            self.since_scrub = Duration::ZERO;
            self.scrub_relations();
        }

        summary
    }

    /// Age energy points, drop the spent ones, then let the rest pull
    /// nearby agents
    fn update_energy_points(&mut self) {
        let settings = &self.config.energy_points;
        for point in &mut self.energy_points {
            point.update(settings.pulse_rate);
        }
        self.energy_points.retain(EnergyPoint::is_alive);
        if self.energy_points.is_empty() {
            return;
        }

        for (_, agent) in self.agents.iter_mut() {
            if !agent.is_alive() {
                continue;
            }
            for point in &self.energy_points {
                point.attract(agent, settings);
            }
        }
    }

    /// Clear every relation that points at an agent no longer in the world.
    /// Returns how many agents were touched.
    pub fn scrub_relations(&mut self) -> usize {
        let live: HashSet<Entity> = self.agents.entities().into_iter().collect();
        let hunt_cooldown = self.config.behavior.hunt_cooldown;

        let mut scrubbed = 0;
        for (_, agent) in self.agents.iter_mut() {
            if agent.forget(|id| !live.contains(&id), hunt_cooldown) {
                scrubbed += 1;
            }
        }
        if scrubbed > 0 {
            debug!("Scrubbed stale relations from {} agents", scrubbed);
        }
        scrubbed
    }

    // --- Commands ---

    pub fn apply(&mut self, command: &ShellCommand) -> CommandOutcome {
        match *command {
            ShellCommand::Clear => {
                self.clear();
                CommandOutcome::Cleared
            }
            ShellCommand::SpawnSchool => CommandOutcome::Spawned(self.spawn_school()),
            ShellCommand::SpawnPredator => CommandOutcome::Spawned(self.spawn_predator()),
            ShellCommand::SpawnRandom { count } => CommandOutcome::Spawned(self.spawn_random(count)),
            ShellCommand::Click { x, y } => self.handle_click(Vec2::new(x, y)),
            ShellCommand::Resize { width, height } => {
                self.resize(width, height);
                CommandOutcome::Resized
            }
        }
    }

    /// Wipe every agent and energy point and reset the event counters
    pub fn clear(&mut self) {
        self.agents.clear();
        self.energy_points.clear();
        self.index.clear();
        self.events = EventCounters::default();
        self.since_scrub = Duration::ZERO;
        info!("World cleared");
    }

    fn random_position(&mut self, margin: f32) -> Vec2 {
        let mut axis = |extent: f32| {
            if extent > 2.0 * margin {
                self.rng.gen_range(margin..extent - margin)
            } else {
                self.rng.gen_range(0.0..extent.max(f32::EPSILON))
            }
        };
        let x = axis(self.bounds.x);
        let y = axis(self.bounds.y);
        Vec2::new(x, y)
    }

    fn random_heading(&mut self) -> Vec2 {
        let angle = self.rng.gen_range(0.0..TAU);
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Add up to `school_size` related agents in a ring, sharing a heading.
    /// Returns how many were added.
    pub fn spawn_school(&mut self) -> usize {
        let count = self.config.world.school_size.min(self.room());
        if count == 0 {
            warn!("Population cap reached, school not spawned");
            return 0;
        }

        let radius = self.config.world.school_radius;
        let center = self.random_position(radius + 10.0);
        let heading = self.random_heading();
        let base = Dna::random(&mut self.rng);
        let energy = self.config.agent.initial_energy;

        for i in 0..count {
            let theta = TAU * i as f32 / count as f32;
            let position = center + Vec2::new(theta.cos(), theta.sin()) * radius;
            let dna = base.mutate(&mut self.rng, &self.config.reproduction);
            self.insert_agent(Newborn {
                kind: Kind::Normal,
                position,
                heading,
                dna,
                energy,
            });
        }

        info!("Spawned a school of {} at ({:.0}, {:.0})", count, center.x, center.y);
        count
    }

    /// Add one predator at a random position. Returns how many were added.
    pub fn spawn_predator(&mut self) -> usize {
        if self.room() == 0 {
            warn!("Population cap reached, predator not spawned");
            return 0;
        }
        let position = self.random_position(20.0);
        let heading = self.random_heading();
        let dna = Dna::predator(&mut self.rng, self.config.agent.predator_size);
        let energy = self.config.agent.initial_energy;

        let spawned = self.insert_agent(Newborn {
            kind: Kind::Predator,
            position,
            heading,
            dna,
            energy,
        });
        if let Some(id) = spawned {
            info!("Spawned predator {} at ({:.0}, {:.0})", id, position.x, position.y);
        }
        usize::from(spawned.is_some())
    }

    /// Add up to `count` unrelated agents at random positions
    pub fn spawn_random(&mut self, count: usize) -> usize {
        let count = count.min(self.room());
        if count == 0 {
            warn!("Population cap reached, no agents spawned");
            return 0;
        }
        let energy = self.config.agent.initial_energy;
        for _ in 0..count {
            let position = self.random_position(0.0);
            let heading = self.random_heading();
            let dna = Dna::random(&mut self.rng);
            self.insert_agent(Newborn {
                kind: Kind::Normal,
                position,
                heading,
                dna,
                energy,
            });
        }
        info!("Spawned {} random agents", count);
        count
    }

    /// Remove the topmost agent under `point` (the last one drawn) and
    /// scatter its energy over a handful of energy points
    pub fn handle_click(&mut self, point: Vec2) -> CommandOutcome {
        let padding = self.config.world.click_padding;
        let hit = self
            .agents
            .iter()
            .filter(|(_, agent)| agent.is_alive() && agent.position.distance(point) <= agent.dna.size + padding)
            .last()
            .map(|(id, _)| id);

        let Some(agent) = hit.and_then(|id| self.agents.remove(id)) else {
            return CommandOutcome::Missed;
        };

        let settings = &self.config.energy_points;
        let pieces = self.rng.gen_range(settings.min_split..=settings.max_split) as usize;
        let weights: SmallVec<[f32; 8]> = (0..pieces).map(|_| self.rng.gen_range(0.5..1.5)).collect();
        let total: f32 = weights.iter().sum();
        let energy = agent.energy.max(0.0);
        let jitter = settings.jitter.abs();

        for weight in weights {
            let offset = if jitter > 0.0 {
                Vec2::new(self.rng.gen_range(-jitter..=jitter), self.rng.gen_range(-jitter..=jitter))
            } else {
                Vec2::ZERO
            };
            self.energy_points.push(EnergyPoint::new(
                agent.position + offset,
                energy * weight / total,
                settings.lifespan,
            ));
        }

        info!(
            "Removed agent {} by click, released {:.1} energy over {} points",
            agent.id, energy, pieces
        );
        CommandOutcome::Removed {
            agent: agent.id,
            energy_points: pieces,
        }
    }

    /// Adopt new surface dimensions for wrapping and spawn placement
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.bounds = Vec2::new(width, height);
        self.config.world.width = width;
        self.config.world.height = height;
        info!("World resized to {}x{}", width, height);
    }

    // --- Rendering ---

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Rgba::BACKGROUND);
        for point in &self.energy_points {
            render::draw_energy_point(surface, point);
        }
        for agent in self.agents.values() {
            render::draw_agent(surface, agent, &self.config.agent);
        }
    }
}

/// Resolve every contact between `agent` and the bodies it overlaps:
/// blows between opponents, engulfment, or the start of a new fight.
fn resolve_contacts(
    agent: &mut Agent,
    agents: &mut Arena<Agent>,
    index: &NeighborIndex,
    config: &Config,
    rng: &mut SmallRng,
    events: &mut EventCounters,
) {
    let reach = agent.dna.size + CONTACT_REACH;
    let candidates = index.candidates(agents, agent.position, reach, agent.id);
    let mut new_fights: SmallVec<[(Vec2, [Entity; 2]); 2]> = SmallVec::new();

    for other_id in candidates {
        if !agent.is_alive() {
            break;
        }
        let Some(other) = agents.get_mut(other_id) else {
            continue;
        };
        if !other.is_alive() {
            continue;
        }
        if agent.position.distance(other.position) >= agent.dna.size + other.dna.size {
            continue;
        }

        if agent.relations.opponent == Some(other_id) {
            combat::exchange_blows(agent, other, &config.combat, rng);
        } else if eating::can_engulf(agent, other, &config.eating) {
            eating::engulf(agent, other, &config.eating, config.behavior.hunt_cooldown);
            events.eat_events += 1;
        } else if eating::can_engulf(other, agent, &config.eating) {
            eating::engulf(other, agent, &config.eating, config.behavior.hunt_cooldown);
            events.eat_events += 1;
        } else if combat::can_start_combat(agent, other, &config.combat) {
            combat::start_combat(agent, other);
            events.combat_events += 1;
            new_fights.push(((agent.position + other.position) / 2.0, [agent.id, other_id]));
        }
    }

    for (center, fighters) in new_fights {
        combat::rally_observers(agents, index, center, fighters, config);
    }
}
