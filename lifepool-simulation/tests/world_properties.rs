use std::time::Duration;

use glam::Vec2;
use lifepool_config::{Config, ScanPolicy};
use lifepool_simulation::{Dna, EnergyPoint, Kind, Newborn, ShellCommand, World};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const FRAME: Duration = Duration::from_millis(16);

fn seeded_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.rng_seed = Some(seed);
    config
}

fn newborn(kind: Kind, position: Vec2, size: f32, energy: f32) -> Newborn {
    let mut dna = Dna::random(&mut SmallRng::seed_from_u64(position.x.to_bits() as u64));
    dna.size = size;
    Newborn {
        kind,
        position,
        heading: Vec2::X,
        dna,
        energy,
    }
}

#[test]
fn population_never_exceeds_the_cap() {
    let mut config = seeded_config(1);
    config.world.population_cap = 40;
    config.reproduction.chance = 1.0;
    config.agent.initial_energy = 200.0;
    let mut world = World::new(config);
    world.apply(&ShellCommand::SpawnRandom { count: 30 });

    for _ in 0..200 {
        world.tick(FRAME);
        assert!(world.population() <= 40);
    }
}

#[test]
fn motion_stays_finite_under_both_scan_policies() {
    for policy in [ScanPolicy::Bounded { limit: 60 }, ScanPolicy::Grid { cell_size: 50.0 }] {
        let mut config = seeded_config(7);
        config.spatial.policy = policy;
        let mut world = World::new(config);
        world.populate();
        world.spawn_random(40);

        for _ in 0..300 {
            world.tick(FRAME);
            for agent in world.agents().values() {
                // Unit after steering; bounces and onlooker pulls may rescale it afterwards
                assert!(agent.velocity.is_finite());
                assert!(agent.velocity.length() <= 5.0, "{:?}", agent.velocity);
                assert!(agent.position.is_finite());
                assert!(agent.energy.is_finite());
            }
        }
    }
}

#[test]
fn agents_stay_near_the_arena() {
    let mut world = World::new(seeded_config(3));
    world.populate();
    let bounds = world.bounds();

    for _ in 0..500 {
        world.tick(FRAME);
        for agent in world.agents().values() {
            // One tick of travel at most past the wrap line
            let slack = agent.dna.size + 10.0;
            assert!(agent.position.x >= -slack && agent.position.x <= bounds.x + slack);
            assert!(agent.position.y >= -slack && agent.position.y <= bounds.y + slack);
        }
    }
}

#[test]
fn relations_never_point_at_missing_agents_after_a_scrub() {
    let mut config = seeded_config(11);
    config.world.scrub_interval_secs = 0.01;
    let mut world = World::new(config);
    world.populate();
    world.spawn_predator();
    world.spawn_predator();

    for _ in 0..400 {
        world.tick(FRAME);
        for agent in world.agents().values() {
            let relations = &agent.relations;
            for target in [relations.lord, relations.opponent, relations.flee_from, relations.hunt_target]
                .into_iter()
                .flatten()
            {
                assert!(world.agent(target).is_some());
            }
        }
    }
}

#[test]
fn energy_points_decay_and_expire_inside_the_world() {
    let mut world = World::new(seeded_config(5));
    world.add_energy_point(EnergyPoint::new(Vec2::new(100.0, 100.0), 60.0, 300));

    for _ in 0..100 {
        world.tick(FRAME);
    }
    assert!((world.energy_points()[0].energy - 40.0).abs() < 1e-3);

    for _ in 100..300 {
        world.tick(FRAME);
    }
    assert!(world.energy_points().is_empty());
}

#[test]
fn a_much_larger_neighbor_triggers_exactly_one_escape() {
    let mut config = seeded_config(9);
    config.agent.curiosity_jitter_chance = 0.0;
    config.reproduction.chance = 0.0;
    let mut world = World::new(config);
    let minnow = world
        .insert_agent(newborn(Kind::Normal, Vec2::new(400.0, 300.0), 2.0, 100.0))
        .unwrap();
    world
        .insert_agent(newborn(Kind::Normal, Vec2::new(460.0, 300.0), 9.0, 100.0))
        .unwrap();

    world.tick(FRAME);
    assert_eq!(world.stats().events.escape_events, 1);
    assert!(world.agent(minnow).unwrap().relations.flee_from.is_some());

    world.tick(FRAME);
    assert_eq!(world.stats().events.escape_events, 1);
}

#[test]
fn clear_then_respawn() {
    let mut world = World::new(seeded_config(2));
    world.populate();
    for _ in 0..30 {
        world.tick(FRAME);
    }
    world.apply(&ShellCommand::Clear);
    let stats = world.stats();
    assert_eq!((stats.agents, stats.energy_points), (0, 0));
    assert_eq!(stats.events.eat_events + stats.events.combat_events + stats.events.escape_events, 0);

    world.apply(&ShellCommand::SpawnSchool);
    assert_eq!(world.population(), 20);
}

#[test]
fn every_agent_left_after_a_tick_is_alive() {
    for policy in [ScanPolicy::Bounded { limit: 60 }, ScanPolicy::Grid { cell_size: 50.0 }] {
        let mut config = seeded_config(21);
        config.spatial.policy = policy;
        config.world.width = 640.0;
        config.world.height = 360.0;
        config.reproduction.chance = 0.05;
        let mut world = World::new(config);
        world.populate();
        world.spawn_predator();
        world.spawn_predator();
        world.spawn_random(30);

        for _ in 0..400 {
            world.tick(FRAME);
            for agent in world.agents().values() {
                assert!(agent.is_alive(), "{} left in the world with energy {} and size {}", agent.id, agent.energy, agent.dna.size);
                assert!(agent.energy > 0.0 && agent.dna.size > 0.5);
            }
        }
    }
}
