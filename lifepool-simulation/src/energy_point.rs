//! Short-lived energy pickups left behind when an agent is removed by a click.

use glam::Vec2;
use lifepool_config::EnergyPointSettings;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyPoint {
    pub position: Vec2,
    pub energy: f32,
    pub max_energy: f32,
    pub age: u32,
    pub lifespan: u32,
    /// Phase of the visual pulse, in radians
    pub pulse: f32,
}

impl EnergyPoint {
    pub fn new(position: Vec2, energy: f32, lifespan: u32) -> Self {
        Self {
            position,
            energy,
            max_energy: energy,
            age: 0,
            lifespan,
            pulse: 0.0,
        }
    }

    /// Age by one tick; energy decays linearly to zero over the lifespan
    pub fn update(&mut self, pulse_rate: f32) {
        self.age += 1;
        self.pulse += pulse_rate;
        let remaining = 1.0 - self.age as f32 / self.lifespan.max(1) as f32;
        self.energy = self.max_energy * remaining.max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.age <= self.lifespan && self.energy > 0.0
    }

    /// Nudge an agent within the attraction radius toward this point,
    /// harder the closer it is
    pub fn attract(&self, agent: &mut Agent, settings: &EnergyPointSettings) {
        let to_point = self.position - agent.position;
        let distance = to_point.length();
        if distance >= settings.attraction_radius || distance <= f32::EPSILON {
            return;
        }
        let pull = (1.0 - distance / settings.attraction_radius) * settings.attraction_strength;
        agent.velocity += to_point / distance * pull;
    }

    /// Drawn radius, shrinking with the remaining energy and pulsing over time
    pub fn radius(&self) -> f32 {
        let fill = if self.max_energy > 0.0 {
            self.energy / self.max_energy
        } else {
            0.0
        };
        3.0 + fill * 3.0 + self.pulse.sin() * 1.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Kind;
    use crate::dna::Dna;
    use lifepool_core::Entity;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn energy_decays_linearly_and_expires() {
        let mut point = EnergyPoint::new(Vec2::ZERO, 60.0, 300);
        for _ in 0..100 {
            point.update(0.1);
        }
        assert!((point.energy - 40.0).abs() < 1e-3);
        assert!(point.is_alive());

        for _ in 100..300 {
            point.update(0.1);
        }
        assert!(!point.is_alive());
    }

    #[test]
    fn attraction_only_reaches_nearby_agents() {
        let settings = EnergyPointSettings::default();
        let point = EnergyPoint::new(Vec2::new(60.0, 0.0), 30.0, 300);
        let dna = Dna::random(&mut SmallRng::seed_from_u64(0));

        let mut near = Agent::new(Entity::new(0, 0), Kind::Normal, Vec2::ZERO, Vec2::Y, dna, 100.0);
        point.attract(&mut near, &settings);
        assert!((near.velocity.x - 0.15).abs() < 1e-5);

        let mut far = Agent::new(Entity::new(1, 0), Kind::Normal, Vec2::new(-200.0, 0.0), Vec2::Y, dna, 100.0);
        point.attract(&mut far, &settings);
        assert_eq!(far.velocity, Vec2::Y);
    }
}
