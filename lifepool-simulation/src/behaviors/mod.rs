//! Steering behaviors and pairwise interactions.
//!
//! Steering functions take the agent being updated mutably and a
//! [`WorldView`](crate::spatial::WorldView) of everyone else. Interactions
//! (`combat`, `eating`) take both parties mutably and are driven by the world
//! when two bodies touch.

pub mod combat;
pub mod eating;
pub mod evasion;
pub mod flocking;
pub mod following;
pub mod predation;

use glam::Vec2;

/// Rotate `heading` toward `desired` by at most `max_turn` radians
pub fn turn_towards(heading: Vec2, desired: Vec2, max_turn: f32) -> Vec2 {
    let Some(desired) = desired.try_normalize() else {
        return heading;
    };
    let current = heading.y.atan2(heading.x);
    let target = desired.y.atan2(desired.x);

    let mut delta = target - current;
    while delta > std::f32::consts::PI {
        delta -= std::f32::consts::TAU;
    }
    while delta < -std::f32::consts::PI {
        delta += std::f32::consts::TAU;
    }

    let angle = current + delta.clamp(-max_turn, max_turn);
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turning_is_rate_limited() {
        let turned = turn_towards(Vec2::X, Vec2::Y, 0.1);
        assert!((turned.y.atan2(turned.x) - 0.1).abs() < 1e-5);

        let direct = turn_towards(Vec2::X, Vec2::new(1.0, 0.05), 0.1);
        assert!((direct.y.atan2(direct.x) - 0.05f32.atan()).abs() < 1e-5);
    }

    #[test]
    fn turning_takes_the_short_way_round() {
        let heading = Vec2::new(-1.0, 0.01);
        let turned = turn_towards(heading, Vec2::new(-1.0, -0.01), 0.5);
        assert!(turned.x < -0.99);
    }
}
