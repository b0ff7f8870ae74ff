//! Heritable traits and their mutation on reproduction.

use std::ops::RangeInclusive;

use lifepool_config::ReproductionSettings;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Heritable traits of an agent.
///
/// Unit traits (`social`, `curiosity`, the three flocking weights and
/// `aggression`) live in `[0, 1]`. `hue` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dna {
    pub size: f32,
    pub base_speed: f32,
    pub hue: f32,
    pub social: f32,
    pub curiosity: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub aggression: f32,
}

impl Dna {
    pub const SIZE_RANGE: RangeInclusive<f32> = 1.0..=20.0;
    pub const SPEED_RANGE: RangeInclusive<f32> = 0.5..=4.0;
    pub const UNIT_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    /// Fresh traits for a normal agent
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            size: rng.gen_range(2.0..5.0),
            base_speed: rng.gen_range(0.5..2.5),
            hue: rng.gen_range(0.0..360.0),
            social: rng.gen(),
            curiosity: rng.gen(),
            alignment: rng.gen(),
            cohesion: rng.gen(),
            separation: rng.gen(),
            aggression: rng.gen(),
        }
    }

    /// Traits for a predator of the given size. Predators are red, solitary
    /// and fully aggressive.
    pub fn predator<R: Rng + ?Sized>(rng: &mut R, size: f32) -> Self {
        Self {
            size,
            base_speed: 2.0,
            hue: 0.0,
            social: 0.0,
            curiosity: rng.gen_range(0.0..0.5),
            alignment: 0.0,
            cohesion: 0.0,
            separation: 0.5,
            aggression: 1.0,
        }
    }

    /// Copy of these traits with the per-generation variation applied.
    ///
    /// Size and speed scale by `1 +/- scale_mutation`, unit traits shift by
    /// `+/- trait_mutation / 2`, and the hue occasionally drifts. Every trait
    /// is clamped back into its range.
    pub fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, settings: &ReproductionSettings) -> Self {
        let scale = settings.scale_mutation.abs();
        let shift = settings.trait_mutation.abs() / 2.0;

        let mut scaled = |value: f32| value * (1.0 + rng.gen_range(-scale..=scale));
        let size = scaled(self.size);
        let base_speed = scaled(self.base_speed);

        let mut shifted = |value: f32| value + rng.gen_range(-shift..=shift);
        let mut child = Self {
            size,
            base_speed,
            hue: self.hue,
            social: shifted(self.social),
            curiosity: shifted(self.curiosity),
            alignment: shifted(self.alignment),
            cohesion: shifted(self.cohesion),
            separation: shifted(self.separation),
            aggression: shifted(self.aggression),
        };

        if rng.gen_bool(settings.color_mutation_chance.clamp(0.0, 1.0)) {
            let half = settings.hue_shift.abs() / 2.0;
            child.hue = (child.hue + rng.gen_range(-half..=half)).rem_euclid(360.0);
        }

        child.clamp();
        child
    }

    pub fn clamp(&mut self) {
        self.size = clamp_to(self.size, &Self::SIZE_RANGE);
        self.base_speed = clamp_to(self.base_speed, &Self::SPEED_RANGE);
        for unit in [
            &mut self.social,
            &mut self.curiosity,
            &mut self.alignment,
            &mut self.cohesion,
            &mut self.separation,
            &mut self.aggression,
        ] {
            *unit = clamp_to(*unit, &Self::UNIT_RANGE);
        }
        self.hue = self.hue.rem_euclid(360.0);
        // rem_euclid can round tiny negatives up to exactly 360
        if self.hue >= 360.0 {
            self.hue = 0.0;
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        Self::SIZE_RANGE.contains(&self.size)
            && Self::SPEED_RANGE.contains(&self.base_speed)
            && (0.0..360.0).contains(&self.hue)
            && [
                self.social,
                self.curiosity,
                self.alignment,
                self.cohesion,
                self.separation,
                self.aggression,
            ]
            .iter()
            .all(|unit| Self::UNIT_RANGE.contains(unit))
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}
