//! Spawn parameters for the two body variants

use crate::config::{SpawnConfig, VariantProfile};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyVariant {
    Small,
    Big,
}

/// Everything needed to construct one dynamic circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub radius: f32,
    pub mass: f32,
    pub elasticity: f32,
    pub friction: f32,
    pub position: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
}

/// Draws body specs from a seedable uniform generator.
pub struct BodyFactory {
    rng: Pcg32,
    spawn_y: f32,
    mass_scale: f32,
    small: VariantProfile,
    big: VariantProfile,
}

impl BodyFactory {
    /// `spawn_y` is the arena top: every body starts there.
    pub fn new(config: &SpawnConfig, spawn_y: f32) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, spawn_y, seed)
    }

    pub fn with_seed(config: &SpawnConfig, spawn_y: f32, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            spawn_y,
            mass_scale: config.mass_scale,
            small: config.small,
            big: config.big,
        }
    }

    pub fn profile(&self, variant: BodyVariant) -> &VariantProfile {
        match variant {
            BodyVariant::Small => &self.small,
            BodyVariant::Big => &self.big,
        }
    }

    pub fn spawn(&mut self, variant: BodyVariant) -> BodySpec {
        let profile = *self.profile(variant);
        let radius = self.rng.random_range(profile.radius_min..=profile.radius_max);
        let x = self.rng.random_range(profile.spawn_x_min..=profile.spawn_x_max);
        let angle = self.rng.random_range(0.0..TAU);
        let angular_velocity = if profile.max_spin > 0.0 {
            self.rng.random_range(-profile.max_spin..=profile.max_spin)
        } else {
            0.0
        };

        BodySpec {
            radius,
            mass: self.mass_scale * radius * radius * PI * profile.density,
            elasticity: profile.elasticity,
            friction: profile.friction,
            position: Vec2::new(x, self.spawn_y),
            angle,
            angular_velocity,
        }
    }
}
