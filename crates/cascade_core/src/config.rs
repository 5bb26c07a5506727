//! Simulation configuration
//!
//! Every tunable lives here so hosts can load it from a settings file.
//! `Default` reproduces the stock behaviour.

use crate::error::SimError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub physics: PhysicsConfig,
    pub spawning: SpawnConfig,
    pub environment: EnvironmentConfig,
    pub transforms: TransformConfig,
    /// Fixed physics step per frame, in seconds.
    pub step_secs: f32,
    /// Frames between performance reports.
    pub report_interval: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            physics: PhysicsConfig::default(),
            spawning: SpawnConfig::default(),
            environment: EnvironmentConfig::default(),
            transforms: TransformConfig::default(),
            step_secs: crate::time::DEFAULT_STEP_SECS,
            report_interval: 60,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the frame loop cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |reason: String| Err(SimError::InvalidConfig { reason });

        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return invalid(format!(
                "arena must have positive size, got {}x{}",
                self.arena.width, self.arena.height
            ));
        }
        if !(self.step_secs > 0.0) {
            return invalid(format!("step must be positive, got {}", self.step_secs));
        }
        if self.report_interval == 0 {
            return invalid("report interval must be at least one frame".into());
        }
        if !(self.physics.cell_size > 0.0) {
            return invalid(format!("cell size must be positive, got {}", self.physics.cell_size));
        }
        if self.transforms.workers == 0 || self.transforms.capacity == 0 {
            return invalid("transform batch needs at least one worker and one slot".into());
        }
        if self.spawning.big_interval == 0 {
            return invalid("big body interval must be at least one frame".into());
        }
        for (name, profile) in [("small", &self.spawning.small), ("big", &self.spawning.big)] {
            if !(profile.radius_min > 0.0 && profile.radius_min <= profile.radius_max) {
                return invalid(format!("{name} radius range is empty or non-positive"));
            }
            if profile.spawn_x_min > profile.spawn_x_max {
                return invalid(format!("{name} spawn range is empty"));
            }
            if profile.max_spin < 0.0 {
                return invalid(format!("{name} spin bound is negative"));
            }
        }
        let env = &self.environment;
        if !(env.insert_frame < env.degrade_frame && env.degrade_frame < env.reset_frame) {
            return invalid("schedule frames must satisfy insert < degrade < reset".into());
        }
        if env.reset_value >= env.reset_frame {
            return invalid("schedule reset value must precede the reset frame".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Bodies whose center drops below this are culled.
    pub exit_threshold: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            exit_threshold: -100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    /// Solver passes per step. More passes stiffen stacks and cost CPU per contact.
    pub iterations: usize,
    /// Broadphase grid cell edge, in world units.
    pub cell_size: f32,
    pub bias_factor: f32,
    pub slop: f32,
    pub restitution_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -900.0),
            iterations: 8,
            cell_size: 16.0,
            bias_factor: 0.2,
            slop: 0.5,
            restitution_threshold: 20.0,
        }
    }
}

/// Parameter ranges for one body variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VariantProfile {
    pub radius_min: f32,
    pub radius_max: f32,
    /// Multiplier in `mass = k * r^2 * pi * density`.
    pub density: f32,
    pub elasticity: f32,
    pub friction: f32,
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    /// Initial angular velocity is drawn from `[-max_spin, max_spin]`.
    pub max_spin: f32,
}

impl VariantProfile {
    pub fn small() -> Self {
        Self {
            radius_min: 2.0,
            radius_max: 5.0,
            density: 0.8,
            elasticity: 0.6,
            friction: 0.9,
            spawn_x_min: 200.0,
            spawn_x_max: 250.0,
            max_spin: 0.0,
        }
    }

    pub fn big() -> Self {
        Self {
            radius_min: 5.0,
            radius_max: 85.0,
            density: 0.3,
            elasticity: 0.7,
            friction: 0.9,
            spawn_x_min: 300.0,
            spawn_x_max: 450.0,
            max_spin: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    pub small_per_frame: usize,
    /// One big body every this many frames.
    pub big_interval: u32,
    /// The `k` in the mass formula.
    pub mass_scale: f32,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub small: VariantProfile,
    pub big: VariantProfile,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            small_per_frame: 2,
            big_interval: 240,
            mass_scale: 1.0,
            seed: None,
            small: VariantProfile::small(),
            big: VariantProfile::big(),
        }
    }
}

/// One obstacle line segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SegmentSpec {
    pub a: Vec2,
    pub b: Vec2,
    pub thickness: f32,
    pub elasticity: f32,
    #[serde(default)]
    pub friction: f32,
}

impl SegmentSpec {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            a,
            b,
            thickness: 20.0,
            elasticity: 0.6,
            friction: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Counter value at which the full group is attached.
    pub insert_frame: u32,
    /// Counter value at which the group may be degraded.
    pub degrade_frame: u32,
    /// Counter value that wraps the schedule.
    pub reset_frame: u32,
    /// Counter value after wrapping.
    pub reset_value: u32,
    /// Degrade only when the world holds more bodies than this.
    pub population_threshold: usize,
    pub full_group: Vec<SegmentSpec>,
    pub reduced_group: Vec<SegmentSpec>,
    /// Restart the counter at zero after a degrade so the full group returns
    /// on the next insert frame.
    pub restart_after_degrade: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let slope_a = SegmentSpec::new(Vec2::new(390.0, 100.0), Vec2::new(1100.0, 400.0));
        let slope_b = SegmentSpec::new(Vec2::new(50.0, 900.0), Vec2::new(407.0, 346.0));
        Self {
            insert_frame: 60,
            degrade_frame: 120,
            reset_frame: 320,
            reset_value: 60,
            population_threshold: 4000,
            full_group: vec![slope_a, slope_b],
            reduced_group: vec![slope_a],
            restart_after_degrade: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransformConfig {
    /// Fixed fan-out of the transform pass.
    pub workers: usize,
    /// Maximum number of instance transforms per frame.
    pub capacity: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            capacity: 8000,
        }
    }
}
