//! Cascade Core
//!
//! Contains the simulation systems behind the falling-bodies demo:
//! - 2D rigid-body physics (circles and thick segments)
//! - Body spawning and the live body list
//! - Load-adaptive obstacle schedule
//! - Parallel render transform batch
//! - Fixed-step time and configuration

pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod factory;
pub mod frame;
pub mod handle;
pub mod physics;
pub mod time;
pub mod transform;

pub use config::{
    ArenaConfig, EnvironmentConfig, PhysicsConfig, SegmentSpec, SimulationConfig, SpawnConfig,
    TransformConfig, VariantProfile,
};
pub use engine::{BodyPose, SimulationEngine};
pub use environment::{AttachedGroup, EnvironmentController, GroupVariant, ScheduleEvent};
pub use error::SimError;
pub use factory::{BodyFactory, BodySpec, BodyVariant};
pub use frame::{FrameOutput, SimulationWorld};
pub use handle::BodyHandle;
pub use time::{SimulationTime, DEFAULT_STEP_SECS};
pub use transform::{arena_projection, compute_transform, TransformBatch};

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
