//! The per-frame entry point
//!
//! `SimulationWorld` owns every piece of mutable simulation state and runs
//! one frame as spawn → step → environment tick → transform batch.

use crate::config::SimulationConfig;
use crate::engine::SimulationEngine;
use crate::environment::{EnvironmentController, ScheduleEvent};
use crate::error::SimError;
use crate::factory::{BodyFactory, BodyVariant};
use crate::handle::BodyHandle;
use crate::time::SimulationTime;
use crate::transform::TransformBatch;
use cascade_metrics::{time_scope, Counter, Phase, PhaseTelemetry, TelemetryReport};
use glam::Mat4;
use tracing::{debug, warn};

const SPAWNED: &str = "spawned";
const REJECTED: &str = "spawn_rejected";

/// What the renderer needs from one frame.
pub struct FrameOutput<'a> {
    pub transforms: &'a [Mat4],
    pub instance_count: usize,
    pub event: Option<ScheduleEvent>,
    /// Present on report frames.
    pub report: Option<TelemetryReport>,
}

pub struct SimulationWorld {
    config: SimulationConfig,
    engine: SimulationEngine,
    environment: EnvironmentController,
    factory: BodyFactory,
    transforms: TransformBatch,
    time: SimulationTime,
    counters: Counter,
}

impl SimulationWorld {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let factory = BodyFactory::new(&config.spawning, config.arena.height);
        Self::with_factory(config, factory)
    }

    /// Reproducible spawns for tests and benchmarks.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self, SimError> {
        let factory = BodyFactory::with_seed(&config.spawning, config.arena.height, seed);
        Self::with_factory(config, factory)
    }

    fn with_factory(config: SimulationConfig, factory: BodyFactory) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            engine: SimulationEngine::new(config.physics, &config.arena),
            environment: EnvironmentController::new(config.environment.clone()),
            transforms: TransformBatch::new(&config.transforms, &config.arena)?,
            factory,
            time: SimulationTime::new(),
            counters: Counter::new(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SimulationEngine {
        &mut self.engine
    }

    pub fn environment(&self) -> &EnvironmentController {
        &self.environment
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    /// Run one frame with the configured fixed step.
    pub fn tick(&mut self, telemetry: &mut PhaseTelemetry) -> Result<FrameOutput<'_>, SimError> {
        self.tick_with(self.config.step_secs, telemetry)
    }

    pub fn tick_with(
        &mut self,
        dt: f32,
        telemetry: &mut PhaseTelemetry,
    ) -> Result<FrameOutput<'_>, SimError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimError::InvalidStep { dt });
        }
        self.time.advance(dt);
        let frame = self.time.frame_count();

        let event = time_scope!(telemetry, Phase::Simulate, { self.simulate(frame, dt) });
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                if let SimError::OrphanedGeometry { anchor } = &err {
                    tracing::error!(frame, anchor = %anchor, "obstacle schedule lost its anchor");
                }
                return Err(err);
            }
        };

        let report = (frame % u64::from(self.config.report_interval) == 0).then(|| {
            let rejected = self.counters.take(REJECTED);
            if rejected > 0 {
                warn!(rejected, "spawns rejected since last report");
            }
            let report = telemetry.report(self.engine.len());
            report.log();
            report
        });

        let engine = &self.engine;
        let transforms = &mut self.transforms;
        let transforms = time_scope!(telemetry, Phase::TransformBatch, {
            transforms.compute(engine)
        })?;

        Ok(FrameOutput {
            instance_count: transforms.len(),
            transforms,
            event,
            report,
        })
    }

    fn simulate(&mut self, frame: u64, dt: f32) -> Result<Option<ScheduleEvent>, SimError> {
        self.spawn_frame(frame)?;
        self.engine.step(dt);
        self.environment.tick(self.engine.world_mut())
    }

    /// Spawn this frame's small bodies, plus a big one on its interval.
    fn spawn_frame(&mut self, frame: u64) -> Result<(), SimError> {
        for _ in 0..self.config.spawning.small_per_frame {
            self.spawn_one(BodyVariant::Small)?;
        }
        if frame % u64::from(self.config.spawning.big_interval) == 0 {
            self.spawn_one(BodyVariant::Big)?;
        }
        Ok(())
    }

    /// Recoverable failures skip the spawn; anything else propagates.
    fn spawn_one(&mut self, variant: BodyVariant) -> Result<Option<BodyHandle>, SimError> {
        match self.try_spawn(variant) {
            Ok(handle) => {
                self.counters.increment(SPAWNED, 1);
                Ok(Some(handle))
            }
            Err(err) if err.is_recoverable() => {
                debug!(?variant, error = %err, "spawn skipped");
                self.counters.increment(REJECTED, 1);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn try_spawn(&mut self, variant: BodyVariant) -> Result<BodyHandle, SimError> {
        let capacity = self.transforms.capacity();
        if self.engine.len() >= capacity {
            return Err(SimError::ResourceExhaustion {
                live: self.engine.len() + 1,
                capacity,
            });
        }
        let spec = self.factory.spawn(variant);
        self.engine.add_body(&spec)
    }

    pub fn spawned_total(&self) -> usize {
        self.counters.get(SPAWNED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::GroupVariant;

    fn world(config: SimulationConfig) -> SimulationWorld {
        SimulationWorld::with_seed(config, 7).unwrap()
    }

    #[test]
    fn test_transform_count_tracks_live_bodies() {
        let mut world = world(SimulationConfig::default());
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..400 {
            let output = world.tick(&mut telemetry).unwrap();
            assert_eq!(output.transforms.len(), output.instance_count);
            let live = output.instance_count;
            assert_eq!(live, world.engine().len());
        }
        let threshold = world.engine().exit_threshold();
        for &handle in world.engine().bodies() {
            assert!(world.engine().pose(handle).unwrap().position.y >= threshold);
        }
    }

    #[test]
    fn test_spawn_cadence() {
        let mut config = SimulationConfig::default();
        config.spawning.big_interval = 3;
        let mut world = world(config);
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..3 {
            world.tick(&mut telemetry).unwrap();
        }
        // Two small per frame, one big on frame 3
        assert_eq!(world.engine().len(), 7);
    }

    #[test]
    fn test_spawns_clamp_to_capacity() {
        let mut config = SimulationConfig::default();
        config.transforms.capacity = 5;
        // Keep everything in the arena for the duration of the test
        config.physics.gravity = glam::Vec2::ZERO;
        let mut world = world(config);
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..10 {
            let output = world.tick(&mut telemetry).unwrap();
            assert!(output.instance_count <= 5);
        }
        assert_eq!(world.engine().len(), 5);
    }

    #[test]
    fn test_report_on_interval() {
        let mut config = SimulationConfig::default();
        config.report_interval = 4;
        let mut world = world(config);
        let mut telemetry = PhaseTelemetry::new();
        for frame in 1..=8u64 {
            let output = world.tick(&mut telemetry).unwrap();
            assert_eq!(output.report.is_some(), frame % 4 == 0, "frame {frame}");
        }
    }

    #[test]
    fn test_obstacles_attach_at_insert_frame() {
        let mut world = world(SimulationConfig::default());
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..59 {
            world.tick(&mut telemetry).unwrap();
        }
        assert!(world.environment().attached().is_none());
        let output = world.tick(&mut telemetry).unwrap();
        assert!(matches!(output.event, Some(ScheduleEvent::Inserted { .. })));
        assert_eq!(
            world.environment().attached().map(|group| group.variant),
            Some(GroupVariant::Full)
        );
    }

    #[test]
    fn test_orphaned_anchor_aborts_frame() {
        let mut config = SimulationConfig::default();
        config.environment.population_threshold = 0;
        let mut world = world(config);
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..60 {
            world.tick(&mut telemetry).unwrap();
        }
        let anchor = world.environment().attached().unwrap().anchor;
        world.engine_mut().world_mut().remove(anchor);

        let mut result = Ok(());
        for _ in 60..120 {
            if let Err(err) = world.tick(&mut telemetry) {
                result = Err(err);
                break;
            }
        }
        assert!(matches!(result, Err(SimError::OrphanedGeometry { .. })));
    }

    #[test]
    fn test_bad_step_is_rejected_without_side_effects() {
        let mut world = world(SimulationConfig::default());
        let mut telemetry = PhaseTelemetry::new();
        for dt in [-1.0 / 240.0, 0.0, f32::NAN, f32::INFINITY] {
            let err = world.tick_with(dt, &mut telemetry).err();
            assert!(matches!(err, Some(SimError::InvalidStep { .. })), "dt = {dt}");
            assert!(!err.unwrap().is_recoverable());
        }
        assert_eq!(world.time().frame_count(), 0);
        assert!(world.engine().is_empty());
        assert_eq!(world.time().simulated(), std::time::Duration::ZERO);
    }

    #[test]
    fn test_same_seed_reproduces_trajectories() {
        let mut a = world(SimulationConfig::default());
        let mut b = world(SimulationConfig::default());
        let mut telemetry = PhaseTelemetry::new();
        // Long enough for obstacles, pile-ups and culling
        for _ in 0..400 {
            a.tick(&mut telemetry).unwrap();
            b.tick(&mut telemetry).unwrap();
        }
        assert_eq!(a.engine().len(), b.engine().len());
        for (&ha, &hb) in a.engine().bodies().iter().zip(b.engine().bodies()) {
            assert_eq!(a.engine().pose(ha), b.engine().pose(hb));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.transforms.workers = 0;
        assert!(matches!(
            SimulationWorld::new(config),
            Err(SimError::InvalidConfig { .. })
        ));
    }
}
