//! Simulation engine: owns the live body list and the physics world

use crate::config::{ArenaConfig, PhysicsConfig};
use crate::error::SimError;
use crate::factory::BodySpec;
use crate::handle::BodyHandle;
use crate::physics::{Collider, PhysicsWorld, RigidBody, Shape};
use glam::Vec2;
use tracing::trace;

/// Render-relevant state of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec2,
    pub angle: f32,
    pub radius: f32,
}

pub struct SimulationEngine {
    world: PhysicsWorld,
    /// Live dynamic bodies in insertion order.
    bodies: Vec<BodyHandle>,
    exit_threshold: f32,
    culled_last_step: usize,
}

impl SimulationEngine {
    pub fn new(physics: PhysicsConfig, arena: &ArenaConfig) -> Self {
        Self {
            world: PhysicsWorld::new(physics),
            bodies: Vec::new(),
            exit_threshold: arena.exit_threshold,
            culled_last_step: 0,
        }
    }

    /// Build a dynamic circle from `spec` and insert it into the world and
    /// the live list.
    pub fn add_body(&mut self, spec: &BodySpec) -> Result<BodyHandle, SimError> {
        check_positive("radius", spec.radius)?;
        check_positive("mass", spec.mass)?;

        let shape = Shape::Circle { radius: spec.radius };
        let body = RigidBody::dynamic(spec.mass, shape.moment(spec.mass), spec.position)
            .with_angle(spec.angle)
            .with_angular_velocity(spec.angular_velocity)
            .with_collider(Collider {
                shape,
                elasticity: spec.elasticity,
                friction: spec.friction,
            });

        let handle = self.world.insert(body);
        self.bodies.push(handle);
        Ok(handle)
    }

    /// Advance the world by `dt`, then cull every body below the exit threshold.
    pub fn step(&mut self, dt: f32) {
        self.world.step(dt);

        // Single compaction pass: survivors keep their relative order and no
        // body is skipped when its predecessor is removed.
        let threshold = self.exit_threshold;
        let world = &mut self.world;
        let before = self.bodies.len();
        self.bodies.retain(|&handle| {
            let below = world
                .get(handle)
                .map_or(true, |body| body.position.y < threshold);
            if below {
                world.remove(handle);
            }
            !below
        });
        self.culled_last_step = before - self.bodies.len();
        if self.culled_last_step > 0 {
            trace!(
                culled = self.culled_last_step,
                live = self.bodies.len(),
                contacts = self.world.contact_count(),
                "culled exited bodies"
            );
        }
    }

    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Live dynamic body count.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn culled_last_step(&self) -> usize {
        self.culled_last_step
    }

    pub fn exit_threshold(&self) -> f32 {
        self.exit_threshold
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        pose_of(&self.world, handle)
    }
}

pub(crate) fn pose_of(world: &PhysicsWorld, handle: BodyHandle) -> Option<BodyPose> {
    let body = world.get(handle)?;
    Some(BodyPose {
        position: body.position,
        angle: body.angle,
        radius: body.circle_radius().unwrap_or(0.0),
    })
}

fn check_positive(field: &'static str, value: f32) -> Result<(), SimError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidSpec { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_at(x: f32, y: f32) -> BodySpec {
        BodySpec {
            radius: 3.0,
            mass: 10.0,
            elasticity: 0.6,
            friction: 0.9,
            position: Vec2::new(x, y),
            angle: 0.25,
            angular_velocity: 1.5,
        }
    }

    fn engine() -> SimulationEngine {
        SimulationEngine::new(PhysicsConfig::default(), &ArenaConfig::default())
    }

    #[test]
    fn test_add_body_inserts_into_world_and_list() {
        let mut engine = engine();
        let handle = engine.add_body(&spec_at(10.0, 20.0)).unwrap();
        assert_eq!(engine.bodies(), &[handle]);
        assert_eq!(engine.world().len(), 1);

        let pose = engine.pose(handle).unwrap();
        assert_eq!(pose.position, Vec2::new(10.0, 20.0));
        assert_eq!(pose.angle, 0.25);
        assert_eq!(pose.radius, 3.0);
        assert_eq!(engine.world().get(handle).unwrap().angular_velocity, 1.5);
    }

    #[test]
    fn test_invalid_spec_is_not_inserted() {
        let mut engine = engine();
        for (radius, mass) in [(0.0, 1.0), (-2.0, 1.0), (1.0, 0.0), (1.0, -5.0), (f32::NAN, 1.0)] {
            let mut spec = spec_at(0.0, 0.0);
            spec.radius = radius;
            spec.mass = mass;
            let err = engine.add_body(&spec).unwrap_err();
            assert!(matches!(err, SimError::InvalidSpec { .. }));
            assert!(err.is_recoverable());
        }
        assert!(engine.is_empty());
        assert!(engine.world().is_empty());
    }

    #[test]
    fn test_step_culls_consecutive_exits() {
        let mut engine = engine();
        let keep_a = engine.add_body(&spec_at(0.0, 400.0)).unwrap();
        // Three adjacent bodies well below the threshold
        for x in [100.0, 200.0, 300.0] {
            engine.add_body(&spec_at(x, -500.0)).unwrap();
        }
        let keep_b = engine.add_body(&spec_at(600.0, 400.0)).unwrap();
        engine.add_body(&spec_at(700.0, -300.0)).unwrap();

        engine.step(1.0 / 240.0);

        assert_eq!(engine.bodies(), &[keep_a, keep_b]);
        assert_eq!(engine.culled_last_step(), 4);
        assert_eq!(engine.world().len(), 2);
        for &handle in engine.bodies() {
            assert!(engine.pose(handle).unwrap().position.y >= engine.exit_threshold());
        }
    }

    #[test]
    fn test_culled_slots_are_reused() {
        let mut engine = engine();
        let gone = engine.add_body(&spec_at(0.0, -1000.0)).unwrap();
        engine.step(1.0 / 240.0);
        assert!(engine.pose(gone).is_none());

        let fresh = engine.add_body(&spec_at(0.0, 100.0)).unwrap();
        assert_eq!(fresh.index(), gone.index());
        assert!(engine.pose(gone).is_none());
    }

    #[test]
    fn test_bodies_fall_out_eventually() {
        let mut engine = engine();
        engine.add_body(&spec_at(0.0, 0.0)).unwrap();
        for _ in 0..240 {
            engine.step(1.0 / 240.0);
        }
        assert!(engine.is_empty());
    }
}
