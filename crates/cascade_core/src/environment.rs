//! Environment controller: load-adaptive obstacle schedule
//!
//! A frame counter (`bump`) advances once per tick and drives three actions:
//!
//! | counter            | action                                            |
//! |--------------------|---------------------------------------------------|
//! | `insert_frame`     | attach the full group to a fresh anchor           |
//! | `degrade_frame`    | if population > threshold, swap in the reduced group |
//! | `reset_frame`      | wrap the counter back to `reset_value`            |
//!
//! With the default `reset_value` equal to `insert_frame` the full group is
//! attached only on the first cycle.

use crate::config::{EnvironmentConfig, SegmentSpec};
use crate::error::SimError;
use crate::handle::BodyHandle;
use crate::physics::{Collider, PhysicsWorld, RigidBody};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which obstacle group an anchor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupVariant {
    Full,
    Reduced,
}

/// The group currently attached to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedGroup {
    pub anchor: BodyHandle,
    pub variant: GroupVariant,
}

/// Transition performed by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    Inserted {
        anchor: BodyHandle,
        replaced: Option<BodyHandle>,
    },
    Degraded {
        removed: Option<BodyHandle>,
        anchor: BodyHandle,
    },
    Wrapped {
        bump: u32,
    },
}

pub struct EnvironmentController {
    config: EnvironmentConfig,
    bump: u32,
    attached: Option<AttachedGroup>,
}

impl EnvironmentController {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            bump: 0,
            attached: None,
        }
    }

    pub fn bump(&self) -> u32 {
        self.bump
    }

    pub fn attached(&self) -> Option<AttachedGroup> {
        self.attached
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Advance the counter by one frame and run the action it lands on.
    ///
    /// The counter is only committed when the action succeeds. On
    /// `OrphanedGeometry` nothing is attached or detached and the counter
    /// stays at its previous value.
    pub fn tick(&mut self, world: &mut PhysicsWorld) -> Result<Option<ScheduleEvent>, SimError> {
        let next = self.bump + 1;
        let mut committed = next;

        let event = if next == self.config.insert_frame {
            let replaced = self.detach(world)?;
            let anchor = self.attach(world, GroupVariant::Full);
            info!(
                bump = next,
                anchor = %anchor,
                segments = self.config.full_group.len(),
                "attached full obstacle group"
            );
            Some(ScheduleEvent::Inserted { anchor, replaced })
        } else if next == self.config.degrade_frame
            && world.len() > self.config.population_threshold
        {
            let population = world.len();
            let removed = self.detach(world)?;
            let anchor = self.attach(world, GroupVariant::Reduced);
            info!(
                bump = next,
                population,
                anchor = %anchor,
                segments = self.config.reduced_group.len(),
                "degraded obstacle group"
            );
            if self.config.restart_after_degrade {
                committed = 0;
            }
            Some(ScheduleEvent::Degraded { removed, anchor })
        } else if next == self.config.reset_frame {
            committed = self.config.reset_value;
            debug!(bump = committed, "obstacle schedule wrapped");
            Some(ScheduleEvent::Wrapped { bump: committed })
        } else {
            None
        };

        self.bump = committed;
        Ok(event)
    }

    /// Remove the current anchor, if any. Fails when the world no longer
    /// holds it.
    fn detach(&mut self, world: &mut PhysicsWorld) -> Result<Option<BodyHandle>, SimError> {
        let Some(current) = self.attached else {
            return Ok(None);
        };
        if world.remove(current.anchor).is_none() {
            return Err(SimError::OrphanedGeometry {
                anchor: current.anchor,
            });
        }
        self.attached = None;
        Ok(Some(current.anchor))
    }

    fn attach(&mut self, world: &mut PhysicsWorld, variant: GroupVariant) -> BodyHandle {
        let segments = match variant {
            GroupVariant::Full => &self.config.full_group,
            GroupVariant::Reduced => &self.config.reduced_group,
        };
        let anchor = world.insert(build_anchor(segments));
        self.attached = Some(AttachedGroup { anchor, variant });
        anchor
    }
}

/// One immovable body carrying every segment of a group.
pub fn build_anchor(segments: &[SegmentSpec]) -> RigidBody {
    segments.iter().fold(RigidBody::fixed(), |body, spec| {
        body.with_collider(Collider::segment(
            spec.a,
            spec.b,
            spec.thickness,
            spec.elasticity,
            spec.friction,
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::physics::Shape;
    use glam::Vec2;

    fn controller(threshold: usize) -> EnvironmentController {
        EnvironmentController::new(EnvironmentConfig {
            population_threshold: threshold,
            ..EnvironmentConfig::default()
        })
    }

    fn segment_count(world: &PhysicsWorld, anchor: BodyHandle) -> usize {
        world.get(anchor).map_or(0, |body| body.colliders.len())
    }

    fn run_until(env: &mut EnvironmentController, world: &mut PhysicsWorld, bump: u32) {
        while env.bump() != bump {
            env.tick(world).unwrap();
        }
    }

    #[test]
    fn test_anchor_carries_every_segment() {
        let config = EnvironmentConfig::default();
        let body = build_anchor(&config.full_group);
        assert!(!body.is_dynamic());
        assert_eq!(body.colliders.len(), 2);
        match body.colliders[1].shape {
            Shape::Segment { a, b, thickness } => {
                assert_eq!(a, Vec2::new(50.0, 900.0));
                assert_eq!(b, Vec2::new(407.0, 346.0));
                assert_eq!(thickness, 20.0);
            }
            Shape::Circle { .. } => panic!("expected a segment"),
        }
    }

    #[test]
    fn test_full_cycle_under_load() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        // Anchors alone exceed a zero threshold
        let mut env = controller(0);

        for bump in 1..60 {
            assert_eq!(env.tick(&mut world).unwrap(), None, "bump {bump}");
        }
        assert!(env.attached().is_none());

        let Some(ScheduleEvent::Inserted { anchor, replaced: None }) = env.tick(&mut world).unwrap() else {
            panic!("expected insertion at 60");
        };
        assert_eq!(env.bump(), 60);
        assert_eq!(segment_count(&world, anchor), 2);

        run_until(&mut env, &mut world, 119);
        let Some(ScheduleEvent::Degraded { removed, anchor: reduced }) = env.tick(&mut world).unwrap() else {
            panic!("expected degrade at 120");
        };
        assert_eq!(removed, Some(anchor));
        assert!(!world.contains(anchor));
        assert_eq!(segment_count(&world, reduced), 1);
        assert_eq!(world.len(), 1);
        assert_eq!(env.attached().unwrap().variant, GroupVariant::Reduced);

        run_until(&mut env, &mut world, 319);
        assert_eq!(
            env.tick(&mut world).unwrap(),
            Some(ScheduleEvent::Wrapped { bump: 60 })
        );
        assert_eq!(env.bump(), 60);

        // Second cycle skips the insertion and degrades again at 120
        for _ in 61..120 {
            assert_eq!(env.tick(&mut world).unwrap(), None);
        }
        let Some(ScheduleEvent::Degraded { removed, .. }) = env.tick(&mut world).unwrap() else {
            panic!("expected degrade on the second cycle");
        };
        assert_eq!(removed, Some(reduced));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_low_population_keeps_full_group() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut env = controller(4000);

        run_until(&mut env, &mut world, 60);
        let full = env.attached().unwrap();
        assert_eq!(full.variant, GroupVariant::Full);

        run_until(&mut env, &mut world, 119);
        assert_eq!(env.tick(&mut world).unwrap(), None);
        assert_eq!(env.attached(), Some(full));
        assert_eq!(segment_count(&world, full.anchor), 2);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_stale_anchor_is_orphaned_geometry() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut env = controller(0);
        run_until(&mut env, &mut world, 60);
        let anchor = env.attached().unwrap().anchor;

        world.remove(anchor);
        // Something else keeps the population above the threshold
        world.insert(RigidBody::fixed());
        run_until(&mut env, &mut world, 119);

        let err = env.tick(&mut world).unwrap_err();
        assert!(matches!(err, SimError::OrphanedGeometry { anchor: a } if a == anchor));
        assert!(!err.is_recoverable());
        // Transition aborted at the last committed state
        assert_eq!(env.bump(), 119);
        assert_eq!(env.attached().unwrap().anchor, anchor);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_restart_after_degrade_reinserts_full_group() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let mut env = EnvironmentController::new(EnvironmentConfig {
            population_threshold: 0,
            restart_after_degrade: true,
            ..EnvironmentConfig::default()
        });

        run_until(&mut env, &mut world, 60);
        run_until(&mut env, &mut world, 119);
        env.tick(&mut world).unwrap();
        assert_eq!(env.bump(), 0);
        let reduced = env.attached().unwrap().anchor;

        run_until(&mut env, &mut world, 59);
        let Some(ScheduleEvent::Inserted { replaced, anchor }) = env.tick(&mut world).unwrap() else {
            panic!("expected reinsertion");
        };
        assert_eq!(replaced, Some(reduced));
        assert_eq!(segment_count(&world, anchor), 2);
        assert_eq!(world.len(), 1);
    }
}
