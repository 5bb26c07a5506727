//! Rigid bodies owned by the physics world

use super::shape::{Collider, Shape};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated under gravity and contact impulses.
    Dynamic,
    /// Infinite mass and inertia; never moves.
    Static,
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub colliders: Vec<Collider>,
}

impl RigidBody {
    /// Dynamic body with the given mass and moment of inertia.
    ///
    /// Callers validate that both are strictly positive.
    pub fn dynamic(mass: f32, moment: f32, position: Vec2) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            inv_mass: 1.0 / mass,
            inv_inertia: if moment > 0.0 { 1.0 / moment } else { 0.0 },
            colliders: Vec::new(),
        }
    }

    /// Immovable anchor at the origin.
    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            colliders: Vec::new(),
        }
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            f32::INFINITY
        }
    }

    /// Radius of the first circle collider, if the body has one.
    pub fn circle_radius(&self) -> Option<f32> {
        self.colliders.iter().find_map(|collider| match collider.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Segment { .. } => None,
        })
    }

    /// Velocity of the material point at offset `r` from the center.
    #[inline]
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.velocity + r.perp() * self.angular_velocity
    }

    /// Apply `impulse` at offset `r` from the center.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * r.perp_dot(impulse);
    }
}
