//! Collision shapes and axis-aligned bounds

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape in body-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Circle centered on the body origin.
    Circle { radius: f32 },
    /// Line segment swept by `thickness` (a capsule).
    Segment { a: Vec2, b: Vec2, thickness: f32 },
}

impl Shape {
    /// Bounds of the shape placed at `position`, rotated by `angle`.
    pub fn aabb(&self, position: Vec2, angle: f32) -> Aabb {
        match *self {
            Shape::Circle { radius } => Aabb::around(position, radius),
            Shape::Segment { a, b, thickness } => {
                let rot = Vec2::from_angle(angle);
                let wa = position + rot.rotate(a);
                let wb = position + rot.rotate(b);
                Aabb {
                    min: wa.min(wb) - Vec2::splat(thickness),
                    max: wa.max(wb) + Vec2::splat(thickness),
                }
            }
        }
    }

    /// Moment of inertia for `mass` spread over the shape.
    pub fn moment(&self, mass: f32) -> f32 {
        match *self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Segment { a, b, .. } => {
                let offset = (a + b) * 0.5;
                mass * (a.distance_squared(b) / 12.0 + offset.length_squared())
            }
        }
    }
}

/// Material and geometry attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub elasticity: f32,
    pub friction: f32,
}

impl Collider {
    pub fn circle(radius: f32, elasticity: f32, friction: f32) -> Self {
        Self {
            shape: Shape::Circle { radius },
            elasticity,
            friction,
        }
    }

    pub fn segment(a: Vec2, b: Vec2, thickness: f32, elasticity: f32, friction: f32) -> Self {
        Self {
            shape: Shape::Segment { a, b, thickness },
            elasticity,
            friction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        Self {
            min: center - Vec2::splat(half_extent),
            max: center + Vec2::splat(half_extent),
        }
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_moment() {
        let shape = Shape::Circle { radius: 2.0 };
        assert_eq!(shape.moment(3.0), 6.0);
    }

    #[test]
    fn test_segment_aabb_includes_thickness() {
        let shape = Shape::Segment {
            a: Vec2::new(0.0, 0.0),
            b: Vec2::new(10.0, 5.0),
            thickness: 2.0,
        };
        let aabb = shape.aabb(Vec2::ZERO, 0.0);
        assert_eq!(aabb.min, Vec2::new(-2.0, -2.0));
        assert_eq!(aabb.max, Vec2::new(12.0, 7.0));
    }

    #[test]
    fn test_aabb_overlap_touching() {
        let a = Aabb::around(Vec2::ZERO, 1.0);
        let b = Aabb::around(Vec2::new(2.0, 0.0), 1.0);
        let c = Aabb::around(Vec2::new(2.5, 0.0), 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
