//! Narrowphase contact generation and the sequential-impulse solver

use super::body::RigidBody;
use glam::Vec2;

/// Geometry of a single touching point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from the first shape toward the second.
    pub normal: Vec2,
    pub point: Vec2,
    /// Positive when overlapping.
    pub depth: f32,
}

/// Circle vs circle test.
pub fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> Option<Manifold> {
    let delta = center_b - center_a;
    let dist_sq = delta.length_squared();
    let sum_r = radius_a + radius_b;
    if dist_sq >= sum_r * sum_r {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
    let depth = sum_r - dist;
    Some(Manifold {
        normal,
        point: center_a + normal * (radius_a - 0.5 * depth),
        depth,
    })
}

/// Thick segment vs circle test. The normal points from the segment toward
/// the circle.
pub fn segment_circle(a: Vec2, b: Vec2, thickness: f32, center: Vec2, radius: f32) -> Option<Manifold> {
    let closest = closest_point_on_segment(a, b, center);
    let delta = center - closest;
    let dist_sq = delta.length_squared();
    let sum_r = thickness + radius;
    if dist_sq >= sum_r * sum_r {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        // Circle center sits on the segment: use the edge normal
        (b - a).perp().normalize_or(Vec2::Y)
    };
    let depth = sum_r - dist;
    Some(Manifold {
        normal,
        point: closest + normal * (thickness - 0.5 * depth),
        depth,
    })
}

/// Closest point on segment `ab` to `p`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Tuning shared by every contact in a step.
#[derive(Debug, Clone, Copy)]
pub struct SolverParams {
    pub dt: f32,
    /// Fraction of penetration corrected per step.
    pub bias_factor: f32,
    /// Penetration tolerated before correction kicks in.
    pub slop: f32,
    /// Closing speeds below this do not bounce.
    pub restitution_threshold: f32,
}

/// Contact constraint between two body slots.
#[derive(Debug, Clone)]
pub struct Contact {
    pub body_a: u32,
    pub body_b: u32,
    pub manifold: Manifold,
    pub elasticity: f32,
    pub friction: f32,
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    bias: f32,
    bounce: f32,
    jn_acc: f32,
    jt_acc: f32,
}

impl Contact {
    pub fn new(body_a: u32, body_b: u32, manifold: Manifold, elasticity: f32, friction: f32) -> Self {
        Self {
            body_a,
            body_b,
            manifold,
            elasticity,
            friction,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            normal_mass: 0.0,
            tangent_mass: 0.0,
            bias: 0.0,
            bounce: 0.0,
            jn_acc: 0.0,
            jt_acc: 0.0,
        }
    }

    /// Cache effective masses and velocity targets before iterating.
    pub fn prepare(&mut self, a: &RigidBody, b: &RigidBody, params: &SolverParams) {
        let n = self.manifold.normal;
        let t = n.perp();
        self.r_a = self.manifold.point - a.position;
        self.r_b = self.manifold.point - b.position;

        let rn_a = self.r_a.perp_dot(n);
        let rn_b = self.r_b.perp_dot(n);
        let kn = a.inv_mass + b.inv_mass + a.inv_inertia * rn_a * rn_a + b.inv_inertia * rn_b * rn_b;
        self.normal_mass = if kn > 0.0 { 1.0 / kn } else { 0.0 };

        let rt_a = self.r_a.perp_dot(t);
        let rt_b = self.r_b.perp_dot(t);
        let kt = a.inv_mass + b.inv_mass + a.inv_inertia * rt_a * rt_a + b.inv_inertia * rt_b * rt_b;
        self.tangent_mass = if kt > 0.0 { 1.0 / kt } else { 0.0 };

        self.bias = params.bias_factor / params.dt * (self.manifold.depth - params.slop).max(0.0);

        let vn = (b.velocity_at(self.r_b) - a.velocity_at(self.r_a)).dot(n);
        self.bounce = if vn < -params.restitution_threshold {
            -self.elasticity * vn
        } else {
            0.0
        };
        self.jn_acc = 0.0;
        self.jt_acc = 0.0;
    }

    /// One solver pass over this contact.
    pub fn apply(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let n = self.manifold.normal;
        let t = n.perp();

        let vr = b.velocity_at(self.r_b) - a.velocity_at(self.r_a);
        let target = self.bias.max(self.bounce);
        let jn = self.normal_mass * (target - vr.dot(n));
        let jn_new = (self.jn_acc + jn).max(0.0);
        let jn = jn_new - self.jn_acc;
        self.jn_acc = jn_new;

        let vr = b.velocity_at(self.r_b) - a.velocity_at(self.r_a);
        let jt_max = self.friction * self.jn_acc;
        let jt = -self.tangent_mass * vr.dot(t);
        let jt_new = (self.jt_acc + jt).clamp(-jt_max, jt_max);
        let jt = jt_new - self.jt_acc;
        self.jt_acc = jt_new;

        let impulse = n * jn + t * jt;
        a.apply_impulse(-impulse, self.r_a);
        b.apply_impulse(impulse, self.r_b);
    }

    pub fn normal_impulse(&self) -> f32 {
        self.jn_acc
    }
}

/// Borrow two distinct elements of a slice mutably.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "contact between a body and itself");
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_depth_and_normal() {
        let m = circle_circle(Vec2::ZERO, 2.0, Vec2::new(3.0, 0.0), 2.0).unwrap();
        assert_eq!(m.normal, Vec2::X);
        assert_eq!(m.depth, 1.0);
        assert_eq!(m.point, Vec2::new(1.5, 0.0));
        assert!(circle_circle(Vec2::ZERO, 1.0, Vec2::new(3.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_segment_circle_uses_thickness() {
        let a = Vec2::new(-10.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let m = segment_circle(a, b, 2.0, Vec2::new(0.0, 4.0), 3.0).unwrap();
        assert_eq!(m.normal, Vec2::Y);
        assert_eq!(m.depth, 1.0);
        assert!(segment_circle(a, b, 2.0, Vec2::new(0.0, 6.0), 3.0).is_none());
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(4.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(-3.0, 1.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(9.0, 1.0)), b);
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(2.0, 5.0)), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_contact_stops_approach() {
        let params = SolverParams {
            dt: 1.0 / 240.0,
            bias_factor: 0.0,
            slop: 0.0,
            restitution_threshold: 1.0,
        };
        let mut ground = RigidBody::fixed();
        let mut ball = RigidBody::dynamic(1.0, 1.0, Vec2::new(0.0, 1.0));
        ball.velocity = Vec2::new(0.0, -10.0);
        let manifold = Manifold {
            normal: Vec2::Y,
            point: Vec2::ZERO,
            depth: 0.0,
        };
        let mut contact = Contact::new(0, 1, manifold, 0.0, 0.0);
        contact.prepare(&ground, &ball, &params);
        contact.apply(&mut ground, &mut ball);
        assert!(ball.velocity.y.abs() < 1e-4);
        assert!(contact.normal_impulse() > 0.0);
        assert_eq!(ground.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut items = [1, 2, 3];
        let (a, b) = pair_mut(&mut items, 2, 0);
        *a += 10;
        *b += 20;
        assert_eq!(items, [21, 2, 13]);
    }
}
