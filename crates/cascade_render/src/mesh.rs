//! Shared unit-circle outline mesh

use std::f32::consts::TAU;

/// Default side count for body outlines.
pub const RING_SIDES: usize = 60;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RingVertex {
    pub position: [f32; 2],
}

/// Points on the unit circle, starting at (1, 0), with the first point
/// repeated so a line strip closes the outline, then the centre.
///
/// The final rim → centre segment is a radius spoke that shows each body's
/// rotation.
pub fn ring_mesh(sides: usize) -> Vec<RingVertex> {
    let sides = sides.max(3);
    let mut ring: Vec<RingVertex> = (0..=sides)
        .map(|i| {
            let theta = TAU * (i % sides) as f32 / sides as f32;
            RingVertex {
                position: [theta.cos(), theta.sin()],
            }
        })
        .collect();
    ring.push(RingVertex {
        position: [0.0, 0.0],
    });
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_closed_unit_circle() {
        let ring = ring_mesh(RING_SIDES);
        assert_eq!(ring.len(), RING_SIDES + 2);
        let rim = &ring[..=RING_SIDES];
        assert_eq!(rim.first(), rim.last());
        for vertex in rim {
            let [x, y] = vertex.position;
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ring_ends_with_centre_spoke() {
        let ring = ring_mesh(RING_SIDES);
        let n = ring.len();
        assert_eq!(ring[n - 2].position, [1.0, 0.0]);
        assert_eq!(ring[n - 1].position, [0.0, 0.0]);
    }

    #[test]
    fn test_degenerate_side_count_is_raised() {
        assert_eq!(ring_mesh(0).len(), 5);
    }
}
