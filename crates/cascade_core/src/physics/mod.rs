//! 2D rigid-body physics for circles and thick line segments

mod body;
mod broadphase;
mod contact;
mod shape;
mod world;

pub use body::{BodyKind, RigidBody};
pub use broadphase::{Proxy, SpatialHashGrid};
pub use contact::{circle_circle, closest_point_on_segment, segment_circle, Manifold};
pub use shape::{Aabb, Collider, Shape};
pub use world::PhysicsWorld;
