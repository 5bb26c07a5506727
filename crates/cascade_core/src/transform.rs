//! Transform batch computer
//!
//! One instance matrix per live body, computed on a fixed pool of workers.
//! The body list is split into contiguous chunks and each worker owns the
//! matching slice of the output, so no locking is needed. `compute` returns
//! only after every chunk is written.

use crate::config::{ArenaConfig, TransformConfig};
use crate::engine::{pose_of, BodyPose, SimulationEngine};
use crate::error::SimError;
use crate::handle::BodyHandle;
use crate::physics::PhysicsWorld;
use glam::{Mat4, Vec3};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Screen projection for an arena of the given size, origin top-left.
pub fn arena_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

/// `projection · translate(x, H − y) · rotate(angle, −Z) · scale(r, r, 0)`
#[inline]
pub fn compute_transform(projection: &Mat4, arena_height: f32, pose: &BodyPose) -> Mat4 {
    *projection
        * Mat4::from_translation(Vec3::new(pose.position.x, arena_height - pose.position.y, 0.0))
        * Mat4::from_axis_angle(Vec3::NEG_Z, pose.angle)
        * Mat4::from_scale(Vec3::new(pose.radius, pose.radius, 0.0))
}

fn fill(out: &mut [Mat4], handles: &[BodyHandle], world: &PhysicsWorld, projection: &Mat4, height: f32) {
    for (slot, &handle) in out.iter_mut().zip(handles) {
        // Live handles always resolve; a zero matrix draws nothing.
        *slot = pose_of(world, handle)
            .map_or(Mat4::ZERO, |pose| compute_transform(projection, height, &pose));
    }
}

pub struct TransformBatch {
    pool: ThreadPool,
    workers: usize,
    capacity: usize,
    projection: Mat4,
    arena_height: f32,
    buffer: Vec<Mat4>,
}

impl TransformBatch {
    pub fn new(config: &TransformConfig, arena: &ArenaConfig) -> Result<Self, SimError> {
        let workers = config.workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("transform-{i}"))
            .build()?;
        debug!(workers, capacity = config.capacity, "transform pool ready");

        Ok(Self {
            pool,
            workers,
            capacity: config.capacity,
            projection: arena_projection(arena.width, arena.height),
            arena_height: arena.height,
            buffer: Vec::with_capacity(config.capacity),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Transforms from the last successful `compute`.
    pub fn transforms(&self) -> &[Mat4] {
        &self.buffer
    }

    /// Recompute every body's transform in parallel.
    pub fn compute(&mut self, engine: &SimulationEngine) -> Result<&[Mat4], SimError> {
        let handles = engine.bodies();
        if handles.len() > self.capacity {
            return Err(SimError::ResourceExhaustion {
                live: handles.len(),
                capacity: self.capacity,
            });
        }

        self.buffer.clear();
        self.buffer.resize(handles.len(), Mat4::ZERO);
        if handles.is_empty() {
            return Ok(&self.buffer);
        }

        let chunk = handles.len().div_ceil(self.workers);
        let world = engine.world();
        let projection = self.projection;
        let height = self.arena_height;
        let buffer = &mut self.buffer;

        self.pool.scope(|scope| {
            for (out, ids) in buffer.chunks_mut(chunk).zip(handles.chunks(chunk)) {
                scope.spawn(move |_| fill(out, ids, world, &projection, height));
            }
        });

        Ok(&self.buffer)
    }

    /// Single-threaded reference pass over the same body list.
    pub fn compute_sequential(&self, engine: &SimulationEngine) -> Result<Vec<Mat4>, SimError> {
        let handles = engine.bodies();
        if handles.len() > self.capacity {
            return Err(SimError::ResourceExhaustion {
                live: handles.len(),
                capacity: self.capacity,
            });
        }
        let mut out = vec![Mat4::ZERO; handles.len()];
        fill(&mut out, handles, engine.world(), &self.projection, self.arena_height);
        Ok(out)
    }
}
