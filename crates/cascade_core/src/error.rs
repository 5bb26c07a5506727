use crate::handle::BodyHandle;
use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// A body spec carried a non-positive (or non-finite) mass or radius.
    #[error("invalid body spec: {field} must be positive and finite, got {value}")]
    InvalidSpec { field: &'static str, value: f32 },

    /// The live population would outgrow the transform buffer.
    #[error("transform buffer exhausted: {live} live bodies, capacity {capacity}")]
    ResourceExhaustion { live: usize, capacity: usize },

    /// The environment controller tried to detach an anchor it does not own.
    #[error("orphaned geometry: static anchor {anchor} is not attached to the world")]
    OrphanedGeometry { anchor: BodyHandle },

    /// A frame was asked to advance by a non-positive or non-finite step.
    #[error("invalid time step: {dt}")]
    InvalidStep { dt: f32 },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to build transform worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl SimError {
    /// Whether the frame can continue after skipping the offending operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::InvalidSpec { .. } | SimError::ResourceExhaustion { .. }
        )
    }
}
