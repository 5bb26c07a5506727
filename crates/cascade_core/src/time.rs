//! Fixed-step simulation clock
//!
//! One physics step per rendered frame at 240 Hz of simulated time.

use std::time::Duration;

/// Default simulated seconds per frame.
pub const DEFAULT_STEP_SECS: f32 = 1.0 / 240.0;

/// Simulation time tracker
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationTime {
    frame_count: u64,
    simulated_secs: f64,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn advance(&mut self, dt: f32) {
        self.frame_count += 1;
        self.simulated_secs += f64::from(dt);
    }

    /// Zero when the accumulated time is not representable.
    pub fn simulated(&self) -> Duration {
        Duration::try_from_secs_f64(self.simulated_secs).unwrap_or_default()
    }
}
