//! Cascade Metrics - rolling-average performance telemetry
//!
//! Each measured phase keeps a fixed 60-slot ring of elapsed-time samples.
//! Averages are recomputed from the whole ring on every read.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: enabled)
//!
//! # Usage
//!
//! ```ignore
//! use cascade_metrics::{Phase, PhaseTelemetry};
//!
//! let mut telemetry = PhaseTelemetry::new();
//! telemetry.start(Phase::Render);
//! // ... do work ...
//! telemetry.stop(Phase::Render);
//! println!("render: {:.2}us", telemetry.average_micros(Phase::Render));
//! ```
//!
//! Without the `metrics` feature, all instrumentation is compiled out to
//! zero overhead; reports still exist but read as zero.

mod report;

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod phase_timer;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod telemetry;

pub use report::{OverlaySink, Phase, TelemetryReport};

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use phase_timer::{PhaseTimer, AVERAGE_SCALE, MAX_PLAUSIBLE_NANOS, SAMPLE_WINDOW};
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use telemetry::PhaseTelemetry;

// ============================================================================
// Macros
// ============================================================================

/// Time a block under a phase (zero-cost when metrics disabled)
#[macro_export]
macro_rules! time_scope {
    ($telemetry:expr, $phase:expr, $body:block) => {{
        $telemetry.start($phase);
        let result = $body;
        $telemetry.stop($phase);
        result
    }};
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub const SAMPLE_WINDOW: usize = 60;

#[cfg(not(feature = "metrics"))]
pub struct PhaseTelemetry;

#[cfg(not(feature = "metrics"))]
impl PhaseTelemetry {
    pub fn new() -> Self { Self }
    pub fn start(&mut self, _phase: Phase) {}
    pub fn stop(&mut self, _phase: Phase) {}
    pub fn time<F, R>(&mut self, _phase: Phase, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn record_nanos(&mut self, _phase: Phase, _nanos: i64) {}
    pub fn average_micros(&self, _phase: Phase) -> f64 { 0.0 }
    pub fn report(&self, body_count: usize) -> TelemetryReport { TelemetryReport::empty(body_count) }
}

#[cfg(not(feature = "metrics"))]
impl Default for PhaseTelemetry {
    fn default() -> Self { Self }
}

#[cfg(not(feature = "metrics"))]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: usize) {}
    pub fn get(&self, _name: &'static str) -> usize { 0 }
    pub fn take(&mut self, _name: &'static str) -> usize { 0 }
}

#[cfg(not(feature = "metrics"))]
impl Default for Counter {
    fn default() -> Self { Self }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_scope_yields_block_value() {
        let mut telemetry = PhaseTelemetry::new();
        let value = time_scope!(telemetry, Phase::Simulate, { 2 + 2 });
        assert_eq!(value, 4);
    }

    #[test]
    fn test_compiles_in_either_mode() {
        let mut _telemetry = PhaseTelemetry::new();
        let mut counter = Counter::new();
        counter.increment("frames", 1);
        let report = _telemetry.report(3);
        assert_eq!(report.body_count, 3);
    }
}
