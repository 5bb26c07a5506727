//! Rolling-average timer for a single measured phase

use super::ring_buffer::RingBuffer;
use std::time::Instant;
use tracing::warn;

/// Number of samples kept per phase.
pub const SAMPLE_WINDOW: usize = 60;

/// Divisor applied to the summed nanoseconds of the window.
///
/// Sixty slots times 1000 ns/µs, so `average_micros` reads in microseconds.
pub const AVERAGE_SCALE: f64 = 60_000.0;

/// Samples above this are treated as clock glitches rather than real work.
pub const MAX_PLAUSIBLE_NANOS: i64 = 10_000_000_000;

pub struct PhaseTimer {
    started: Option<Instant>,
    samples: RingBuffer<u64>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self {
            started: None,
            samples: RingBuffer::new(SAMPLE_WINDOW),
        }
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Close the interval opened by `start`. A `stop` with no matching
    /// `start` records nothing.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            let elapsed = started.elapsed().as_nanos();
            self.record_nanos(i64::try_from(elapsed).unwrap_or(i64::MAX));
        }
    }

    /// Write one sample into the next slot.
    ///
    /// Negative or implausibly large samples are clamped to zero.
    pub fn record_nanos(&mut self, nanos: i64) {
        let sample = if (0..=MAX_PLAUSIBLE_NANOS).contains(&nanos) {
            nanos as u64
        } else {
            warn!(sample_ns = nanos, "timing overflow, clamping sample to zero");
            0
        };
        self.samples.push(sample);
    }

    pub fn average_micros(&self) -> f64 {
        self.samples.total() as f64 / AVERAGE_SCALE
    }

    pub fn average_ms(&self) -> f64 {
        self.average_micros() / 1000.0
    }

    pub fn samples(&self) -> &RingBuffer<u64> {
        &self.samples
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}
