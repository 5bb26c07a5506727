//! Per-phase timers owned by the main loop

use super::phase_timer::PhaseTimer;
use super::report::{Phase, TelemetryReport};

/// One `PhaseTimer` per `Phase`, accumulated on a single thread.
pub struct PhaseTelemetry {
    timers: [PhaseTimer; Phase::COUNT],
}

impl PhaseTelemetry {
    pub fn new() -> Self {
        Self {
            timers: std::array::from_fn(|_| PhaseTimer::new()),
        }
    }

    pub fn start(&mut self, phase: Phase) {
        self.timers[phase.index()].start();
    }

    pub fn stop(&mut self, phase: Phase) {
        self.timers[phase.index()].stop();
    }

    /// Time a closure under `phase`.
    pub fn time<F, R>(&mut self, phase: Phase, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.start(phase);
        let result = f();
        self.stop(phase);
        result
    }

    pub fn record_nanos(&mut self, phase: Phase, nanos: i64) {
        self.timers[phase.index()].record_nanos(nanos);
    }

    pub fn average_micros(&self, phase: Phase) -> f64 {
        self.timers[phase.index()].average_micros()
    }

    pub fn timer(&self, phase: Phase) -> &PhaseTimer {
        &self.timers[phase.index()]
    }

    pub fn report(&self, body_count: usize) -> TelemetryReport {
        TelemetryReport {
            body_count,
            averages_us: std::array::from_fn(|i| self.timers[i].average_micros()),
        }
    }
}

impl Default for PhaseTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_independent() {
        let mut telemetry = PhaseTelemetry::new();
        for _ in 0..60 {
            telemetry.record_nanos(Phase::Render, 3_000);
        }
        telemetry.record_nanos(Phase::Simulate, 60_000);

        assert_eq!(telemetry.average_micros(Phase::Render), 3.0);
        assert_eq!(telemetry.average_micros(Phase::Simulate), 1.0);
        assert_eq!(telemetry.average_micros(Phase::Loop), 0.0);

        let report = telemetry.report(10);
        assert_eq!(report.body_count, 10);
        assert_eq!(report.average_us(Phase::Render), 3.0);
    }

    #[test]
    fn test_time_returns_closure_value() {
        let mut telemetry = PhaseTelemetry::new();
        let value = telemetry.time(Phase::Overlay, || 7);
        assert_eq!(value, 7);
        assert_eq!(telemetry.timer(Phase::Overlay).samples().head(), 1);
    }
}
