//! Measured phases and the periodic report handed to the overlay/log sink

use serde::Serialize;
use tracing::{debug, info};

/// Per-frame phases that get their own rolling average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Simulate,
    TransformBatch,
    Render,
    Overlay,
    Loop,
}

impl Phase {
    pub const COUNT: usize = 5;
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Simulate,
        Phase::TransformBatch,
        Phase::Render,
        Phase::Overlay,
        Phase::Loop,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Simulate => "simulate",
            Phase::TransformBatch => "transform_batch",
            Phase::Render => "render",
            Phase::Overlay => "overlay",
            Phase::Loop => "loop",
        }
    }
}

/// Snapshot of every phase average plus the live body count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TelemetryReport {
    pub body_count: usize,
    /// Averages in microseconds, indexed by `Phase::index`.
    pub averages_us: [f64; Phase::COUNT],
}

impl TelemetryReport {
    pub fn empty(body_count: usize) -> Self {
        Self {
            body_count,
            averages_us: [0.0; Phase::COUNT],
        }
    }

    pub fn average_us(&self, phase: Phase) -> f64 {
        self.averages_us[phase.index()]
    }

    pub fn average_ms(&self, phase: Phase) -> f64 {
        self.average_us(phase) / 1000.0
    }

    pub fn fps(&self) -> f64 {
        let loop_us = self.average_us(Phase::Loop);
        if loop_us > 0.0 {
            1_000_000.0 / loop_us
        } else {
            0.0
        }
    }

    /// Phase cost divided across the live bodies, in microseconds.
    pub fn per_body_us(&self, phase: Phase) -> f64 {
        if self.body_count == 0 {
            0.0
        } else {
            self.average_us(phase) / self.body_count as f64
        }
    }

    /// Key/value pairs for sinks that only understand flat numbers.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = Vec::with_capacity(Phase::COUNT + 1);
        entries.push(("body_count", self.body_count as f64));
        for phase in Phase::ALL {
            entries.push((phase.name(), self.average_us(phase)));
        }
        entries
    }

    /// Text for the on-screen overlay, one line per readout.
    pub fn overlay_lines(&self) -> Vec<String> {
        vec![
            format!("Loop: {:.2}ms", self.average_ms(Phase::Loop)),
            format!("Fps: {:3.1}", self.fps()),
            format!("Count: {} bodies", self.body_count),
            format!("Render: {:.2}ms", self.average_ms(Phase::Render)),
            format!("Render/body: {:.2}us", self.per_body_us(Phase::Render)),
            format!("Simulation: {:.2}ms", self.average_ms(Phase::Simulate)),
            format!("Simulation/body: {:.2}us", self.per_body_us(Phase::Simulate)),
            format!("Overlay: {:.2}ms", self.average_ms(Phase::Overlay)),
            format!("Transforms: {:.2}ms", self.average_ms(Phase::TransformBatch)),
        ]
    }

    pub fn log(&self) {
        info!(
            bodies = self.body_count,
            fps = self.fps(),
            loop_ms = self.average_ms(Phase::Loop),
            simulate_ms = self.average_ms(Phase::Simulate),
            transform_ms = self.average_ms(Phase::TransformBatch),
            render_ms = self.average_ms(Phase::Render),
            overlay_ms = self.average_ms(Phase::Overlay),
            "performance report"
        );
        for (key, value) in self.entries() {
            debug!(key, value, "report entry");
        }
    }
}

/// Receiver for periodic reports (console, window title, on-screen text).
pub trait OverlaySink {
    fn publish(&mut self, report: &TelemetryReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_indices_match_all() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_fps_and_per_body() {
        let mut report = TelemetryReport::empty(4);
        report.averages_us[Phase::Loop.index()] = 16_000.0;
        report.averages_us[Phase::Render.index()] = 400.0;
        assert_eq!(report.fps(), 62.5);
        assert_eq!(report.per_body_us(Phase::Render), 100.0);
    }

    #[test]
    fn test_empty_report_has_no_fps() {
        let report = TelemetryReport::empty(0);
        assert_eq!(report.fps(), 0.0);
        assert_eq!(report.per_body_us(Phase::Simulate), 0.0);
        assert_eq!(report.overlay_lines()[2], "Count: 0 bodies");
        assert_eq!(report.entries().len(), Phase::COUNT + 1);
    }
}
