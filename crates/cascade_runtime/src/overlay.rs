//! Window-title overlay sink

use cascade_metrics::{OverlaySink, TelemetryReport};
use std::sync::Arc;
use winit::window::Window;

/// Readouts shown in the title bar: loop time, FPS, body count.
const TITLE_LINES: usize = 3;

pub struct TitleOverlay {
    window: Arc<Window>,
    base: String,
    lines: Vec<String>,
}

impl TitleOverlay {
    pub fn new(window: Arc<Window>, base: String) -> Self {
        Self {
            window,
            base,
            lines: Vec::new(),
        }
    }

    /// Rebuild the per-frame overlay text.
    pub fn compose(&mut self, report: &TelemetryReport) {
        self.lines = report.overlay_lines();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl OverlaySink for TitleOverlay {
    fn publish(&mut self, report: &TelemetryReport) {
        let title = title_text(&self.base, &report.overlay_lines());
        self.window.set_title(&title);
    }
}

fn title_text(base: &str, lines: &[String]) -> String {
    let shown = &lines[..lines.len().min(TITLE_LINES)];
    if shown.is_empty() {
        base.to_string()
    } else {
        format!("{base} | {}", shown.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_metrics::Phase;

    #[test]
    fn test_title_shows_leading_readouts() {
        let mut report = TelemetryReport::empty(12);
        report.averages_us[Phase::Loop.index()] = 16_000.0;
        let title = title_text("Cascade", &report.overlay_lines());
        assert_eq!(title, "Cascade | Loop: 16.00ms | Fps: 62.5 | Count: 12 bodies");
    }

    #[test]
    fn test_title_without_readouts() {
        assert_eq!(title_text("Cascade", &[]), "Cascade");
    }
}
