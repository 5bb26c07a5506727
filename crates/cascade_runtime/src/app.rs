//! Host loop
//!
//! One redraw is one frame: simulation tick, instanced draw, overlay. The
//! Fifo present blocks on vblank, which paces the loop.

use crate::overlay::TitleOverlay;
use cascade_core::SimulationWorld;
use cascade_metrics::{OverlaySink, Phase, PhaseTelemetry};
use cascade_render::window::{window_attributes, WindowConfig};
use cascade_render::InstancedRenderer;
use cascade_services::WindowSettings;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

pub struct App {
    settings: WindowSettings,
    window: Option<Arc<Window>>,
    renderer: Option<InstancedRenderer>,
    overlay: Option<TitleOverlay>,
    world: SimulationWorld,
    telemetry: PhaseTelemetry,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: WindowSettings, world: SimulationWorld) -> Self {
        Self {
            settings,
            window: None,
            renderer: None,
            overlay: None,
            world,
            telemetry: PhaseTelemetry::new(),
            failure: None,
        }
    }

    /// Surface the error that stopped the loop, if any.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => {
                info!(frames = self.world.time().frame_count(), "shutdown");
                Ok(())
            }
        }
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = window_attributes(&WindowConfig {
            title: self.settings.title.clone(),
            width: self.settings.width,
            height: self.settings.height,
        });
        let window = Arc::new(event_loop.create_window(attrs)?);
        let renderer = pollster::block_on(InstancedRenderer::new(window.clone(), self.settings.vsync))?;

        self.overlay = Some(TitleOverlay::new(window.clone(), self.settings.title.clone()));
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        // Loop and Render exclude the present wait so the readout shows
        // frame cost rather than the display rate.
        let loop_start = Instant::now();
        let mut present_wait = Duration::ZERO;

        let output = match self.world.tick(&mut self.telemetry) {
            Ok(output) => output,
            Err(err) => {
                // Recoverable errors are absorbed inside the tick
                error!(error = %err, "simulation frame aborted");
                self.failure = Some(anyhow::Error::new(err).context("simulation frame aborted"));
                event_loop.exit();
                return;
            }
        };
        let count = output.instance_count;
        let report = output.report;

        let render_start = Instant::now();
        let drawn = renderer.draw(output.transforms);
        let render_elapsed = render_start.elapsed();
        match drawn {
            Ok(stats) => {
                present_wait = stats.present_wait;
                self.telemetry
                    .record_nanos(Phase::Render, sample_nanos(stats.busy(render_elapsed)));
            }
            Err(err) if err.is_transient() => {
                debug!(error = %err, "surface unavailable, reconfiguring");
                renderer.reconfigure();
            }
            Err(err) => {
                error!(error = %err, "render failed");
                self.failure = Some(anyhow::Error::new(err).context("rendering frame"));
                event_loop.exit();
                return;
            }
        }

        if let Some(overlay) = self.overlay.as_mut() {
            self.telemetry.start(Phase::Overlay);
            overlay.compose(&self.telemetry.report(count));
            if let Some(report) = &report {
                overlay.publish(report);
                debug!(lines = overlay.lines().len(), "overlay refreshed");
            }
            self.telemetry.stop(Phase::Overlay);
        }

        let loop_busy = loop_start.elapsed().saturating_sub(present_wait);
        self.telemetry.record_nanos(Phase::Loop, sample_nanos(loop_busy));
    }
}

/// Out-of-range samples are clamped by the timer.
fn sample_nanos(busy: Duration) -> i64 {
    i64::try_from(busy.as_nanos()).unwrap_or(i64::MAX)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_surface(event_loop) {
            error!(error = %err, "failed to create window surface");
            self.failure = Some(err.context("creating window surface"));
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_nanos_saturates() {
        assert_eq!(sample_nanos(Duration::from_micros(2_600)), 2_600_000);
        assert_eq!(sample_nanos(Duration::MAX), i64::MAX);
    }
}
