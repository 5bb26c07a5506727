//! Cascade Runtime
//!
//! Binary that loads settings, builds the simulation and drives it from the
//! winit event loop. Usage: `cascade [settings.json]`

mod app;
mod overlay;

use anyhow::{Context, Result};
use app::App;
use cascade_core::SimulationWorld;
use cascade_services::Settings;
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Cascade v{}", cascade_core::VERSION);

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(path.as_deref()).context("loading settings")?;

    let world = SimulationWorld::new(settings.simulation.clone()).context("building simulation")?;
    tracing::info!(
        workers = settings.simulation.transforms.workers,
        capacity = settings.simulation.transforms.capacity,
        iterations = settings.simulation.physics.iterations,
        "simulation initialized"
    );

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings.window, world);
    event_loop.run_app(&mut app).context("running event loop")?;
    app.finish()
}
