//! Wiring: window, camera, simulated model, pipeline, session.

use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::pipeline::RenderPipeline;
use crate::session::Session;
use crate::sim::{sim_loader, SimInput};
use crate::window::{Display, MinifbWindow};

#[cfg(feature = "camera")]
use crate::camera::OpenCvCamera;
#[cfg(not(feature = "camera"))]
use crate::camera::SyntheticCamera;

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run until the window is closed or the user quits.
///
/// Setup failures (camera refused, model missing) do not end the run: they
/// are shown on the status bar while the loop keeps drawing whatever it can.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Sim hand channel (window → pointer model) ─────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    // ── Window ────────────────────────────────────────────────────────────
    let mut window = MinifbWindow::new(&cfg.window, sim_tx).context("creating window")?;

    // ── Camera ────────────────────────────────────────────────────────────
    #[cfg(feature = "camera")]
    let camera = OpenCvCamera::new(cfg.window.camera_index);
    #[cfg(not(feature = "camera"))]
    let camera = SyntheticCamera::new();

    // ── Session ───────────────────────────────────────────────────────────
    let loader = sim_loader(sim_rx, cfg.load_delay());
    let pipeline = RenderPipeline::from_config(&cfg);
    let mut session = Session::new(camera, loader, pipeline, cfg.load_options(), window.size());

    // Already logged and recorded as the session state.
    let _ = session.start();

    let frames = pollster::block_on(session.run_until(&mut window, |_| false));
    log::info!("rendered {} frames; {}", frames, session.status_line());
    Ok(())
}
