//! The on-screen window, using `minifb`.
//!
//! The window also acts as the simulated hand: mouse position and the left
//! button are forwarded to the pointer model as [`SimInput`] events.

use std::sync::mpsc::Sender;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

use particle_fx::{FrameBuffer, Surface};

use crate::config::WindowConfig;
use crate::sim::SimInput;

const TITLE: &str = "Fingertip FX";

/// Window-level events the session reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Resized { width: usize, height: usize },
    ToggleMode,
    ClearParticles,
    Quit,
}

/// Where rendered frames go.
pub trait Display {
    /// Current drawable size in pixels.
    fn size(&self) -> (usize, usize);

    fn is_open(&self) -> bool;

    /// Input gathered since the last call.
    fn poll_events(&mut self) -> Vec<DisplayEvent>;

    /// Show `frame`.  Returns `false` if the display has gone away.
    fn present(&mut self, frame: &FrameBuffer) -> bool;
}

// ════════════════════════════════════════════════════════════════════════════
// MinifbWindow
// ════════════════════════════════════════════════════════════════════════════

pub struct MinifbWindow {
    window:  Window,
    sim_tx:  Sender<SimInput>,
    size:    (usize, usize),
    pointer: Option<(f32, f32)>,
    pressed: bool,
}

impl MinifbWindow {
    pub fn new(cfg: &WindowConfig, sim_tx: Sender<SimInput>) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            cfg.width,
            cfg.height,
            WindowOptions {
                resize: true,
                scale_mode: ScaleMode::UpperLeft,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("opening window: {}", e))?;

        window.limit_update_rate(Some(cfg.frame_interval()));

        Ok(MinifbWindow {
            window,
            sim_tx,
            size:    (cfg.width, cfg.height),
            pointer: None,
            pressed: false,
        })
    }

    /// Forward mouse changes to the pointer model.  Send errors mean the
    /// model is gone; nothing to do about that here.
    fn forward_pointer(&mut self) {
        let pointer = self.window.get_mouse_pos(MouseMode::Discard);
        if pointer != self.pointer {
            let input = match pointer {
                Some((x, y)) => SimInput::Pointer { x, y },
                None => SimInput::Leave,
            };
            let _ = self.sim_tx.send(input);
            self.pointer = pointer;
        }

        let pressed = self.window.get_mouse_down(MouseButton::Left);
        if pressed != self.pressed {
            let _ = self.sim_tx.send(SimInput::Button { pressed });
            self.pressed = pressed;
        }
    }
}

impl Display for MinifbWindow {
    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn poll_events(&mut self) -> Vec<DisplayEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() {
            return events;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Escape) || one_shot(Key::Q) {
            events.push(DisplayEvent::Quit);
        }
        if one_shot(Key::M) {
            events.push(DisplayEvent::ToggleMode);
        }
        if one_shot(Key::C) {
            events.push(DisplayEvent::ClearParticles);
        }

        let (width, height) = self.window.get_size();
        if (width, height) != self.size && width > 0 && height > 0 {
            self.size = (width, height);
            events.push(DisplayEvent::Resized { width, height });
        }

        self.forward_pointer();
        events
    }

    fn present(&mut self, frame: &FrameBuffer) -> bool {
        match self.window.update_with_buffer(frame.pixels(), frame.width(), frame.height()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("[window] present failed: {}", e);
                false
            }
        }
    }
}
