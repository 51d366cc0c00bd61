//! # fingertip_fx
//!
//! A mirrored camera view where a tracked fingertip (or a pinch) leaves a
//! trail of fading text particles.
//!
//! ## Modes
//!
//! | Mode | Spawns when | At |
//! |---|---|---|
//! | `point` | a hand is visible | index fingertip |
//! | `pinch` | thumb and index tips are closer than the threshold | their midpoint |
//!
//! Each spawn adds a pair: a glyph and a label above it, sharing one random
//! hue, both shrinking and fading out over `lifespan` frames.
//!
//! ## Feature flags
//!
//! * (default) — synthetic camera backdrop; no hardware needed.
//! * `camera` — real webcam frames via OpenCV.
//!
//! The hand itself is always simulated by the mouse.
//!
//! ### Keyboard and mouse
//!
//! | Input | Action |
//! |---|---|
//! | mouse | index fingertip |
//! | left button (hold) | pinch |
//! | `M` | toggle point / pinch |
//! | `C` | clear particles |
//! | `Escape` / `Q` | quit |

pub mod error;
pub mod config;
pub mod camera;
pub mod sim;
pub mod pipeline;
pub mod session;
pub mod window;
pub mod app;
