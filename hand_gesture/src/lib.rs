//! # hand_gesture
//!
//! Turns hand-landmark detections into a discrete per-frame trigger, and
//! provides the asynchronous seams a render loop needs to talk to a
//! hand-landmark model without ever blocking on it.
//!
//! ## Trigger table
//!
//! | Mode | Hand visible | Condition | Trigger | Anchor |
//! |---|---|---|---|---|
//! | any   | no  | —                              | `None`  | — |
//! | Point | yes | always (no debounce)           | `Point` | index tip (8) |
//! | Pinch | yes | `dist(4, 8) < pinch_threshold` | `Pinch` | midpoint of 4 and 8 |
//! | Pinch | yes | otherwise                      | `None`  | — |
//!
//! Coordinates are always in the camera's un-mirrored pixel space; mirroring
//! is a draw-time concern of the caller.
//!
//! ## Model plumbing
//!
//! * [`detector::HandDetector`] — `async` per-frame estimation.
//! * [`detector::DetectorLoader`] / [`detector::PendingModel`] — a model load
//!   that runs on its own thread and is polled, never awaited, by the loop.
//! * [`detector::WorkerDetector`] — runs a blocking
//!   [`detector::LandmarkModel`] on a worker thread behind the async trait.

pub mod landmark;
pub mod classifier;
pub mod detector;

pub use classifier::{GestureClassifier, GestureMode, Trigger, DEFAULT_PINCH_THRESHOLD};
pub use detector::{
    DetectorError, DetectorLoader, HandDetector, LandmarkModel, LoadOptions, ModelVariant,
    PendingModel, ThreadedLoader, WorkerDetector,
};
pub use landmark::{Hand, Landmark, HAND_LANDMARKS, INDEX_TIP, THUMB_TIP};
