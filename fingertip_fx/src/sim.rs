//! Pointer-driven hand simulation.
//!
//! Stands in for a real landmark model: the window forwards mouse state as
//! [`SimInput`] events, and [`PointerHandModel`] turns the latest state into
//! a synthetic hand on each inference call.  The pointer is in screen space
//! (the mirrored view), so the model un-mirrors X to report camera-space
//! landmarks exactly like a real detector would.
//!
//! | Input | Hand |
//! |---|---|
//! | pointer inside window | open hand, index tip under the pointer |
//! | left button held | thumb tip closes onto the index tip (pinch) |
//! | pointer leaves window | no hand |

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use hand_gesture::{
    DetectorError, Hand, Landmark, LandmarkModel, LoadOptions, ModelVariant, ThreadedLoader,
    WorkerDetector,
};
use particle_fx::VideoFrame;

/// Thumb offset from the index tip when the hand is open / pinched.
const OPEN_THUMB:    (f32, f32) = (-72.0, 58.0);
const PINCHED_THUMB: (f32, f32) = (-8.0, 6.0);

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer moved to screen position `(x, y)`.
    Pointer { x: f32, y: f32 },
    /// Pointer left the window.
    Leave,
    /// Primary button state changed.
    Button { pressed: bool },
}

// ════════════════════════════════════════════════════════════════════════════
// PointerHandModel
// ════════════════════════════════════════════════════════════════════════════

pub struct PointerHandModel {
    rx:      Receiver<SimInput>,
    pointer: Option<(f32, f32)>,
    pressed: bool,
}

impl PointerHandModel {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        PointerHandModel { rx, pointer: None, pressed: false }
    }

    fn drain(&mut self) -> Result<(), DetectorError> {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pointer { x, y })   => self.pointer = Some((x, y)),
                Ok(SimInput::Leave)              => self.pointer = None,
                Ok(SimInput::Button { pressed }) => self.pressed = pressed,
                Err(TryRecvError::Empty)         => return Ok(()),
                Err(TryRecvError::Disconnected)  => return Err(DetectorError::Disconnected),
            }
        }
    }
}

impl LandmarkModel<VideoFrame> for PointerHandModel {
    fn infer(&mut self, frame: &VideoFrame) -> Result<Vec<Hand>, DetectorError> {
        self.drain()?;
        let Some((sx, sy)) = self.pointer else {
            return Ok(Vec::new());
        };

        let index = Landmark::new(frame.width as f32 - sx, sy);
        let (tx, ty) = if self.pressed { PINCHED_THUMB } else { OPEN_THUMB };
        Ok(vec![Hand::synthetic(index, index.offset(tx, ty))])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Loader
// ════════════════════════════════════════════════════════════════════════════

/// Loader that "loads" the simulated model after `delay` (twice as long for
/// the full variant) and runs it on a worker thread.
pub fn sim_loader(
    rx: Receiver<SimInput>,
    delay: Duration,
) -> ThreadedLoader<WorkerDetector<VideoFrame>> {
    ThreadedLoader::new(move |options: LoadOptions| {
        let delay = match options.variant {
            ModelVariant::Lite => delay,
            ModelVariant::Full => delay * 2,
        };
        thread::sleep(delay);
        log::info!("[sim] pointer hand model loaded ({})", options.variant.name());
        Ok(WorkerDetector::spawn(PointerHandModel::new(rx)))
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
