//! Asynchronous seams between the render loop and a hand-landmark model.
//!
//! The loop must never block on the model.  Two mechanisms make that hold:
//!
//! * **Loading** runs on its own thread and hands the finished detector
//!   back through a one-shot channel wrapped in [`PendingModel`].  The loop
//!   calls [`PendingModel::try_take`] once per frame; it never awaits it.
//! * **Estimation** is an `async` call ([`HandDetector::estimate`]) — the
//!   loop's single suspension point per frame.  [`WorkerDetector`] runs a
//!   blocking [`LandmarkModel`] on a worker thread behind that trait and
//!   refuses to queue a second request while one is still outstanding.

use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc::{self, Sender};
use std::task::{Context, Poll};
use std::thread;

use futures::channel::oneshot;
use serde::Deserialize;
use thiserror::Error;

use crate::landmark::Hand;

// ════════════════════════════════════════════════════════════════════════════
// Errors and options
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetectorError {
    /// A previous request has not been answered yet; this frame is skipped.
    #[error("previous detection still pending")]
    Busy,
    #[error("detector worker has shut down")]
    Disconnected,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("hand model failed to load: {0}")]
    Load(String),
}

/// Size/accuracy trade-off requested from the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    #[default]
    Lite,
    Full,
}

impl ModelVariant {
    pub fn name(self) -> &'static str {
        match self {
            ModelVariant::Lite => "lite",
            ModelVariant::Full => "full",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub variant: ModelVariant,
}

type Detections = Result<Vec<Hand>, DetectorError>;

// ════════════════════════════════════════════════════════════════════════════
// HandDetector / LandmarkModel
// ════════════════════════════════════════════════════════════════════════════

/// A loaded model as seen by the render loop.  `F` is the frame type the
/// model consumes.
#[allow(async_fn_in_trait)]
pub trait HandDetector<F: ?Sized> {
    /// Zero or more hands for `frame`.  An empty list is a normal outcome.
    async fn estimate(&mut self, frame: &F) -> Detections;
}

/// A blocking model, run off the render thread by [`WorkerDetector`].
pub trait LandmarkModel<F>: Send + 'static {
    fn infer(&mut self, frame: &F) -> Detections;
}

// ════════════════════════════════════════════════════════════════════════════
// WorkerDetector
// ════════════════════════════════════════════════════════════════════════════

struct Request<F> {
    frame: F,
    reply: oneshot::Sender<Detections>,
}

/// Runs a [`LandmarkModel`] on a dedicated thread.
///
/// At most one request is outstanding.  If an `estimate` future is dropped
/// before its answer arrives, the next call finds the request still in
/// flight and returns [`DetectorError::Busy`] instead of queueing; once the
/// stale answer lands it is discarded and a fresh request goes out.
pub struct WorkerDetector<F> {
    tx:        Sender<Request<F>>,
    in_flight: Option<oneshot::Receiver<Detections>>,
}

impl<F: Send + 'static> WorkerDetector<F> {
    pub fn spawn<M: LandmarkModel<F>>(mut model: M) -> Self {
        let (tx, rx) = mpsc::channel::<Request<F>>();
        thread::spawn(move || {
            for req in rx {
                let result = model.infer(&req.frame);
                // The asking side may have gone away; nothing to do then.
                let _ = req.reply.send(result);
            }
            log::debug!("[detector] worker exiting");
        });
        WorkerDetector { tx, in_flight: None }
    }

    /// True while an earlier request is still unanswered.  A stale answer
    /// that has already arrived is dropped here.
    pub fn is_busy(&mut self) -> bool {
        let Some(rx) = self.in_flight.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(None) => true,
            Ok(Some(_)) | Err(oneshot::Canceled) => {
                self.in_flight = None;
                false
            }
        }
    }
}

impl<F: Clone + Send + 'static> HandDetector<F> for WorkerDetector<F> {
    async fn estimate(&mut self, frame: &F) -> Detections {
        if let Some(rx) = self.in_flight.as_mut() {
            match rx.try_recv() {
                Ok(None) => return Err(DetectorError::Busy),
                Ok(Some(_stale)) => log::debug!("[detector] discarding stale detection"),
                Err(oneshot::Canceled) => return Err(DetectorError::Disconnected),
            }
            self.in_flight = None;
        }

        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { frame: frame.clone(), reply })
            .map_err(|_| DetectorError::Disconnected)?;

        let rx = self.in_flight.insert(rx);
        let answer = rx.await;
        self.in_flight = None;
        answer.map_err(|_| DetectorError::Disconnected)?
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PendingModel — a model load in progress
// ════════════════════════════════════════════════════════════════════════════

/// The eventual result of a model load.
///
/// Implements [`Future`] for callers that want to await it, and offers
/// [`try_take`](PendingModel::try_take) for the render loop, which must not.
pub struct PendingModel<D> {
    rx: oneshot::Receiver<Result<D, DetectorError>>,
}

impl<D: Send + 'static> PendingModel<D> {
    /// Run `load` on its own thread.
    pub fn spawn<L>(load: L) -> Self
    where
        L: FnOnce() -> Result<D, DetectorError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        thread::spawn(move || {
            let _ = tx.send(load());
        });
        PendingModel { rx }
    }
}

impl<D> PendingModel<D> {
    /// A load that has already finished.
    pub fn resolved(result: Result<D, DetectorError>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        PendingModel { rx }
    }

    /// Non-blocking check.  `None` while loading; a loader thread that dies
    /// without answering (e.g. panics) reports [`DetectorError::Load`].
    pub fn try_take(&mut self) -> Option<Result<D, DetectorError>> {
        match self.rx.try_recv() {
            Ok(done) => done,
            Err(oneshot::Canceled) => Some(Err(loader_vanished())),
        }
    }
}

impl<D> Future for PendingModel<D> {
    type Output = Result<D, DetectorError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.unwrap_or_else(|_| Err(loader_vanished())))
    }
}

fn loader_vanished() -> DetectorError {
    DetectorError::Load("loader exited without producing a model".to_string())
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorLoader
// ════════════════════════════════════════════════════════════════════════════

/// Something that can produce a detector asynchronously.
pub trait DetectorLoader {
    type Detector;

    /// Whether the model library is present at all.  Checked before
    /// [`load`](DetectorLoader::load) is attempted.
    fn is_available(&self) -> bool {
        true
    }

    fn load(&mut self, options: LoadOptions) -> PendingModel<Self::Detector>;
}

type Factory<D> = Box<dyn FnOnce(LoadOptions) -> Result<D, DetectorError> + Send>;

/// Loads by running a one-shot factory on a helper thread.
pub struct ThreadedLoader<D> {
    factory: Option<Factory<D>>,
}

impl<D: Send + 'static> ThreadedLoader<D> {
    pub fn new<L>(factory: L) -> Self
    where
        L: FnOnce(LoadOptions) -> Result<D, DetectorError> + Send + 'static,
    {
        ThreadedLoader { factory: Some(Box::new(factory)) }
    }
}

impl<D: Send + 'static> DetectorLoader for ThreadedLoader<D> {
    type Detector = D;

    /// The factory is single-use; after one `load` the loader is spent.
    fn is_available(&self) -> bool {
        self.factory.is_some()
    }

    fn load(&mut self, options: LoadOptions) -> PendingModel<D> {
        match self.factory.take() {
            Some(factory) => {
                log::info!("[detector] loading hand model ({})", options.variant.name());
                PendingModel::spawn(move || factory(options))
            }
            None => PendingModel::resolved(Err(DetectorError::Load(
                "loader already used".to_string(),
            ))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
