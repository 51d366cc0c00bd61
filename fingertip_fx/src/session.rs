//! Session controller: camera setup, model loading, and the render loop.
//!
//! ```text
//! Initializing ──start()──▶ CameraReady ──load──▶ Loading ──model──▶ ModelReady
//!        │                      │                    │
//!        └──────────────────────┴────────────────────┴──▶ Failed(SessionError)
//! ```
//!
//! Rendering never waits on setup.  While the model loads (or after setup
//! has failed) every frame still draws the mirrored camera backdrop; the
//! detector is only consulted once the readiness flag is set, and the flag
//! is never cleared again.

use rand::rngs::SmallRng;
use rand::Rng;

use hand_gesture::{DetectorLoader, HandDetector, LoadOptions, PendingModel};
use particle_fx::{FrameBuffer, Surface, VideoFrame};

use crate::camera::CameraSource;
use crate::error::SessionError;
use crate::pipeline::{FrameReport, RenderPipeline};
use crate::window::{Display, DisplayEvent};

const STATUS_H:    usize = 14;
const STATUS_BG:   u32   = 0xFF0F3460;
const STATUS_TEXT: u32   = 0xFFEEEEEE;
const STATUS_FAIL: u32   = 0xFFFF8080;

// ════════════════════════════════════════════════════════════════════════════
// State
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Initializing,
    CameraReady,
    Loading,
    ModelReady,
    Failed(SessionError),
}

/// Set once the detector is usable.  Never cleared.
#[derive(Debug, Default)]
pub struct ReadinessFlag {
    ready: bool,
}

impl ReadinessFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns `true` if this call flipped the flag.
    pub fn mark_ready(&mut self) -> bool {
        let flipped = !self.ready;
        self.ready = true;
        flipped
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session<C, L, R = SmallRng>
where
    L: DetectorLoader,
{
    camera:        C,
    camera_open:   bool,
    loader:        L,
    options:       LoadOptions,
    pending:       Option<PendingModel<L::Detector>>,
    detector:      Option<L::Detector>,
    ready:         ReadinessFlag,
    state:         SessionState,
    pipeline:      RenderPipeline<R>,
    surface:       FrameBuffer,
    frames:        u64,
    read_failures: u64,
}

impl<C, L, R> Session<C, L, R>
where
    C: CameraSource,
    L: DetectorLoader,
    L::Detector: HandDetector<VideoFrame>,
    R: Rng,
{
    pub fn new(
        camera: C,
        loader: L,
        pipeline: RenderPipeline<R>,
        options: LoadOptions,
        size: (usize, usize),
    ) -> Self {
        Session {
            camera,
            camera_open: false,
            loader,
            options,
            pending: None,
            detector: None,
            ready: ReadinessFlag::new(),
            state: SessionState::Initializing,
            pipeline,
            surface: FrameBuffer::new(size.0, size.1),
            frames: 0,
            read_failures: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self)    -> &SessionState      { &self.state }
    pub fn is_ready(&self) -> bool               { self.ready.is_ready() }
    pub fn pipeline(&self) -> &RenderPipeline<R> { &self.pipeline }
    pub fn surface(&self)  -> &FrameBuffer       { &self.surface }
    pub fn frames(&self)   -> u64                { self.frames }

    /// The user-facing message for a failed setup, if any.
    pub fn failure_message(&self) -> Option<String> {
        match &self.state {
            SessionState::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn status_line(&self) -> String {
        match &self.state {
            SessionState::Initializing => "starting camera\u{2026}".to_string(),
            SessionState::CameraReady | SessionState::Loading => {
                "loading hand model\u{2026}".to_string()
            }
            SessionState::ModelReady => format!("ready - {}", self.pipeline.mode()),
            SessionState::Failed(e) => e.to_string(),
        }
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Bring up the camera and begin loading the model.  The model arrives
    /// later, picked up by [`step`](Self::step).  Any error has already
    /// been logged and recorded as the session state when this returns.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.open_camera() {
            return Err(self.fail(e));
        }
        self.state = SessionState::CameraReady;
        log::info!("[session] camera ready");

        if !self.loader.is_available() {
            let e = SessionError::DetectorUnavailable("no hand landmark model".to_string());
            return Err(self.fail(e));
        }
        self.pending = Some(self.loader.load(self.options));
        self.state = SessionState::Loading;
        log::info!("[session] loading hand model ({})", self.options.variant.name());
        Ok(())
    }

    fn open_camera(&mut self) -> Result<(), SessionError> {
        self.camera_open = false;
        if !self.camera.is_secure() {
            return Err(SessionError::InsecureContext);
        }
        if !self.camera.is_supported() {
            return Err(SessionError::UnsupportedEnvironment);
        }
        self.camera.open(self.surface.width(), self.surface.height())?;
        self.camera_open = true;
        Ok(())
    }

    fn fail(&mut self, e: SessionError) -> SessionError {
        log::error!("[session] {}", e);
        self.state = SessionState::Failed(e.clone());
        e
    }

    /// Non-blocking check on the model load.
    fn poll_model(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        match pending.try_take() {
            None => {}
            Some(Ok(detector)) => {
                self.pending = None;
                self.detector = Some(detector);
                self.ready.mark_ready();
                if self.state == SessionState::Loading {
                    self.state = SessionState::ModelReady;
                }
                log::info!("[session] hand model ready after {} frames", self.frames);
            }
            Some(Err(e)) => {
                self.pending = None;
                self.fail(SessionError::DetectorUnavailable(e.to_string()));
            }
        }
    }

    // ── Per-frame ─────────────────────────────────────────────────────────

    /// One loop iteration: pick up the model if it has arrived, grab a
    /// frame, and render.  The only suspension point is the detection.
    pub async fn step(&mut self) -> FrameReport {
        self.poll_model();

        let frame = if self.camera_open {
            match self.camera.read_frame() {
                Ok(frame) => Some(frame),
                Err(e) => {
                    self.read_failures += 1;
                    if self.read_failures == 1 {
                        log::warn!("[session] frame read failed: {}", e);
                    }
                    None
                }
            }
        } else {
            None
        };

        let detector = if self.ready.is_ready() { self.detector.as_mut() } else { None };
        let report = self.pipeline.render_frame(&mut self.surface, frame, detector).await;

        let status = self.status_line();
        let color = if self.failure_message().is_some() { STATUS_FAIL } else { STATUS_TEXT };
        self.draw_status(&status, color);

        self.frames += 1;
        report
    }

    fn draw_status(&mut self, text: &str, color: u32) {
        let (w, h) = (self.surface.width(), self.surface.height());
        if h < STATUS_H {
            return;
        }
        self.surface.fill_rect(0, h - STATUS_H, w, STATUS_H, STATUS_BG);
        self.surface.draw_label(text, 6, h - STATUS_H + 4, color);
    }

    /// Track a new surface size and re-target the camera.  Best-effort: a
    /// failure is surfaced but the loop carries on.
    pub fn on_resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
        log::info!("[session] resized to {}x{}", width, height);
        if self.state == SessionState::Initializing {
            return;
        }
        if let Err(e) = self.open_camera() {
            self.fail(e);
        }
    }

    /// Apply one display event.  Returns `false` on quit.
    pub fn handle_event(&mut self, event: DisplayEvent) -> bool {
        match event {
            DisplayEvent::Resized { width, height } => self.on_resize(width, height),
            DisplayEvent::ToggleMode => {
                self.pipeline.toggle_mode();
            }
            DisplayEvent::ClearParticles => self.pipeline.clear_particles(),
            DisplayEvent::Quit => return false,
        }
        true
    }

    /// Drive the loop until the display closes, a quit event arrives, or
    /// `stop` returns `true` after a frame.  Returns frames rendered.
    pub async fn run_until<D, P>(&mut self, display: &mut D, mut stop: P) -> u64
    where
        D: Display,
        P: FnMut(&FrameReport) -> bool,
    {
        let first = self.frames;
        let size = display.size();
        if size != (self.surface.width(), self.surface.height()) {
            self.on_resize(size.0, size.1);
        }

        'outer: while display.is_open() {
            for event in display.poll_events() {
                if !self.handle_event(event) {
                    log::info!("[session] quit requested");
                    break 'outer;
                }
            }

            let report = self.step().await;
            if !display.present(&self.surface) {
                break;
            }
            if stop(&report) {
                break;
            }
        }
        self.frames - first
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{DetectorError, GestureClassifier, Hand, Landmark, Trigger};
    use particle_fx::PairStyle;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    // ── Test doubles ──────────────────────────────────────────────────────

    struct TestCamera {
        secure:    bool,
        supported: bool,
        deny:      bool,
        opens:     Vec<(usize, usize)>,
        frame:     VideoFrame,
    }

    impl TestCamera {
        fn working() -> Self {
            TestCamera {
                secure:    true,
                supported: true,
                deny:      false,
                opens:     Vec::new(),
                frame:     VideoFrame::new(0, 0),
            }
        }
    }

    impl CameraSource for TestCamera {
        fn is_secure(&self)    -> bool { self.secure }
        fn is_supported(&self) -> bool { self.supported }

        fn open(&mut self, width: usize, height: usize) -> Result<(), SessionError> {
            if self.deny {
                return Err(SessionError::PermissionDenied);
            }
            self.opens.push((width, height));
            self.frame = VideoFrame::filled(width, height, 0xFF204060);
            Ok(())
        }

        fn read_frame(&mut self) -> Result<&VideoFrame, SessionError> {
            Ok(&self.frame)
        }
    }

    /// Always sees a hand pointing at `(x, y)`.
    struct PointAt(f32, f32);

    impl HandDetector<VideoFrame> for PointAt {
        async fn estimate(&mut self, _frame: &VideoFrame) -> Result<Vec<Hand>, DetectorError> {
            let index = Landmark::new(self.0, self.1);
            Ok(vec![Hand::synthetic(index, index.offset(-80.0, 60.0))])
        }
    }

    enum Plan {
        Immediate,
        Gated(mpsc::Receiver<()>),
        Panics,
        Missing,
    }

    struct TestLoader {
        plan:  Option<Plan>,
        loads: usize,
    }

    impl TestLoader {
        fn new(plan: Plan) -> Self {
            TestLoader { plan: Some(plan), loads: 0 }
        }
    }

    impl DetectorLoader for TestLoader {
        type Detector = PointAt;

        fn is_available(&self) -> bool {
            !matches!(self.plan, Some(Plan::Missing))
        }

        fn load(&mut self, _options: LoadOptions) -> PendingModel<PointAt> {
            self.loads += 1;
            match self.plan.take() {
                Some(Plan::Immediate) => PendingModel::resolved(Ok(PointAt(100.0, 100.0))),
                Some(Plan::Gated(gate)) => PendingModel::spawn(move || {
                    let _ = gate.recv();
                    Ok(PointAt(100.0, 100.0))
                }),
                Some(Plan::Panics) => PendingModel::spawn(|| panic!("model file corrupt")),
                _ => PendingModel::resolved(Err(DetectorError::Load("no plan".to_string()))),
            }
        }
    }

    struct HeadlessDisplay {
        size:      (usize, usize),
        open:      bool,
        events:    VecDeque<Vec<DisplayEvent>>,
        presented: usize,
    }

    impl HeadlessDisplay {
        fn new(w: usize, h: usize) -> Self {
            HeadlessDisplay { size: (w, h), open: true, events: VecDeque::new(), presented: 0 }
        }
    }

    impl Display for HeadlessDisplay {
        fn size(&self)    -> (usize, usize) { self.size }
        fn is_open(&self) -> bool           { self.open }

        fn poll_events(&mut self) -> Vec<DisplayEvent> {
            self.events.pop_front().unwrap_or_default()
        }

        fn present(&mut self, _frame: &FrameBuffer) -> bool {
            self.presented += 1;
            true
        }
    }

    type TestSession = Session<TestCamera, TestLoader, SmallRng>;

    fn session(camera: TestCamera, plan: Plan) -> TestSession {
        let pipeline = RenderPipeline::new(
            GestureClassifier::default(),
            PairStyle::default(),
            1.0,
            0.65,
            SmallRng::seed_from_u64(3),
        );
        Session::new(camera, TestLoader::new(plan), pipeline, LoadOptions::default(), (320, 240))
    }

    fn step(s: &mut TestSession) -> FrameReport {
        pollster::block_on(s.step())
    }

    /// Step until `done` holds, giving background threads time to finish.
    fn step_until(s: &mut TestSession, done: impl Fn(&TestSession) -> bool) {
        for _ in 0..2000 {
            if done(s) {
                return;
            }
            step(s);
            thread::sleep(Duration::from_millis(1));
        }
        panic!("condition never reached; state {:?}", s.state());
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    #[test]
    fn insecure_context_fails_before_anything_else() {
        let mut s = session(TestCamera { secure: false, ..TestCamera::working() }, Plan::Immediate);
        assert_eq!(s.start(), Err(SessionError::InsecureContext));
        assert_eq!(s.state(), &SessionState::Failed(SessionError::InsecureContext));
        assert_eq!(s.loader.loads, 0);
        assert!(s.camera.opens.is_empty());
        assert!(!s.is_ready());
    }

    #[test]
    fn unsupported_environment() {
        let mut s = session(TestCamera { supported: false, ..TestCamera::working() }, Plan::Immediate);
        assert_eq!(s.start(), Err(SessionError::UnsupportedEnvironment));
        assert_eq!(s.loader.loads, 0);
    }

    #[test]
    fn permission_denied_is_surfaced() {
        let mut s = session(TestCamera { deny: true, ..TestCamera::working() }, Plan::Immediate);
        assert_eq!(s.start(), Err(SessionError::PermissionDenied));
        assert_eq!(s.failure_message().as_deref(), Some("camera access was denied"));
        assert_eq!(s.status_line(), "camera access was denied");
    }

    #[test]
    fn missing_model_library_fails_after_camera() {
        let mut s = session(TestCamera::working(), Plan::Missing);
        let err = s.start().unwrap_err();
        assert!(matches!(err, SessionError::DetectorUnavailable(_)));
        assert_eq!(s.camera.opens, vec![(320, 240)]);
        assert_eq!(s.loader.loads, 0);

        // The backdrop keeps rendering; nothing ever spawns.
        for _ in 0..5 {
            let r = step(&mut s);
            assert_eq!(r.spawned, 0);
        }
        assert!(s.pipeline().store().is_empty());
        assert_eq!(s.surface().pixel(10, 10), 0xFF204060);
    }

    // ── Loading ───────────────────────────────────────────────────────────

    #[test]
    fn immediate_model_is_used_on_first_frame() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        assert_eq!(s.state(), &SessionState::Loading);

        let r = step(&mut s);
        assert_eq!(s.state(), &SessionState::ModelReady);
        assert!(s.is_ready());
        assert_eq!(r.spawned, 2);
        assert_eq!(s.status_line(), "ready - point");
    }

    #[test]
    fn no_spawns_while_loading() {
        let (open_gate, gate) = mpsc::channel();
        let mut s = session(TestCamera::working(), Plan::Gated(gate));
        s.start().unwrap();

        for _ in 0..10 {
            let r = step(&mut s);
            assert_eq!(r.spawned, 0);
            assert!(!s.is_ready());
        }
        assert!(s.pipeline().store().is_empty());
        assert_eq!(s.status_line(), "loading hand model\u{2026}");

        open_gate.send(()).unwrap();
        step_until(&mut s, |s| s.is_ready());
        assert_eq!(s.state(), &SessionState::ModelReady);
        assert_eq!(step(&mut s).spawned, 2);
    }

    #[test]
    fn crashed_loader_becomes_detector_unavailable() {
        let mut s = session(TestCamera::working(), Plan::Panics);
        s.start().unwrap();
        step_until(&mut s, |s| matches!(s.state(), SessionState::Failed(_)));

        assert!(matches!(s.state(), SessionState::Failed(SessionError::DetectorUnavailable(_))));
        assert!(!s.is_ready());
        assert_eq!(step(&mut s).spawned, 0);
    }

    #[test]
    fn readiness_is_one_way() {
        let mut flag = ReadinessFlag::new();
        assert!(!flag.is_ready());
        assert!(flag.mark_ready());
        assert!(!flag.mark_ready());
        assert!(flag.is_ready());
    }

    // ── Loop ──────────────────────────────────────────────────────────────

    #[test]
    fn run_until_stops_on_predicate() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        let mut display = HeadlessDisplay::new(320, 240);

        let mut seen = 0;
        let frames = pollster::block_on(s.run_until(&mut display, |_| {
            seen += 1;
            seen == 3
        }));
        assert_eq!(frames, 3);
        assert_eq!(display.presented, 3);
    }

    #[test]
    fn quit_event_stops_before_rendering() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        let mut display = HeadlessDisplay::new(320, 240);
        display.events.push_back(vec![DisplayEvent::Quit]);

        let frames = pollster::block_on(s.run_until(&mut display, |_| false));
        assert_eq!(frames, 0);
        assert_eq!(display.presented, 0);
    }

    #[test]
    fn closed_display_renders_nothing() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        let mut display = HeadlessDisplay::new(320, 240);
        display.open = false;
        assert_eq!(pollster::block_on(s.run_until(&mut display, |_| false)), 0);
    }

    #[test]
    fn resize_retargets_camera() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        let mut display = HeadlessDisplay::new(320, 240);
        display.events.push_back(vec![DisplayEvent::Resized { width: 200, height: 100 }]);

        pollster::block_on(s.run_until(&mut display, |_| true));
        assert_eq!(s.camera.opens, vec![(320, 240), (200, 100)]);
        assert_eq!((s.surface().width(), s.surface().height()), (200, 100));
    }

    #[test]
    fn display_size_is_adopted_at_loop_start() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        let mut display = HeadlessDisplay::new(640, 360);
        pollster::block_on(s.run_until(&mut display, |_| true));
        assert_eq!(s.camera.opens.last(), Some(&(640, 360)));
    }

    #[test]
    fn failed_resize_keeps_looping() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        s.camera.deny = true;
        s.on_resize(100, 80);
        assert_eq!(s.state(), &SessionState::Failed(SessionError::PermissionDenied));

        // No frames without a camera, so no detection; the model still
        // arrives and readiness sticks.
        let r = step(&mut s);
        assert_eq!(r.trigger, Trigger::None);
        assert!(s.is_ready());
        assert_eq!(s.frames(), 1);
        assert!(matches!(s.state(), SessionState::Failed(_)));
    }

    #[test]
    fn keyboard_events_reach_pipeline() {
        let mut s = session(TestCamera::working(), Plan::Immediate);
        s.start().unwrap();
        step(&mut s);
        assert!(!s.pipeline().store().is_empty());

        assert!(s.handle_event(DisplayEvent::ToggleMode));
        assert_eq!(s.status_line(), "ready - pinch");
        assert!(s.handle_event(DisplayEvent::ClearParticles));
        assert!(s.pipeline().store().is_empty());
        assert!(!s.handle_event(DisplayEvent::Quit));
    }
}
