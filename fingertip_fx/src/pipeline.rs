//! The per-frame render pipeline.
//!
//! One call to [`RenderPipeline::render_frame`] does, in order:
//!
//! 1. clear the surface;
//! 2. draw the camera frame mirrored (`translate(w, 0)`, `scale(-1, 1)`),
//!    restoring the transform afterwards;
//! 3. if a frame and a detector are both present, await one detection;
//! 4. classify it and spawn a particle pair at the trigger anchor;
//! 5. age every particle once, dropping the ones that expire;
//! 6. draw the survivors at `(w - x, y)` with alpha and size scaled by
//!    remaining life, then reset global alpha to 1.
//!
//! Detection errors never escape: they count as "no hand" for the frame.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use hand_gesture::{DetectorError, GestureClassifier, GestureMode, HandDetector, Trigger};
use particle_fx::color::random_color;
use particle_fx::{PairStyle, ParticleStore, Point, Surface, VideoFrame};

use crate::config::AppConfig;

/// What happened in one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub trigger: Trigger,
    /// Particles added this frame (0 or 2).
    pub spawned: usize,
    /// Particles still alive after aging.
    pub live:    usize,
}

pub struct RenderPipeline<R = SmallRng> {
    store:           ParticleStore,
    classifier:      GestureClassifier,
    style:           PairStyle,
    saturation:      f32,
    lightness:       f32,
    rng:             R,
    detect_failures: u64,
}

impl RenderPipeline<SmallRng> {
    pub fn from_config(cfg: &AppConfig) -> Self {
        RenderPipeline::new(
            cfg.classifier(),
            cfg.pair_style(),
            cfg.particles.saturation,
            cfg.particles.lightness,
            SmallRng::from_entropy(),
        )
    }
}

impl<R: Rng> RenderPipeline<R> {
    pub fn new(
        classifier: GestureClassifier,
        style: PairStyle,
        saturation: f32,
        lightness: f32,
        rng: R,
    ) -> Self {
        RenderPipeline {
            store: ParticleStore::new(),
            classifier,
            style,
            saturation,
            lightness,
            rng,
            detect_failures: 0,
        }
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn mode(&self) -> GestureMode {
        self.classifier.mode
    }

    pub fn set_mode(&mut self, mode: GestureMode) {
        self.classifier.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> GestureMode {
        self.set_mode(self.classifier.mode.toggled());
        log::info!("[pipeline] mode: {}", self.classifier.mode);
        self.classifier.mode
    }

    pub fn clear_particles(&mut self) {
        self.store.clear();
    }

    /// Render one frame onto `surface`.  `frame` is the latest camera image
    /// (if any) and `detector` the loaded model (if ready).
    pub async fn render_frame<S, D>(
        &mut self,
        surface: &mut S,
        frame: Option<&VideoFrame>,
        detector: Option<&mut D>,
    ) -> FrameReport
    where
        S: Surface,
        D: HandDetector<VideoFrame>,
    {
        let w = surface.width() as f32;
        let h = surface.height() as f32;

        surface.clear();
        if let Some(frame) = frame {
            surface.save();
            surface.translate(w, 0.0);
            surface.scale(-1.0, 1.0);
            surface.draw_image(frame, 0.0, 0.0, w, h);
            surface.restore();
        }

        let trigger = match (frame, detector) {
            (Some(frame), Some(detector)) => match detector.estimate(frame).await {
                Ok(hands) => self.classifier.classify(&hands),
                Err(e) => {
                    self.note_failure(e);
                    Trigger::None
                }
            },
            _ => Trigger::None,
        };

        let mut spawned = 0;
        if let Some(anchor) = trigger.anchor() {
            let color = random_color(&mut self.rng, self.saturation, self.lightness);
            log::debug!(
                "[pipeline] {} at ({:.0}, {:.0}) color {:08X}",
                self.classifier.mode, anchor.x, anchor.y, color,
            );
            let before = self.store.len();
            self.store.spawn(Point::new(anchor.x, anchor.y), &self.style, color);
            spawned = self.store.len() - before;
        }

        self.store.age_and_prune();

        for p in self.store.iter() {
            surface.set_global_alpha(p.opacity());
            surface.set_font_size(p.rendered_size());
            surface.set_fill_color(p.color);
            surface.fill_text(&p.text, w - p.position.x, p.position.y);
        }
        surface.set_global_alpha(1.0);

        FrameReport { trigger, spawned, live: self.store.len() }
    }

    fn note_failure(&mut self, e: DetectorError) {
        if e == DetectorError::Busy {
            log::debug!("[pipeline] detector busy; skipping frame");
            return;
        }
        self.detect_failures += 1;
        if self.detect_failures == 1 {
            log::warn!("[pipeline] detection failed: {}", e);
        } else {
            log::debug!("[pipeline] detection failed ({} so far): {}", self.detect_failures, e);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
