//! TOML configuration.  Every field has a default, so an empty or missing
//! file yields the stock effect.
//!
//! ```toml
//! [window]
//! width  = 1280
//! height = 720
//! fps    = 60
//!
//! [gesture]
//! mode            = "pinch"   # or "point"
//! pinch_threshold = 30.0
//!
//! [particles]
//! glyph        = "❤"
//! label        = "LOVE"
//! label_offset = [0.0, -34.0]
//! lifespan     = 40
//!
//! [model]
//! variant       = "full"      # or "lite"
//! load_delay_ms = 1500
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use hand_gesture::{GestureClassifier, GestureMode, LoadOptions, ModelVariant, DEFAULT_PINCH_THRESHOLD};
use particle_fx::{PairStyle, Point};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window:    WindowConfig,
    #[serde(default)]
    pub gesture:   GestureConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub model:     ModelConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width:        usize,
    #[serde(default = "default_height")]
    pub height:       usize,
    /// Display refresh the loop is paced to.
    #[serde(default = "default_fps")]
    pub fps:          u32,
    /// Webcam index (`camera` feature only).
    #[serde(default)]
    pub camera_index: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GestureConfig {
    #[serde(default)]
    pub mode:            GestureMode,
    /// Thumb–index distance in camera pixels.
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_glyph")]
    pub glyph:        String,
    #[serde(default = "default_glyph_size")]
    pub glyph_size:   f32,
    #[serde(default = "default_label")]
    pub label:        String,
    #[serde(default = "default_label_offset")]
    pub label_offset: [f32; 2],
    #[serde(default = "default_label_size")]
    pub label_size:   f32,
    /// Frames each particle lives.
    #[serde(default = "default_lifespan")]
    pub lifespan:     u32,
    #[serde(default = "default_saturation")]
    pub saturation:   f32,
    #[serde(default = "default_lightness")]
    pub lightness:    f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub variant:       ModelVariant,
    /// How long the simulated model takes to load.
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
}

fn default_width()           -> usize  { 1280 }
fn default_height()          -> usize  { 720 }
fn default_fps()             -> u32    { 60 }
fn default_pinch_threshold() -> f32    { DEFAULT_PINCH_THRESHOLD }
fn default_glyph()           -> String { PairStyle::default().glyph }
fn default_glyph_size()      -> f32    { PairStyle::default().glyph_size }
fn default_label()           -> String { PairStyle::default().label }
fn default_label_offset()    -> [f32; 2] {
    let p = PairStyle::default().label_offset;
    [p.x, p.y]
}
fn default_label_size()      -> f32    { PairStyle::default().label_size }
fn default_lifespan()        -> u32    { PairStyle::default().lifespan }
fn default_saturation()      -> f32    { 1.0 }
fn default_lightness()       -> f32    { 0.65 }
fn default_load_delay_ms()   -> u64    { 1500 }

impl WindowConfig {
    /// Display refresh period; `fps = 0` is treated as 1.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width:        default_width(),
            height:       default_height(),
            fps:          default_fps(),
            camera_index: 0,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mode:            GestureMode::default(),
            pinch_threshold: default_pinch_threshold(),
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            glyph:        default_glyph(),
            glyph_size:   default_glyph_size(),
            label:        default_label(),
            label_offset: default_label_offset(),
            label_size:   default_label_size(),
            lifespan:     default_lifespan(),
            saturation:   default_saturation(),
            lightness:    default_lightness(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            variant:       ModelVariant::default(),
            load_delay_ms: default_load_delay_ms(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path`, falling back to defaults when it is absent or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}; using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn classifier(&self) -> GestureClassifier {
        GestureClassifier::new(self.gesture.mode, self.gesture.pinch_threshold)
    }

    pub fn pair_style(&self) -> PairStyle {
        let p = &self.particles;
        PairStyle {
            glyph:        p.glyph.clone(),
            glyph_size:   p.glyph_size,
            label:        p.label.clone(),
            label_offset: Point::new(p.label_offset[0], p.label_offset[1]),
            label_size:   p.label_size,
            lifespan:     p.lifespan,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions { variant: self.model.variant }
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.model.load_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.window.width, 1280);
        assert_eq!(cfg.gesture.mode, GestureMode::Point);
        assert_eq!(cfg.gesture.pinch_threshold, 30.0);
        assert_eq!(cfg.particles.lifespan, 40);
        assert_eq!(cfg.pair_style(), PairStyle::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::parse(
            r#"
            [gesture]
            mode = "pinch"

            [particles]
            label = "HI"
            lifespan = 12

            [model]
            variant = "full"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.classifier().mode, GestureMode::Pinch);
        assert_eq!(cfg.classifier().pinch_threshold, 30.0);
        let style = cfg.pair_style();
        assert_eq!(style.label, "HI");
        assert_eq!(style.lifespan, 12);
        assert_eq!(style.glyph, PairStyle::default().glyph);
        assert_eq!(cfg.load_options().variant, ModelVariant::Full);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(AppConfig::parse("[gesture]\nmode = \"wave\"").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let cfg = AppConfig::load_or_default("definitely/not/here.toml");
        assert_eq!(cfg.window.height, 720);
    }

    #[test]
    fn frame_interval_from_fps() {
        let mut cfg = AppConfig::default();
        cfg.window.fps = 50;
        assert_eq!(cfg.window.frame_interval(), Duration::from_millis(20));
    }
}
