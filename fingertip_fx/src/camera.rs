//! Camera sources.
//!
//! Frames are delivered at the display surface's size so that detector
//! coordinates and surface coordinates share one pixel space; only drawing
//! mirrors.

use particle_fx::VideoFrame;

use crate::error::SessionError;

// ════════════════════════════════════════════════════════════════════════════
// CameraSource
// ════════════════════════════════════════════════════════════════════════════

pub trait CameraSource {
    /// Whether the environment allows camera access at all.
    fn is_secure(&self) -> bool {
        true
    }

    /// Whether a camera API exists here.
    fn is_supported(&self) -> bool {
        true
    }

    /// Acquire (or re-target) the camera at the given frame size.  Called
    /// again on every window resize.
    fn open(&mut self, width: usize, height: usize) -> Result<(), SessionError>;

    /// Latest frame.  Un-mirrored.
    fn read_frame(&mut self) -> Result<&VideoFrame, SessionError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticCamera — animated test pattern, no hardware
// ════════════════════════════════════════════════════════════════════════════

const GRID: usize = 64;

/// A dim room-like backdrop: vertical gradient, a grid, and a bright bar on
/// the camera's left edge so the mirrored view is easy to verify.  A scan
/// line sweeps down to show the feed is live.
#[derive(Debug, Default)]
pub struct SyntheticCamera {
    backdrop: Option<VideoFrame>,
    frame:    Option<VideoFrame>,
    tick:     usize,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint_backdrop(width: usize, height: usize) -> VideoFrame {
        let mut f = VideoFrame::new(width, height);
        for y in 0..height {
            let t = y as f32 / height.max(1) as f32;
            let r = (24.0 + 40.0 * t) as u32;
            let g = (20.0 + 16.0 * t) as u32;
            let b = (48.0 + 30.0 * (1.0 - t)) as u32;
            for x in 0..width {
                let on_grid = x % GRID == 0 || y % GRID == 0;
                let lift = if on_grid { 18 } else { 0 };
                let edge = if x < width / 40 { 90 } else { 0 };
                f.pixels[y * width + x] = 0xFF000000
                    | ((r + lift + edge).min(255) << 16)
                    | ((g + lift + edge).min(255) << 8)
                    | (b + lift).min(255);
            }
        }
        f
    }
}

impl CameraSource for SyntheticCamera {
    fn open(&mut self, width: usize, height: usize) -> Result<(), SessionError> {
        if width == 0 || height == 0 {
            return Err(SessionError::Device(format!("invalid frame size {}x{}", width, height)));
        }
        let backdrop = Self::paint_backdrop(width, height);
        self.frame = Some(backdrop.clone());
        self.backdrop = Some(backdrop);
        log::info!("[camera] synthetic feed {}x{}", width, height);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<&VideoFrame, SessionError> {
        let (Some(backdrop), Some(frame)) = (self.backdrop.as_ref(), self.frame.as_mut()) else {
            return Err(SessionError::Device("camera not opened".to_string()));
        };

        let w = frame.width;
        let prev = self.tick % frame.height;
        self.tick = self.tick.wrapping_add(1);
        let next = self.tick % frame.height;

        let row = prev * w;
        frame.pixels[row..row + w].copy_from_slice(&backdrop.pixels[row..row + w]);
        let row = next * w;
        for px in &mut frame.pixels[row..row + w] {
            *px |= 0x00303030;
        }
        Ok(&*frame)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// OpenCvCamera — real webcam (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "camera")]
pub use webcam::OpenCvCamera;

#[cfg(feature = "camera")]
mod webcam {
    use opencv::{
        core::{Mat, Size},
        imgproc,
        prelude::*,
        videoio::{self, VideoCapture, VideoCaptureAPIs},
    };

    use super::CameraSource;
    use crate::error::SessionError;
    use particle_fx::VideoFrame;

    /// Requested capture size; frames are resampled to the surface size.
    const IDEAL_W: f64 = 1280.0;
    const IDEAL_H: f64 = 720.0;

    pub struct OpenCvCamera {
        index:   i32,
        capture: Option<VideoCapture>,
        raw:     Mat,
        scaled:  Mat,
        frame:   VideoFrame,
    }

    impl OpenCvCamera {
        pub fn new(index: i32) -> Self {
            OpenCvCamera {
                index,
                capture: None,
                raw:     Mat::default(),
                scaled:  Mat::default(),
                frame:   VideoFrame::new(0, 0),
            }
        }
    }

    fn device(e: opencv::Error) -> SessionError {
        SessionError::Device(e.to_string())
    }

    impl CameraSource for OpenCvCamera {
        fn open(&mut self, width: usize, height: usize) -> Result<(), SessionError> {
            if self.capture.is_none() {
                let mut capture = VideoCapture::new(self.index, VideoCaptureAPIs::CAP_ANY as i32)
                    .map_err(device)?;
                if !capture.is_opened().map_err(device)? {
                    return Err(SessionError::PermissionDenied);
                }
                capture.set(videoio::CAP_PROP_FRAME_WIDTH, IDEAL_W).map_err(device)?;
                capture.set(videoio::CAP_PROP_FRAME_HEIGHT, IDEAL_H).map_err(device)?;
                capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0).map_err(device)?;
                log::info!(
                    "[camera] webcam {} opened at {}x{}",
                    self.index,
                    capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0),
                    capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0),
                );
                self.capture = Some(capture);
            }
            self.frame = VideoFrame::new(width, height);
            Ok(())
        }

        fn read_frame(&mut self) -> Result<&VideoFrame, SessionError> {
            let capture = self
                .capture
                .as_mut()
                .ok_or_else(|| SessionError::Device("camera not opened".to_string()))?;

            capture.read(&mut self.raw).map_err(device)?;
            if self.raw.empty() {
                return Err(SessionError::Device("empty frame received".to_string()));
            }

            let size = Size::new(self.frame.width as i32, self.frame.height as i32);
            imgproc::resize(&self.raw, &mut self.scaled, size, 0.0, 0.0, imgproc::INTER_LINEAR)
                .map_err(device)?;

            let bytes = self.scaled.data_bytes().map_err(device)?;
            for (dst, bgr) in self.frame.pixels.iter_mut().zip(bytes.chunks_exact(3)) {
                *dst = 0xFF000000
                    | (u32::from(bgr[2]) << 16)
                    | (u32::from(bgr[1]) << 8)
                    | u32::from(bgr[0]);
            }
            Ok(&self.frame)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
