//! The drawing-surface capability.
//!
//! Modelled on a 2D canvas context: a current axis-aligned transform with a
//! save/restore stack, a fill color, a global alpha, and a font size.

// ════════════════════════════════════════════════════════════════════════════
// VideoFrame
// ════════════════════════════════════════════════════════════════════════════

/// One camera image, packed `0xAARRGGBB`, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl VideoFrame {
    pub fn new(width: usize, height: usize) -> Self {
        VideoFrame { width, height, pixels: vec![0xFF000000; width * height] }
    }

    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        VideoFrame { width, height, pixels: vec![color; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned affine map: `device = (sx·x + tx, sy·y + ty)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { sx: 1.0, sy: 1.0, tx: 0.0, ty: 0.0 };

    /// Pre-multiply a translation (canvas `translate` semantics).
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Transform { tx: self.tx + self.sx * dx, ty: self.ty + self.sy * dy, ..self }
    }

    /// Pre-multiply a scale (canvas `scale` semantics).
    pub fn scaled(self, kx: f32, ky: f32) -> Self {
        Transform { sx: self.sx * kx, sy: self.sy * ky, ..self }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// Device → user.  `None` if either axis is collapsed.
    pub fn invert(&self, dx: f32, dy: f32) -> Option<(f32, f32)> {
        if self.sx == 0.0 || self.sy == 0.0 {
            return None;
        }
        Some(((dx - self.tx) / self.sx, (dy - self.ty) / self.sy))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Surface
// ════════════════════════════════════════════════════════════════════════════

/// A canvas-like target.  Coordinates passed to drawing calls are user
/// space; the current transform maps them to device pixels.
pub trait Surface {
    fn width(&self)  -> usize;
    fn height(&self) -> usize;

    /// Fill the whole surface with the background color, ignoring the
    /// transform and alpha.
    fn clear(&mut self);

    /// Push the current transform.
    fn save(&mut self);
    /// Pop the most recently saved transform.  No-op on an empty stack.
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, kx: f32, ky: f32);

    /// Draw `image` stretched into the user-space rectangle.
    fn draw_image(&mut self, image: &VideoFrame, x: f32, y: f32, w: f32, h: f32);

    fn set_fill_color(&mut self, color: u32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn global_alpha(&self) -> f32;
    fn set_font_size(&mut self, px: f32);

    /// Draw `text` horizontally centered on `x` with its baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_transform_flips_x() {
        let width = 640.0;
        let t = Transform::IDENTITY.translated(width, 0.0).scaled(-1.0, 1.0);
        assert_eq!(t.apply(0.0, 10.0), (640.0, 10.0));
        assert_eq!(t.apply(400.0, 300.0), (240.0, 300.0));
        assert_eq!(t.invert(240.0, 300.0), Some((400.0, 300.0)));
    }

    #[test]
    fn collapsed_transform_has_no_inverse() {
        let t = Transform::IDENTITY.scaled(0.0, 1.0);
        assert_eq!(t.invert(1.0, 1.0), None);
    }
}
