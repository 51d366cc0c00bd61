//! Software [`Surface`] over a packed ARGB pixel buffer.
//!
//! Text uses a built-in 5×5 bitmap font scaled by the current font size.
//! Only the text anchor goes through the transform; glyphs themselves are
//! never flipped, so mirrored scenes still read left-to-right.

use crate::color::{blend, OPAQUE};
use crate::surface::{Surface, Transform, VideoFrame};

const BACKGROUND: u32 = 0xFF000000;

/// Glyph cell, in font dots.
const GLYPH_W: usize = 5;
const GLYPH_H: usize = 5;
const ADVANCE: usize = GLYPH_W + 1;

/// Font pixels per dot: a 5-dot cap height is ~70 % of the em size.
const EM_PER_DOT: f32 = 7.0;

pub struct FrameBuffer {
    width:      usize,
    height:     usize,
    buf:        Vec<u32>,
    transform:  Transform,
    saved:      Vec<Transform>,
    fill:       u32,
    alpha:      f32,
    font_px:    f32,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            buf:       vec![BACKGROUND; width * height],
            transform: Transform::IDENTITY,
            saved:     Vec::new(),
            fill:      OPAQUE,
            alpha:     1.0,
            font_px:   10.0,
        }
    }

    /// Reallocate for a new size.  Contents are cleared; drawing state kept.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.buf = vec![BACKGROUND; width * height];
        log::debug!("[framebuffer] resized to {}x{}", width, height);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.buf
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.width + x]
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Opaque rectangle in device pixels, ignoring transform and alpha.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            let start = row * self.width;
            for col in x..(x + w).min(self.width) {
                self.buf[start + col] = color;
            }
        }
    }

    /// Unscaled, opaque text with its top-left corner at device `(x, y)`.
    /// Used for status overlays.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.paint_text(text, x as f32, y as f32, 1.0, color, 1.0);
    }

    /// Width in device pixels of `text` at `dot` pixels per font dot.
    fn text_width(text: &str, dot: f32) -> f32 {
        let n = text.chars().count();
        if n == 0 { return 0.0; }
        (n * ADVANCE - 1) as f32 * dot
    }

    fn paint_text(&mut self, text: &str, left: f32, top: f32, dot: f32, color: u32, alpha: f32) {
        for (i, ch) in text.chars().enumerate() {
            let gx = left + (i * ADVANCE) as f32 * dot;
            if gx >= self.width as f32 { break; }
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                        self.blend_rect(
                            gx + col as f32 * dot,
                            top + row as f32 * dot,
                            dot,
                            color,
                            alpha,
                        );
                    }
                }
            }
        }
    }

    /// Blend a `size`×`size` square at a fractional device position.  A
    /// square that misses the surface paints nothing.
    fn blend_rect(&mut self, x: f32, y: f32, size: f32, color: u32, alpha: f32) {
        let (Some((x0, x1)), Some((y0, y1))) =
            (pixel_span(x, size, self.width), pixel_span(y, size, self.height))
        else {
            return;
        };
        for row in y0..y1 {
            for col in x0..x1 {
                let i = row * self.width + col;
                self.buf[i] = blend(self.buf[i], color, alpha);
            }
        }
    }
}

/// Device pixels covered by `[start, start + size)` along one axis, or
/// `None` when it lies outside `[0, limit)`.  An interval that overlaps the
/// surface always covers at least one pixel.
fn pixel_span(start: f32, size: f32, limit: usize) -> Option<(usize, usize)> {
    let end = start + size;
    if end <= 0.0 || start >= limit as f32 {
        return None;
    }
    let lo = start.floor().max(0.0) as usize;
    let hi = (end.floor() as usize).max(lo + 1).min(limit);
    (hi > lo).then_some((lo, hi))
}

impl Surface for FrameBuffer {
    fn width(&self)  -> usize { self.width }
    fn height(&self) -> usize { self.height }

    fn clear(&mut self) {
        self.buf.fill(BACKGROUND);
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.translated(dx, dy);
    }

    fn scale(&mut self, kx: f32, ky: f32) {
        self.transform = self.transform.scaled(kx, ky);
    }

    fn draw_image(&mut self, image: &VideoFrame, x: f32, y: f32, w: f32, h: f32) {
        if image.is_empty() || w <= 0.0 || h <= 0.0 { return; }

        let (ax, ay) = self.transform.apply(x, y);
        let (bx, by) = self.transform.apply(x + w, y + h);
        let dx0 = ax.min(bx).floor().max(0.0) as usize;
        let dy0 = ay.min(by).floor().max(0.0) as usize;
        let dx1 = (ax.max(bx).ceil().max(0.0) as usize).min(self.width);
        let dy1 = (ay.max(by).ceil().max(0.0) as usize).min(self.height);

        for dy in dy0..dy1 {
            for dx in dx0..dx1 {
                let Some((ux, uy)) = self.transform.invert(dx as f32 + 0.5, dy as f32 + 0.5) else {
                    return;
                };
                let u = (ux - x) / w;
                let v = (uy - y) / h;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) { continue; }

                let sx = ((u * image.width as f32) as usize).min(image.width - 1);
                let sy = ((v * image.height as f32) as usize).min(image.height - 1);
                let i = dy * self.width + dx;
                self.buf[i] = blend(self.buf[i], image.pixel(sx, sy), self.alpha);
            }
        }
    }

    fn set_fill_color(&mut self, color: u32) {
        self.fill = color;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn global_alpha(&self) -> f32 {
        self.alpha
    }

    fn set_font_size(&mut self, px: f32) {
        self.font_px = px.max(0.0);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        if self.font_px <= 0.0 || self.alpha <= 0.0 { return; }
        let dot = (self.font_px / EM_PER_DOT).max(1.0);
        let (cx, baseline) = self.transform.apply(x, y);
        let left = cx - Self::text_width(text, dot) / 2.0;
        let top = baseline - GLYPH_H as f32 * dot;
        self.paint_text(text, left, top, dot, self.fill, self.alpha);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 5×5 bitmap font — one byte per row, bit 4 is the leftmost column
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> [u8; GLYPH_H] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b11111, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b11110],
        'C' => [0b01111, 0b10000, 0b10000, 0b10000, 0b01111],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000],
        'G' => [0b01111, 0b10000, 0b10011, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00111, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b11110, 0b10100, 0b10010],
        'S' => [0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        '0' => [0b01110, 0b10011, 0b10101, 0b11001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b01110],
        '2' => [0b11110, 0b00001, 0b01110, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00110, 0b00001, 0b11110],
        '4' => [0b10010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b11110],
        '6' => [0b01110, 0b10000, 0b11110, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b00100],
        '8' => [0b01110, 0b10001, 0b01110, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b01111, 0b00001, 0b01110],
        ' ' => [0; GLYPH_H],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00100, 0b01000],
        ':' => [0b00000, 0b00100, 0b00000, 0b00100, 0b00000],
        '-' => [0b00000, 0b00000, 0b01110, 0b00000, 0b00000],
        '+' => [0b00000, 0b00100, 0b01110, 0b00100, 0b00000],
        '=' => [0b00000, 0b01110, 0b00000, 0b01110, 0b00000],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b00001, 0b00110, 0b00000, 0b00100],
        '(' => [0b00010, 0b00100, 0b00100, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00100, 0b00100, 0b01000],
        '\'' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000],
        '\u{2764}' | '\u{2665}' => [0b01010, 0b11111, 0b11111, 0b01110, 0b00100],
        '\u{2605}' => [0b00100, 0b11111, 0b01110, 0b01010, 0b10001],
        '\u{2026}' => [0b00000, 0b00000, 0b00000, 0b00000, 0b10101],
        _ => [0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
