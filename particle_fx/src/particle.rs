//! Particles and the store that ages them.
//!
//! A particle lives `max_life` frames.  Each frame the store decrements every
//! life *before* draw parameters are computed, so a particle is first drawn
//! at `max_life - 1` and last drawn at `life == 1`; the pass that takes it to
//! zero also removes it.

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

/// One glyph or label on screen.  `position` is in camera space; the
/// renderer mirrors it at draw time.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position:  Point,
    pub text:      String,
    pub base_size: f32,
    /// Packed ARGB.
    pub color:     u32,
    life:          u32,
    max_life:      u32,
}

impl Particle {
    /// A fresh particle at full life.  A zero lifespan is raised to one.
    pub fn new(position: Point, text: &str, lifespan: u32, base_size: f32, color: u32) -> Self {
        let lifespan = lifespan.max(1);
        Particle {
            position,
            text: text.to_string(),
            base_size,
            color,
            life:     lifespan,
            max_life: lifespan,
        }
    }

    pub fn life(&self)     -> u32 { self.life }
    pub fn max_life(&self) -> u32 { self.max_life }

    /// `life / max_life`, in `[0, 1]`.
    pub fn remaining(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }

    pub fn opacity(&self) -> f32 {
        self.remaining()
    }

    pub fn rendered_size(&self) -> f32 {
        self.base_size * self.remaining()
    }

    /// One frame older.  Returns whether the particle is still alive.
    fn age(&mut self) -> bool {
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PairStyle — what a spawn produces
// ════════════════════════════════════════════════════════════════════════════

/// The fixed look of a spawned pair: a decorative glyph at the anchor and a
/// label at a fixed offset from it.
#[derive(Clone, Debug, PartialEq)]
pub struct PairStyle {
    pub glyph:        String,
    pub glyph_size:   f32,
    pub label:        String,
    pub label_offset: Point,
    pub label_size:   f32,
    /// Frames both particles live.
    pub lifespan:     u32,
}

impl Default for PairStyle {
    fn default() -> Self {
        PairStyle {
            glyph:        "\u{2764}".to_string(),
            glyph_size:   30.0,
            label:        "LOVE".to_string(),
            label_offset: Point::new(0.0, -34.0),
            label_size:   16.0,
            lifespan:     40,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleStore
// ════════════════════════════════════════════════════════════════════════════

/// Insertion-ordered live particles.  Unbounded: steady-state size is
/// `lifespan × spawns per frame`.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a glyph at `anchor` and a label at `anchor + label_offset`.
    /// Both share `color` and the style's lifespan.
    pub fn spawn(&mut self, anchor: Point, style: &PairStyle, color: u32) {
        self.particles.push(Particle::new(
            anchor, &style.glyph, style.lifespan, style.glyph_size, color,
        ));
        self.particles.push(Particle::new(
            anchor.offset(style.label_offset), &style.label, style.lifespan, style.label_size, color,
        ));
    }

    /// Decrement every life and drop particles that reach zero.  Returns how
    /// many were removed.  Must run exactly once per frame.
    pub fn age_and_prune(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain_mut(Particle::age);
        before - self.particles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self)      -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool  { self.particles.is_empty() }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
