//! # particle_fx
//!
//! Ephemeral text particles and the surface they are painted on.
//!
//! * [`particle`] — [`Particle`](particle::Particle) and the
//!   [`ParticleStore`](particle::ParticleStore): spawn in coupled pairs, age
//!   once per frame, drop the frame life hits zero.
//! * [`color`] — HSL → ARGB, random-hue palette, alpha blending.
//! * [`surface`] — the canvas-like [`Surface`](surface::Surface) trait and the
//!   [`VideoFrame`](surface::VideoFrame) image type.
//! * [`framebuffer`] — software [`Surface`](surface::Surface) over a packed
//!   `0xAARRGGBB` pixel buffer, with a scalable bitmap font.

pub mod color;
pub mod particle;
pub mod surface;
pub mod framebuffer;

pub use framebuffer::FrameBuffer;
pub use particle::{PairStyle, Particle, ParticleStore, Point};
pub use surface::{Surface, Transform, VideoFrame};
