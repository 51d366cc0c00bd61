//! Colors as packed `0xAARRGGBB`.

use rand::Rng;

pub const OPAQUE: u32 = 0xFF00_0000;

/// Convert HSL → packed ARGB (alpha = 0xFF).
///
/// `h` in degrees (wrapped into `[0, 360)`), `s` and `l` in `[0, 1]`.
pub fn hsl_to_argb(h: f32, s: f32, l: f32) -> u32 {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c  = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x  = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u32;
    OPAQUE | (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Uniform hue in `[0, 360)`.
pub fn random_hue<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..360.0)
}

/// A random-hue color at fixed saturation and lightness.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R, saturation: f32, lightness: f32) -> u32 {
    hsl_to_argb(random_hue(rng), saturation, lightness)
}

/// Paint `src` over `dst` with coverage `alpha` (0 → `dst`, 1 → `src`).
/// The result is always opaque.
pub fn blend(dst: u32, src: u32, alpha: f32) -> u32 {
    let a = alpha.clamp(0.0, 1.0);
    if a >= 1.0 { return src | OPAQUE; }
    if a <= 0.0 { return dst | OPAQUE; }
    let mix = |shift: u32| {
        let d = ((dst >> shift) & 0xFF) as f32;
        let s = ((src >> shift) & 0xFF) as f32;
        ((d + (s - d) * a).round() as u32) << shift
    };
    OPAQUE | mix(16) | mix(8) | mix(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn primaries() {
        assert_eq!(hsl_to_argb(0.0,   1.0, 0.5), 0xFFFF0000);
        assert_eq!(hsl_to_argb(120.0, 1.0, 0.5), 0xFF00FF00);
        assert_eq!(hsl_to_argb(240.0, 1.0, 0.5), 0xFF0000FF);
        assert_eq!(hsl_to_argb(360.0, 1.0, 0.5), 0xFFFF0000);
    }

    #[test]
    fn lightness_extremes() {
        assert_eq!(hsl_to_argb(200.0, 1.0, 0.0), 0xFF000000);
        assert_eq!(hsl_to_argb(200.0, 1.0, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn hues_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let h = random_hue(&mut rng);
            assert!((0.0..360.0).contains(&h));
        }
    }

    #[test]
    fn random_colors_are_opaque() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(random_color(&mut rng, 1.0, 0.65) >> 24, 0xFF);
        }
    }

    #[test]
    fn blend_endpoints_and_midpoint() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFFC8C8C8, 0.5), 0xFF646464);
    }
}
