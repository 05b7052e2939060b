//! Procedurally generated brush sprites
//!
//! Sprites are square coverage masks sampled bilinearly when stretched over a
//! stamp's bounding box.

use crate::constants::SPRITE_SIZE;

/// Square coverage mask in `0..=1`
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    size: u32,
    coverage: Vec<f32>,
}

impl Sprite {
    /// Build a sprite by evaluating `f(u, v)` at each texel center, `u, v` in `-1..1`
    pub fn from_fn(size: u32, f: impl Fn(f32, f32) -> f32) -> Self {
        let size = size.max(1);
        let mut coverage = Vec::with_capacity((size * size) as usize);
        for py in 0..size {
            for px in 0..size {
                let u = (px as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let v = (py as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                coverage.push(f(u, v).clamp(0.0, 1.0));
            }
        }
        Self { size, coverage }
    }

    /// Soft round airbrush: quadratic falloff to zero at the rim
    pub fn airbrush() -> Self {
        Self::from_fn(SPRITE_SIZE, |u, v| {
            let falloff = hardness_falloff((u * u + v * v).sqrt(), 0.0);
            falloff * falloff
        })
    }

    /// Oblique chisel nib: a thin ellipse rotated 45 degrees with a narrow soft edge
    pub fn fountain_pen() -> Self {
        const ANGLE: f32 = std::f32::consts::FRAC_PI_4;
        const ASPECT: f32 = 0.3;
        const HARDNESS: f32 = 0.85;

        let (sin_a, cos_a) = ANGLE.sin_cos();
        Self::from_fn(SPRITE_SIZE, move |u, v| {
            // Rotate into the nib's frame, then normalize the ellipse onto the unit circle.
            let major = u * cos_a + v * sin_a;
            let minor = (-u * sin_a + v * cos_a) / ASPECT;
            let dist = (major * major + minor * minor).sqrt();
            if dist > 1.0 {
                return 0.0;
            }
            hardness_falloff(dist, HARDNESS)
        })
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.size - 1);
        let y = y.min(self.size - 1);
        self.coverage[(y * self.size + x) as usize]
    }

    /// Bilinear sample at normalized `(s, t)` in `0..1`; zero outside
    pub fn sample(&self, s: f32, t: f32) -> f32 {
        if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
            return 0.0;
        }
        let fx = (s * self.size as f32 - 0.5).max(0.0);
        let fy = (t * self.size as f32 - 0.5).max(0.0);
        let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
        let (tx, ty) = (fx.fract(), fy.fract());

        let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x0 + 1, y0) * tx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - tx) + self.texel(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Falloff for a normalized distance (0 center, 1 rim) and hardness (0 soft, 1 hard)
#[inline]
pub fn hardness_falloff(distance: f32, hardness: f32) -> f32 {
    if distance > 1.0 {
        return 0.0;
    }
    if hardness >= 1.0 {
        return 1.0;
    }
    let t = distance.clamp(0.0, 1.0);
    let hardness = hardness.clamp(0.0, 1.0);
    // Solid core out to `hardness`, linear ramp to the rim.
    if t <= hardness {
        1.0
    } else {
        (1.0 - t) / (1.0 - hardness)
    }
}
