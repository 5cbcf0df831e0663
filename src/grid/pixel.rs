//! Pixel values with discrete opacity levels.
//!
//! A pixel carries three 8-bit color channels and one of five opacity
//! levels. Arbitrary alpha values are quantized to the nearest level on the
//! way in, so every pixel in a grid is always in a valid state.

use serde::{Deserialize, Serialize};

/// Discrete opacity level of a pixel.
///
/// Levels are ordered from fully transparent to fully opaque, so
/// `opacity >= Opacity::Half` reads as "at least half covered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opacity {
    #[default]
    Transparent,
    Quarter,
    Half,
    ThreeQuarter,
    Opaque,
}

impl Opacity {
    /// All levels, from transparent to opaque.
    pub const LEVELS: [Opacity; 5] = [
        Opacity::Transparent,
        Opacity::Quarter,
        Opacity::Half,
        Opacity::ThreeQuarter,
        Opacity::Opaque,
    ];

    /// 8-bit alpha value of this level.
    #[inline]
    pub fn alpha(self) -> u8 {
        match self {
            Opacity::Transparent => 0,
            Opacity::Quarter => 64,
            Opacity::Half => 128,
            Opacity::ThreeQuarter => 191,
            Opacity::Opaque => 255,
        }
    }

    /// Quantize an 8-bit alpha value to the nearest level.
    ///
    /// Ties resolve to the more transparent level.
    pub fn from_alpha(alpha: u8) -> Self {
        let mut best = Opacity::Transparent;
        let mut best_dist = u8::MAX;
        for level in Self::LEVELS {
            let dist = level.alpha().abs_diff(alpha);
            if dist < best_dist {
                best = level;
                best_dist = dist;
            }
        }
        best
    }

    /// Quantize a coverage fraction (0.0-1.0) to the nearest level.
    pub fn from_fraction(fraction: f32) -> Self {
        let clamped = fraction.clamp(0.0, 1.0);
        Self::from_alpha((clamped * 255.0).round() as u8)
    }
}

fn opaque() -> Opacity {
    Opacity::Opaque
}

/// RGB pixel with a discrete opacity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub opacity: Opacity,
}

impl Pixel {
    /// Black and fully transparent; the value of a cleared cell.
    pub const CLEAR: Pixel = Pixel::new(0, 0, 0, Opacity::Transparent);
    pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
    pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, opacity: Opacity) -> Self {
        Self { r, g, b, opacity }
    }

    /// Fully opaque pixel.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, Opacity::Opaque)
    }

    /// Build from 8-bit RGBA, quantizing alpha.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r, g, b, Opacity::from_alpha(a))
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.opacity.alpha()]
    }

    pub fn with_opacity(self, opacity: Opacity) -> Self {
        Self { opacity, ..self }
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.opacity == Opacity::Opaque
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.opacity == Opacity::Transparent
    }

    /// Dissimilarity between two pixels.
    ///
    /// Sum of absolute channel differences, with the opacity level's alpha
    /// value counted as a fourth channel. Symmetric, and zero only for
    /// identical pixels. Opaque black vs opaque white is 765.
    #[inline]
    pub fn delta(self, other: Pixel) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
            + self.opacity.alpha().abs_diff(other.opacity.alpha()) as u32
    }
}

/// Running channel sums used to average pixels.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PixelAccumulator {
    r: u64,
    g: u64,
    b: u64,
    a: u64,
    count: u64,
}

impl PixelAccumulator {
    #[inline]
    pub(crate) fn add(&mut self, pixel: Pixel) {
        self.r += pixel.r as u64;
        self.g += pixel.g as u64;
        self.b += pixel.b as u64;
        self.a += pixel.opacity.alpha() as u64;
        self.count += 1;
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// Rounded channel-wise mean, `None` when nothing was added.
    pub(crate) fn mean(&self) -> Option<Pixel> {
        if self.count == 0 {
            return None;
        }
        let n = self.count;
        let avg = |sum: u64| ((sum + n / 2) / n).min(255) as u8;
        Some(Pixel::from_rgba(avg(self.r), avg(self.g), avg(self.b), avg(self.a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_black_white() {
        assert_eq!(Pixel::BLACK.delta(Pixel::WHITE), 765);
        assert_eq!(Pixel::WHITE.delta(Pixel::BLACK), 765);
    }

    #[test]
    fn test_delta_symmetric_and_zero_on_self() {
        let samples = [
            Pixel::CLEAR,
            Pixel::rgb(10, 200, 30),
            Pixel::new(255, 0, 128, Opacity::Quarter),
            Pixel::new(1, 2, 3, Opacity::ThreeQuarter),
        ];
        for a in samples {
            assert_eq!(a.delta(a), 0);
            for b in samples {
                assert_eq!(a.delta(b), b.delta(a));
            }
        }
    }

    #[test]
    fn test_delta_counts_opacity() {
        let a = Pixel::rgb(40, 40, 40);
        let b = a.with_opacity(Opacity::Half);
        assert_eq!(a.delta(b), 127);
    }

    #[test]
    fn test_alpha_quantization() {
        assert_eq!(Opacity::from_alpha(0), Opacity::Transparent);
        assert_eq!(Opacity::from_alpha(40), Opacity::Quarter);
        assert_eq!(Opacity::from_alpha(100), Opacity::Half);
        assert_eq!(Opacity::from_alpha(200), Opacity::ThreeQuarter);
        assert_eq!(Opacity::from_alpha(250), Opacity::Opaque);
        for level in Opacity::LEVELS {
            assert_eq!(Opacity::from_alpha(level.alpha()), level);
        }
    }

    #[test]
    fn test_opacity_ordering() {
        assert!(Opacity::Opaque > Opacity::ThreeQuarter);
        assert!(Opacity::Quarter >= Opacity::Transparent);
    }

    #[test]
    fn test_accumulator_mean() {
        let mut acc = PixelAccumulator::default();
        assert!(acc.mean().is_none());
        acc.add(Pixel::rgb(10, 20, 30));
        acc.add(Pixel::rgb(20, 40, 60));
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.mean(), Some(Pixel::rgb(15, 30, 45)));
    }
}
