//! Random colour items.
//!
//! A [`Color`] is both the identity and the content of a feed row. Colours
//! compare channel by channel on a canonical bit pattern: `-0.0` equals `0.0`
//! and every NaN equals every other NaN, so equality is total and agrees with
//! hashing.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// An RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);

    /// Creates an opaque colour.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a colour with an explicit alpha.
    #[inline]
    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels quantized to 8 bits each.
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(self.a)]
    }

    fn bits(&self) -> [u32; 4] {
        [
            canonical_bits(self.r),
            canonical_bits(self.g),
            canonical_bits(self.b),
            canonical_bits(self.a),
        ]
    }
}

fn canonical_bits(channel: f32) -> u32 {
    if channel == 0.0 {
        0.0f32.to_bits()
    } else if channel.is_nan() {
        f32::NAN.to_bits()
    } else {
        channel.to_bits()
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == u8::MAX {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Produces random opaque colours.
pub struct ColorGenerator {
    rng: StdRng,
}

impl ColorGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a generator with a fixed seed, for reproducible feeds.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One random opaque colour, channels uniform in `[0, 1]`.
    pub fn next_color(&mut self) -> Color {
        Color::from_rgb(
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
            self.rng.gen_range(0.0..=1.0),
        )
    }

    /// `count` pairwise distinct random colours.
    pub fn generate(&mut self, count: usize) -> Vec<Color> {
        let mut seen = HashSet::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        while colors.len() < count {
            let color = self.next_color();
            if seen.insert(color) {
                colors.push(color);
            }
        }
        colors
    }

    /// Shuffles `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for ColorGenerator {
    fn default() -> Self {
        Self::new()
    }
}
