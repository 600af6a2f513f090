//! Linear RGB color and packed pixel conversion.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, MulAssign};

use crate::Interval;

/// Range a scaled channel is clamped to before packing.
const CHANNEL_RANGE: Interval = Interval {
    min: 0.0,
    max: 255.0,
};

/// Linear RGB color.
///
/// Channels are not clamped; sums of samples routinely exceed 1.0 until they
/// are divided by the sample count and packed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `t`.
    #[inline]
    pub fn scale(self, t: f64) -> Self {
        Self::new(self.r * t, self.g * t, self.b * t)
    }

    /// Linear blend, `self` at t = 0 and `other` at t = 1.
    #[inline]
    pub fn lerp(self, other: Color, t: f64) -> Self {
        self.scale(1.0 - t) + other.scale(t)
    }

    /// Gamma 2 transfer (square root per channel). Negative channels map to 0.
    pub fn gamma_corrected(self) -> Self {
        Self::new(linear_to_gamma(self.r), linear_to_gamma(self.g), linear_to_gamma(self.b))
    }

    /// Pack into `0x00RRGGBB`.
    ///
    /// Each channel maps to `clamp(floor(v * 255.99), 0, 255)`, so anything at
    /// or above ~0.996 saturates to 255.
    pub fn pixel_value(&self) -> u32 {
        let r = channel_to_byte(self.r);
        let g = channel_to_byte(self.g);
        let b = channel_to_byte(self.b);
        (r << 16) | (g << 8) | b
    }
}

#[inline]
fn channel_to_byte(v: f64) -> u32 {
    CHANNEL_RANGE.clamp((v * 255.99).floor()) as u32
}

#[inline]
fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Decode a packed pixel into `[r, g, b]` bytes. The top byte is ignored.
#[inline]
pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [
        ((pixel >> 16) & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        (pixel & 0xFF) as u8,
    ]
}

impl Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    #[inline]
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Component-wise product, used to compound attenuation along a path.
impl Mul for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign for Color {
    #[inline]
    fn mul_assign(&mut self, rhs: Color) {
        *self = *self * rhs;
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    #[inline]
    fn mul(self, t: f64) -> Color {
        self.scale(t)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    #[inline]
    fn mul(self, c: Color) -> Color {
        c.scale(self)
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::BLACK, Add::add)
    }
}
