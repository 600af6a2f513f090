//! Scanline work units for the progressive renderer.
//!
//! A scanline owns the accumulation state of every pixel in one image row.
//! Units are moved to exactly one worker per pass, so a pixel's state is
//! never touched by two workers at once.

use glint_math::Color;
use rand::RngCore;

use crate::pixel_buffer::{pixel_index, PixelBuffer};
use crate::renderer::render_pixel;
use crate::scene::Scene;

/// Running estimate for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelState {
    /// Column, 0 on the left
    pub x: u32,
    /// Image-plane row, 0 at the bottom
    pub y: u32,
    /// Slot in the pixel buffer
    pub index: usize,
    /// Sum of every sample so far (not averaged)
    pub accumulated: Color,
    /// Number of samples in `accumulated`
    pub samples: u32,
}

impl PixelState {
    pub fn new(x: u32, y: u32, index: usize) -> Self {
        Self {
            x,
            y,
            index,
            accumulated: Color::BLACK,
            samples: 0,
        }
    }

    /// Mean of the samples so far, if any.
    pub fn average(&self) -> Option<Color> {
        (self.samples > 0).then(|| self.accumulated.scale(1.0 / self.samples as f64))
    }

    /// Previous estimate without gamma correction.
    ///
    /// Darker than the finished value, which makes rows still being worked on
    /// stand out on a live display.
    pub fn preview_value(&self) -> Option<u32> {
        self.average().map(|c| c.pixel_value())
    }

    /// Averaged and gamma corrected estimate.
    pub fn display_value(&self) -> u32 {
        self.average()
            .map_or(0, |c| c.gamma_corrected().pixel_value())
    }
}

/// One image row; the unit of work handed to a worker.
#[derive(Debug, Clone)]
pub struct Scanline {
    /// Buffer row, 0 at the top of the image
    pub row: u32,
    pub pixels: Vec<PixelState>,
}

/// Split the image into one scanline per row, top row first.
///
/// The camera's `t` grows upward while the buffer is stored top-down, so
/// buffer row `r` samples image-plane row `height - 1 - r`.
pub fn generate_scanlines(width: u32, height: u32) -> Vec<Scanline> {
    (0..height)
        .map(|row| {
            let y = height - 1 - row;
            let pixels = (0..width)
                .map(|x| PixelState::new(x, y, pixel_index(x, row, width)))
                .collect();
            Scanline { row, pixels }
        })
        .collect()
}

/// Run one pass over a scanline.
///
/// First re-emits each pixel's previous estimate, then draws `samples` new
/// samples per pixel and writes the refined value.
pub fn render_scanline(
    scanline: &mut Scanline,
    scene: &Scene,
    samples: u32,
    pixels: &PixelBuffer,
    rng: &mut dyn RngCore,
) {
    for pixel in &scanline.pixels {
        if let Some(value) = pixel.preview_value() {
            pixels.store(pixel.index, value);
        }
    }

    for pixel in &mut scanline.pixels {
        let value = render_pixel(scene, pixel, samples, rng);
        pixels.store(pixel.index, value);
    }
}
