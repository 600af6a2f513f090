//! Consumers of the packed pixel buffer: live display and image files.

use std::path::Path;

use glint_math::unpack_rgb;
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use crate::pixel_buffer::pixel_index;

/// Errors that can occur while writing a finished image.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("buffer holds {actual} pixels but {width}x{height} needs {expected}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Shows a (possibly half-written) frame. Reports nothing back.
pub trait DisplaySink {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32);
}

/// Writes a finished frame somewhere durable.
pub trait PersistenceSink {
    fn persist(
        &self,
        pixels: &[u32],
        width: u32,
        height: u32,
        destination: &Path,
    ) -> Result<(), SinkError>;
}

/// Saves through the `image` crate; the format follows the file extension,
/// PNG when there is none.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileSink;

impl PersistenceSink for ImageFileSink {
    fn persist(
        &self,
        pixels: &[u32],
        width: u32,
        height: u32,
        destination: &Path,
    ) -> Result<(), SinkError> {
        let image = to_rgb_image(pixels, width, height)?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match destination.extension() {
            Some(_) => image.save(destination)?,
            None => image.save_with_format(destination, ImageFormat::Png)?,
        }
        log::info!("Saved {}x{} image to {}", width, height, destination.display());
        Ok(())
    }
}

/// Decode a row-major packed buffer into an RGB image.
pub fn to_rgb_image(pixels: &[u32], width: u32, height: u32) -> Result<RgbImage, SinkError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(SinkError::SizeMismatch {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }

    Ok(RgbImage::from_fn(width, height, |x, y| {
        Rgb(unpack_rgb(pixels[pixel_index(x, y, width)]))
    }))
}
