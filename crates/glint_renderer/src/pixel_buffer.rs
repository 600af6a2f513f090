//! Shared packed-pixel output buffer.

use std::sync::atomic::{AtomicU32, Ordering};

/// Slot of column `x` in buffer row `row`, computed in `usize` so large
/// frames do not wrap.
pub(crate) fn pixel_index(x: u32, row: u32, width: u32) -> usize {
    row as usize * width as usize + x as usize
}

/// Row-major `0x00RRGGBB` pixels, top row first.
///
/// Each slot is written by at most one worker at a time; readers (a live
/// display, the final save) may observe a frame mid-update. No lock is taken.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Packed value at `index`.
    pub fn get(&self, index: usize) -> u32 {
        self.pixels[index].load(Ordering::Relaxed)
    }

    pub(crate) fn store(&self, index: usize, value: u32) {
        self.pixels[index].store(value, Ordering::Relaxed);
    }

    /// Copy out the current contents.
    pub fn snapshot(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_black() {
        let buffer = PixelBuffer::new(3, 2);
        assert_eq!(buffer.len(), 6);
        assert!(!buffer.is_empty());
        assert!(buffer.snapshot().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_store_and_get() {
        let buffer = PixelBuffer::new(3, 2);
        buffer.store(4, 0x123456);
        assert_eq!(buffer.get(4), 0x123456);
        assert_eq!(buffer.get(pixel_index(1, 1, 3)), 0x123456);
        assert_eq!(buffer.snapshot()[4], 0x123456);
    }

    #[test]
    fn test_pixel_index_does_not_wrap() {
        // 70000 * 70000 exceeds u32::MAX
        assert_eq!(pixel_index(69_999, 69_999, 70_000), 4_899_999_999);
        assert_eq!(pixel_index(2, 1, 3), 5);
    }
}
