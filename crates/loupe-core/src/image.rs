//! RGBA image buffer for lens compositing.
//!
//! [`Image`] is a contiguous, row-major buffer of 32-bit RGBA pixels. It is
//! deliberately less general than a full pipeline image type: the lens
//! compositor only ever works in 8-bit RGBA, so the channel count and
//! component type are fixed rather than generic.
//!
//! # Memory Layout
//!
//! Pixels are stored top-to-bottom, interleaved:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//! ```
//!
//! # Memory Management
//!
//! The byte buffer is stored in an [`Arc<Vec<u8>>`]:
//! - Cloning an [`Image`] is cheap and shares the underlying data
//! - Mutation goes through [`Arc::make_mut`], so a clone taken before a
//!   mutation keeps reading its own generation (copy-on-write)
//!
//! Replacement therefore never produces a dangling read: the old generation
//! is dropped only once the last handle to it goes away.
//!
//! # Example
//!
//! ```rust
//! use loupe_core::Image;
//!
//! let mut img = Image::zeroed(64, 64).unwrap();
//! img.set_pixel(10, 10, [255, 0, 0, 255]);
//! assert_eq!(img.pixel(10, 10), [255, 0, 0, 255]);
//! ```

use crate::{Error, Result};
use std::sync::Arc;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// The fully transparent pixel, all four channel bytes zero.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Owned 32-bit RGBA image buffer.
///
/// Invariant: the buffer length is exactly `width * height * 4` bytes.
/// Construction enforces it; there is no way to resize in place. A new
/// size means a new [`Image`].
#[derive(Clone)]
pub struct Image {
    /// Pixel data (Arc for cheap cloning and generation retention)
    data: Arc<Vec<u8>>,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
}

impl Image {
    /// Computes the byte length for the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either extent is zero or the
    /// multiplication overflows `usize`.
    pub fn byte_len(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "zero extent"));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "byte length overflow"))
    }

    /// Creates a new image filled with transparent black.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for unusable dimensions and
    /// [`Error::AllocationFailed`] if the buffer cannot be reserved. On
    /// failure nothing has been allocated.
    pub fn zeroed(width: u32, height: u32) -> Result<Self> {
        let len = Self::byte_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.resize(len, 0);
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Creates an image by copying the caller's pixel bytes.
    ///
    /// The supplied buffer must be exactly `width * height * 4` bytes; the
    /// length is checked before any copy happens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSizeMismatch`] on a length mismatch,
    /// [`Error::InvalidDimensions`] or [`Error::AllocationFailed`] as for
    /// [`zeroed`](Self::zeroed).
    ///
    /// # Example
    ///
    /// ```rust
    /// use loupe_core::Image;
    ///
    /// let bytes = vec![0u8; 8 * 8 * 4];
    /// let img = Image::from_bytes(8, 8, &bytes).unwrap();
    /// assert_eq!(img.dimensions(), (8, 8));
    /// ```
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let len = Self::byte_len(width, height)?;
        if bytes.len() != len {
            return Err(Error::buffer_size_mismatch(len, bytes.len()));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.extend_from_slice(bytes);
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Creates an image filled with a single pixel value.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Result<Self> {
        let mut img = Self::zeroed(width, height)?;
        img.fill(pixel);
        Ok(img)
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns a reference to the raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable reference to the pixel bytes.
    ///
    /// If the data is shared with a clone, this copies it first so the
    /// clone keeps its generation (copy-on-write).
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Byte offset of the pixel at (x, y).
    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.pixel_offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        px
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.pixel_offset(x, y);
        let data = Arc::make_mut(&mut self.data);
        data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&pixel);
    }

    /// Fills the entire image with a pixel value.
    pub fn fill(&mut self, pixel: [u8; 4]) {
        let data = Arc::make_mut(&mut self.data);
        for chunk in data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&pixel);
        }
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed() {
        let img = Image::zeroed(16, 8).unwrap();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
        assert_eq!(img.data().len(), 16 * 8 * 4);
        assert!(img.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_extent_rejected() {
        assert!(Image::zeroed(0, 10).is_err());
        assert!(Image::zeroed(10, 0).is_err());
    }

    #[test]
    fn test_from_bytes_length_checked() {
        let short = vec![0u8; 10];
        let err = Image::from_bytes(4, 4, &short).unwrap_err();
        assert!(matches!(err, Error::BufferSizeMismatch { expected: 64, got: 10 }));
    }

    #[test]
    fn test_from_bytes_copies() {
        let mut bytes = vec![0u8; 2 * 2 * 4];
        bytes[0..4].copy_from_slice(&[1, 2, 3, 4]);
        let img = Image::from_bytes(2, 2, &bytes).unwrap();
        bytes[0] = 99; // caller buffer is independent after the store
        assert_eq!(img.pixel(0, 0), [1, 2, 3, 4]);
    }

    #[test]
    fn test_set_get_pixel() {
        let mut img = Image::zeroed(8, 8).unwrap();
        img.set_pixel(3, 5, [10, 20, 30, 40]);
        assert_eq!(img.pixel(3, 5), [10, 20, 30, 40]);
        assert_eq!(img.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(8, 0), None);
    }

    #[test]
    fn test_fill() {
        let img = Image::filled(4, 4, [255, 0, 0, 255]).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(img.pixel(x, y), [255, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn test_clone_keeps_generation() {
        let img1 = Image::filled(4, 4, [1, 1, 1, 1]).unwrap();
        let mut img2 = img1.clone();
        img2.set_pixel(0, 0, [9, 9, 9, 9]);
        assert_eq!(img1.pixel(0, 0), [1, 1, 1, 1]);
        assert_eq!(img2.pixel(0, 0), [9, 9, 9, 9]);
    }
}
