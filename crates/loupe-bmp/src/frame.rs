//! The output frame: header plus pixel payload in one buffer.

use crate::header::{build_header, HEADER_SIZE};
use loupe_core::{Error, Image, Result, BYTES_PER_PIXEL};
use std::sync::Arc;

/// An allocated output buffer: 122 header bytes followed by
/// `width * height * 4` RGBA pixel bytes, zero-initialized.
///
/// The whole buffer lives behind an [`Arc`], so a clone of the frame is a
/// generation handle: if the compositor rewrites the pixels afterwards, the
/// clone keeps observing the bytes it was created from (copy-on-write via
/// [`Arc::make_mut`]). A caller that wants to hold on to an extracted
/// bitmap across the next extraction clones the frame instead of borrowing
/// the bytes.
#[derive(Clone)]
pub struct Frame {
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Allocates a zeroed frame for the given extents and writes its header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for zero or overflowing extents
    /// and [`Error::AllocationFailed`] if the buffer cannot be reserved.
    /// Nothing is allocated on failure, so the caller's previous frame (if
    /// any) is still intact.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixel_len = Image::byte_len(width, height)?;
        let total = pixel_len
            .checked_add(HEADER_SIZE)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "frame length overflow"))?;
        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|e| Error::allocation_failed(total, e.to_string()))?;
        data.resize(total, 0);
        data[..HEADER_SIZE].copy_from_slice(&build_header(width, height));
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Returns the frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the entire buffer, header included. This is the payload the
    /// host transmits.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the header portion.
    #[inline]
    pub fn header(&self) -> &[u8] {
        &self.data[..HEADER_SIZE]
    }

    /// Returns the pixel portion, after the header.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data[HEADER_SIZE..]
    }

    /// Returns the pixel portion mutably.
    ///
    /// If a clone of this frame is still alive, the buffer is copied first
    /// so the clone keeps its generation.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut Arc::make_mut(&mut self.data)[HEADER_SIZE..]
    }

    /// Bytes per pixel row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}
