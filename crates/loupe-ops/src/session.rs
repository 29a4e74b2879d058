//! The owning lens session.
//!
//! [`LensSession`] is the call surface the embedding host drives. It owns
//! the lens parameters, the stored source image, the prepared output frame
//! and the displacement field, replacing the original design's process-wide
//! globals so independent sessions can coexist and tests run in isolation.
//!
//! Every operation takes `&mut self`; the single-caller discipline the
//! design asks for is enforced by the borrow checker rather than by locks.

use crate::composite::resample_region;
use crate::field::{DisplacementField, LensParams};
use crate::{OpsError, OpsResult};
use loupe_bmp::Frame;
use loupe_core::Image;
use tracing::debug;

/// Owning context for one magnifying-lens instance.
///
/// The expected call order is: [`set_parameters`](Self::set_parameters),
/// [`prepare_output`](Self::prepare_output),
/// [`store_source`](Self::store_source), then any number of
/// [`extract_region`](Self::extract_region) calls, and finally
/// [`release`](Self::release). Parameters and source may be updated between
/// extractions; the field is recomputed when the output size or the
/// parameters change.
#[derive(Debug, Default)]
pub struct LensSession {
    params: LensParams,
    source: Option<Image>,
    frame: Option<Frame>,
    field: Option<DisplacementField>,
}

impl LensSession {
    /// Creates an empty session with neutral lens parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current lens parameters.
    #[inline]
    pub fn params(&self) -> LensParams {
        self.params
    }

    /// Returns the prepared output frame, if any.
    #[inline]
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Returns the current displacement field, if any.
    #[inline]
    pub fn field(&self) -> Option<&DisplacementField> {
        self.field.as_ref()
    }

    /// Updates the lens parameters without touching the field.
    ///
    /// The new values take effect at the next [`prepare_output`]
    /// (or immediately via [`update_parameters`]).
    ///
    /// [`prepare_output`]: Self::prepare_output
    /// [`update_parameters`]: Self::update_parameters
    pub fn set_parameters(&mut self, distortion: f64, magnification: f64) {
        self.params = LensParams::new(distortion, magnification);
    }

    /// Updates the lens parameters and recomputes the field right away if
    /// an output is prepared; otherwise behaves like
    /// [`set_parameters`](Self::set_parameters).
    pub fn update_parameters(&mut self, distortion: f64, magnification: f64) {
        self.params = LensParams::new(distortion, magnification);
        if let Some(frame) = &self.frame {
            self.field = Some(DisplacementField::compute(
                frame.width(),
                frame.height(),
                self.params,
            ));
        }
    }

    /// Replaces the source image with a copy of the caller's pixel buffer.
    ///
    /// The buffer must be exactly `width * height * 4` bytes. The previous
    /// source is released only after the new one is fully constructed, so a
    /// failed store leaves the old image in place.
    ///
    /// # Errors
    ///
    /// [`OpsError::Core`] for a length mismatch, unusable dimensions, or
    /// allocation failure.
    pub fn store_source(&mut self, width: u32, height: u32, buffer: &[u8]) -> OpsResult<()> {
        let image = Image::from_bytes(width, height, buffer)?;
        debug!(width, height, "source image stored");
        self.source = Some(image);
        Ok(())
    }

    /// Allocates the output frame (header plus zeroed pixels) and
    /// recomputes the displacement field for the new size using the current
    /// parameters.
    ///
    /// Output regions are expected to be square; the lens radius and both
    /// center axes derive from `width`.
    ///
    /// # Errors
    ///
    /// [`OpsError::Core`] for unusable dimensions or allocation failure; on
    /// error the previous frame and field stay valid.
    pub fn prepare_output(&mut self, width: u32, height: u32) -> OpsResult<()> {
        let frame = Frame::new(width, height)?;
        let field = DisplacementField::compute(width, height, self.params);
        debug!(width, height, "output frame prepared");
        self.frame = Some(frame);
        self.field = Some(field);
        Ok(())
    }

    /// Extracts the lens-distorted `size` x `size` region whose top-left
    /// corner sits at (`top_left_x`, `top_left_y`) in source coordinates.
    ///
    /// Returns the transmit-ready output buffer: the 122-byte header
    /// followed by the resampled pixels. The buffer stays owned by the
    /// session; to keep a generation across later calls, clone the
    /// [`frame`](Self::frame) instead of holding the slice.
    ///
    /// # Errors
    ///
    /// [`OpsError::NotReady`] if no output was prepared or no source
    /// stored; [`OpsError::RegionOutOfBounds`] if `size` is zero or exceeds
    /// the prepared output.
    pub fn extract_region(
        &mut self,
        top_left_x: i32,
        top_left_y: i32,
        size: u32,
    ) -> OpsResult<&[u8]> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| OpsError::NotReady("no source image stored".into()))?;
        let field = self
            .field
            .as_ref()
            .ok_or_else(|| OpsError::NotReady("no displacement field computed".into()))?;
        let frame = self
            .frame
            .as_mut()
            .ok_or_else(|| OpsError::NotReady("no output frame prepared".into()))?;

        if size == 0 || size > frame.width() || size > frame.height() {
            return Err(OpsError::RegionOutOfBounds(format!(
                "size {} does not fit output {}x{}",
                size,
                frame.width(),
                frame.height()
            )));
        }

        let stride = frame.stride();
        resample_region(
            source,
            field,
            (top_left_x, top_left_y),
            size,
            frame.pixels_mut(),
            stride,
        );
        Ok(frame.bytes())
    }

    /// Frees the source image, the output frame and the displacement field.
    ///
    /// Parameters are kept. Safe to call repeatedly; an already empty
    /// session stays empty.
    pub fn release(&mut self) {
        debug!("lens session released");
        self.source = None;
        self.frame = None;
        self.field = None;
    }
}
