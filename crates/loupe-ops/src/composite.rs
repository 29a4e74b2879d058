//! Resampling the source image through the displacement field.
//!
//! For each output pixel, the compositor subtracts the field's shift from
//! the absolute source coordinate and copies the sampled pixel into the
//! output frame. Sampling treats a coordinate of zero as out of bounds
//! (one-based bounds rule), so the first source row and column always
//! resolve to the fully transparent pixel. That rule is part of the visual
//! effect - the lens circle fades into transparent corners - and must stay
//! as it is.
//!
//! When the `parallel` feature is enabled, output rows are resampled with
//! rayon.

use crate::field::DisplacementField;
use loupe_core::{Image, BYTES_PER_PIXEL, TRANSPARENT};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

/// Samples the source image at (x, y) with the one-based bounds rule.
///
/// A coordinate `<= 0` or greater than the respective extent yields the
/// transparent pixel. In-range coordinates read the pixel at flat offset
/// `y * width + x`; a residual offset past the end of the buffer (possible
/// for the bottom row) is transparent as well instead of an unchecked read.
#[inline]
pub fn sample_source(src: &Image, x: i64, y: i64) -> [u8; 4] {
    let w = src.width() as i64;
    let h = src.height() as i64;
    if x <= 0 || x > w || y <= 0 || y > h {
        return TRANSPARENT;
    }
    let offset = (y * w + x) as usize * BYTES_PER_PIXEL;
    match src.data().get(offset..offset + BYTES_PER_PIXEL) {
        Some(px) => [px[0], px[1], px[2], px[3]],
        None => TRANSPARENT,
    }
}

/// Resamples a `size` x `size` region of the source through the field into
/// `dst`, which must hold at least `size` rows of `stride` bytes.
///
/// `top_left` is the region's origin in absolute source coordinates; the
/// field's shift for each output-local pixel is subtracted from it before
/// sampling. The caller guarantees `size` fits both the field and `dst`.
#[cfg(feature = "parallel")]
pub fn resample_region(
    src: &Image,
    field: &DisplacementField,
    top_left: (i32, i32),
    size: u32,
    dst: &mut [u8],
    stride: usize,
) {
    trace!(top_left_x = top_left.0, top_left_y = top_left.1, size, "resample_region");
    let region = &mut dst[..size as usize * stride];
    region
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(oy, row)| {
            resample_row(src, field, top_left, size, oy as u32, row);
        });
}

/// Resamples a `size` x `size` region of the source through the field into
/// `dst` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub fn resample_region(
    src: &Image,
    field: &DisplacementField,
    top_left: (i32, i32),
    size: u32,
    dst: &mut [u8],
    stride: usize,
) {
    trace!(top_left_x = top_left.0, top_left_y = top_left.1, size, "resample_region");
    let region = &mut dst[..size as usize * stride];
    for (oy, row) in region.chunks_mut(stride).enumerate() {
        resample_row(src, field, top_left, size, oy as u32, row);
    }
}

/// Fills one output row.
fn resample_row(
    src: &Image,
    field: &DisplacementField,
    (top_left_x, top_left_y): (i32, i32),
    size: u32,
    oy: u32,
    row: &mut [u8],
) {
    let y = top_left_y as i64 + oy as i64;
    for ox in 0..size {
        let (shift_x, shift_y) = field.shift(ox, oy);
        let sample_x = top_left_x as i64 + ox as i64 - shift_x as i64;
        let sample_y = y - shift_y as i64;
        let px = sample_source(src, sample_x, sample_y);
        let offset = ox as usize * BYTES_PER_PIXEL;
        row[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&px);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::LensParams;

    fn gradient(width: u32, height: u32) -> Image {
        let mut img = Image::zeroed(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                img.set_pixel(x, y, [x as u8, y as u8, 0, 255]);
            }
        }
        img
    }

    #[test]
    fn test_first_row_and_column_transparent() {
        let img = Image::filled(8, 8, [255, 255, 255, 255]).unwrap();
        for i in 0..=8i64 {
            assert_eq!(sample_source(&img, 0, i), TRANSPARENT);
            assert_eq!(sample_source(&img, i, 0), TRANSPARENT);
        }
    }

    #[test]
    fn test_negative_and_past_end_transparent() {
        let img = Image::filled(8, 8, [255, 255, 255, 255]).unwrap();
        assert_eq!(sample_source(&img, -3, 4), TRANSPARENT);
        assert_eq!(sample_source(&img, 4, -3), TRANSPARENT);
        assert_eq!(sample_source(&img, 9, 4), TRANSPARENT);
        assert_eq!(sample_source(&img, 4, 9), TRANSPARENT);
        // Bottom row flat offsets run past the buffer; still transparent.
        assert_eq!(sample_source(&img, 1, 8), TRANSPARENT);
    }

    #[test]
    fn test_in_range_sample_reads_flat_offset() {
        let img = gradient(8, 8);
        assert_eq!(sample_source(&img, 3, 5), [3, 5, 0, 255]);
        assert_eq!(sample_source(&img, 7, 1), [7, 1, 0, 255]);
    }

    #[test]
    fn test_neutral_resample_copies_region() {
        let img = gradient(8, 8);
        let field = DisplacementField::compute(4, 4, LensParams::new(0.0, 1.0));
        let stride = 4 * BYTES_PER_PIXEL;
        let mut dst = vec![0u8; 4 * stride];
        resample_region(&img, &field, (2, 2), 4, &mut dst, stride);
        for oy in 0..4u32 {
            for ox in 0..4u32 {
                let offset = oy as usize * stride + ox as usize * BYTES_PER_PIXEL;
                let expected = [(2 + ox) as u8, (2 + oy) as u8, 0, 255];
                assert_eq!(&dst[offset..offset + 4], &expected, "at ({ox}, {oy})");
            }
        }
    }

    #[test]
    fn test_neutral_resample_at_origin_has_transparent_edges() {
        let img = Image::filled(4, 4, [200, 0, 0, 255]).unwrap();
        let field = DisplacementField::compute(4, 4, LensParams::new(0.0, 1.0));
        let stride = 4 * BYTES_PER_PIXEL;
        let mut dst = vec![1u8; 4 * stride];
        resample_region(&img, &field, (0, 0), 4, &mut dst, stride);
        for i in 0..4usize {
            // Row 0 and column 0 sample coordinate zero: transparent.
            assert_eq!(&dst[i * 4..i * 4 + 4], &TRANSPARENT, "row 0, x {i}");
            assert_eq!(&dst[i * stride..i * stride + 4], &TRANSPARENT, "col 0, y {i}");
        }
        assert_eq!(&dst[stride + 4..stride + 8], &[200, 0, 0, 255]);
    }
}
