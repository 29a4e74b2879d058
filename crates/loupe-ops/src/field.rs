//! Displacement field computation.
//!
//! The field maps every output pixel to an integer shift into source
//! coordinates, simulating refraction through a circular lens. The radius
//! is half the output width and the center sits at (radius, radius);
//! outputs are expected to be square (a non-square output keeps the
//! x-derived radius on both axes).
//!
//! For a pixel at distance `d` from the center, the refracted distance is
//!
//! ```text
//! d' = d * (1 - (power / 10000) * d^2) * magnification
//! ```
//!
//! and the shift is the delta to the center plus `d'` re-projected along
//! the pixel's angle. Pixels outside the radius get a zero shift; the
//! compositor's bounds rule then renders the square's corners transparent.
//!
//! When the `parallel` feature is enabled, rows are computed with rayon.

use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Divisor turning the nominal distortion power into the radial coefficient.
const DISTORTION_SCALE: f64 = 10_000.0;

/// Lens parameters: distortion power and magnification.
///
/// The distortion power is nominally in `[-1.0, 1.0]` but larger values are
/// accepted; it is scaled by 1/10000 before entering the radial term.
/// Magnification multiplies the refracted distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LensParams {
    /// Radial distortion power.
    pub distortion: f64,
    /// Multiplicative magnification factor.
    pub magnification: f64,
}

impl LensParams {
    /// Creates lens parameters.
    #[inline]
    pub fn new(distortion: f64, magnification: f64) -> Self {
        Self {
            distortion,
            magnification,
        }
    }
}

impl Default for LensParams {
    /// Neutral lens: unit distortion power, unit magnification.
    fn default() -> Self {
        Self {
            distortion: 1.0,
            magnification: 1.0,
        }
    }
}

/// Two-argument arctangent normalized to `[0, 2π)`.
///
/// Differs from [`f64::atan2`] in two ways: the `y == 0` half-axis cases
/// are pinned (`x >= 0` gives `0`, `x < 0` gives `π`, including `x == 0`),
/// and lower-half-plane results are shifted up by `2π` so the angle is
/// never negative.
#[inline]
pub fn atan2_positive(y: f64, x: f64) -> f64 {
    if y == 0.0 {
        if x >= 0.0 { 0.0 } else { PI }
    } else if y < 0.0 {
        y.atan2(x) + 2.0 * PI
    } else {
        y.atan2(x)
    }
}

/// Precomputed per-pixel displacement table.
///
/// Dimensions equal the output frame's. Replaced wholesale whenever the
/// output size or the lens parameters change; entries are never patched in
/// place.
#[derive(Debug, Clone)]
pub struct DisplacementField {
    shift_x: Vec<i32>,
    shift_y: Vec<i32>,
    width: u32,
    height: u32,
}

impl DisplacementField {
    /// Computes the field for a `width` x `height` output with the given
    /// lens parameters.
    ///
    /// O(width * height). Zero-sized extents produce an empty field.
    pub fn compute(width: u32, height: u32, params: LensParams) -> Self {
        debug!(
            width,
            height,
            distortion = params.distortion,
            magnification = params.magnification,
            "computing displacement field"
        );

        let len = width as usize * height as usize;
        let mut shift_x = vec![0i32; len];
        let mut shift_y = vec![0i32; len];

        // Lens radius and center, both derived from the width.
        let center = (width >> 1) as i64;
        let scaled = params.distortion / DISTORTION_SCALE;
        let magnification = params.magnification;

        let w = width as usize;
        if w > 0 {
            Self::fill(
                &mut shift_x,
                &mut shift_y,
                w,
                center,
                scaled,
                magnification,
            );
        }

        Self {
            shift_x,
            shift_y,
            width,
            height,
        }
    }

    #[cfg(feature = "parallel")]
    fn fill(
        shift_x: &mut [i32],
        shift_y: &mut [i32],
        w: usize,
        center: i64,
        scaled: f64,
        magnification: f64,
    ) {
        shift_x
            .par_chunks_mut(w)
            .zip(shift_y.par_chunks_mut(w))
            .enumerate()
            .for_each(|(y, (row_x, row_y))| {
                Self::fill_row(row_x, row_y, y as i64, center, scaled, magnification);
            });
    }

    #[cfg(not(feature = "parallel"))]
    fn fill(
        shift_x: &mut [i32],
        shift_y: &mut [i32],
        w: usize,
        center: i64,
        scaled: f64,
        magnification: f64,
    ) {
        for (y, (row_x, row_y)) in shift_x.chunks_mut(w).zip(shift_y.chunks_mut(w)).enumerate() {
            Self::fill_row(row_x, row_y, y as i64, center, scaled, magnification);
        }
    }

    /// Computes one output row of shifts.
    fn fill_row(
        row_x: &mut [i32],
        row_y: &mut [i32],
        y: i64,
        center: i64,
        scaled: f64,
        magnification: f64,
    ) {
        let radius = center as f64;
        let dy = center - y;
        for (x, (sx, sy)) in row_x.iter_mut().zip(row_y.iter_mut()).enumerate() {
            let dx = center - x as i64;
            let distance = ((dx * dx + dy * dy) as f64).sqrt();

            // Distortion applies on the lens surface only.
            if distance > radius {
                *sx = 0;
                *sy = 0;
                continue;
            }

            let new_distance =
                distance * (1.0 - scaled * distance * distance) * magnification;
            let angle = atan2_positive((y - center) as f64, (x as i64 - center) as f64);

            *sx = (dx as f64 + angle.cos() * new_distance) as i32;
            *sy = (dy as f64 + angle.sin() * new_distance) as i32;
        }
    }

    /// Returns the shift for the output pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the field.
    #[inline]
    pub fn shift(&self, x: u32, y: u32) -> (i32, i32) {
        debug_assert!(x < self.width && y < self.height, "shift out of bounds");
        let idx = y as usize * self.width as usize + x as usize;
        (self.shift_x[idx], self.shift_y[idx])
    }

    /// Returns the field width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the field height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atan2_positive_half_axes() {
        assert_eq!(atan2_positive(0.0, 5.0), 0.0);
        assert_eq!(atan2_positive(0.0, 0.0), 0.0);
        assert_eq!(atan2_positive(0.0, -5.0), PI);
    }

    #[test]
    fn test_atan2_positive_lower_half_plane() {
        assert_relative_eq!(atan2_positive(-1.0, 0.0), 3.0 * PI / 2.0);
        assert_relative_eq!(atan2_positive(-1.0, -1.0), 5.0 * PI / 4.0);
    }

    #[test]
    fn test_atan2_positive_never_negative() {
        for i in 0..64 {
            let a = i as f64 * PI / 32.0;
            let angle = atan2_positive(a.sin(), a.cos());
            assert!((0.0..2.0 * PI).contains(&angle), "angle {angle} for {a}");
        }
    }

    #[test]
    fn test_outside_radius_is_identity() {
        let field = DisplacementField::compute(16, 16, LensParams::new(800.0, 1.5));
        let center = 8i64;
        for y in 0..16u32 {
            for x in 0..16u32 {
                let dx = center - x as i64;
                let dy = center - y as i64;
                if ((dx * dx + dy * dy) as f64).sqrt() > center as f64 {
                    assert_eq!(field.shift(x, y), (0, 0), "at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_neutral_lens_is_identity() {
        // Zero distortion at unit magnification cancels the radial term.
        let field = DisplacementField::compute(8, 8, LensParams::new(0.0, 1.0));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(field.shift(x, y), (0, 0), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_magnification_shifts() {
        // 8x8, radius 4, magnification 3: hand-computed entries.
        let field = DisplacementField::compute(8, 8, LensParams::new(0.0, 3.0));
        // (3,4): d=(1,0), distance 1, d'=3, angle pi -> shift (1-3, 0)
        assert_eq!(field.shift(3, 4), (-2, 0));
        // (2,4): d=(2,0), distance 2, d'=6 -> shift (2-6, 0)
        assert_eq!(field.shift(2, 4), (-4, 0));
        // (4,6): d=(0,-2), distance 2, d'=6, angle pi/2 -> shift (0, -2+6)
        assert_eq!(field.shift(4, 6), (0, 4));
    }

    #[test]
    fn test_distortion_shifts() {
        // 16x16, radius 8, power 500 -> coefficient 0.05.
        let field = DisplacementField::compute(16, 16, LensParams::new(500.0, 1.0));
        // (4,8): d=(4,0), distance 4, d' = 4*(1-0.05*16) = 0.8 -> trunc(4-0.8) = 3
        assert_eq!(field.shift(4, 8), (3, 0));
        // (8,2): d=(0,6), distance 6, d' = 6*(1-0.05*36) = -4.8 -> trunc(6+4.8) = 10
        assert_eq!(field.shift(8, 2), (0, 10));
        // (2,2): distance sqrt(72) > 8, outside the lens
        assert_eq!(field.shift(2, 2), (0, 0));
    }

    #[test]
    fn test_field_dimensions() {
        let field = DisplacementField::compute(6, 4, LensParams::default());
        assert_eq!(field.width(), 6);
        assert_eq!(field.height(), 4);
    }
}
