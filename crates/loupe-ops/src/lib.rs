//! # loupe-ops
//!
//! The algorithmic core of the loupe magnifying-lens compositor.
//!
//! A circular lens over a source image is simulated in three steps:
//!
//! 1. [`field`] - precompute a per-pixel displacement table from the lens
//!    radius, distortion power and magnification
//! 2. [`composite`] - resample the source image through that table into the
//!    output frame, with transparent out-of-bounds sampling
//! 3. [`session`] - the owning context that ties parameters, source image,
//!    output frame and field together behind one call surface
//!
//! # Example
//!
//! ```rust
//! use loupe_ops::LensSession;
//!
//! let mut session = LensSession::new();
//! session.set_parameters(500.0, 1.2);
//! session.prepare_output(64, 64).unwrap();
//! session.store_source(128, 128, &vec![255u8; 128 * 128 * 4]).unwrap();
//! let bitmap = session.extract_region(32, 32, 64).unwrap();
//! assert_eq!(&bitmap[0..2], b"BM");
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - row-parallel field computation and resampling via rayon
//!   (enabled by default)
//! - `serde` - serialization for [`LensParams`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod composite;
pub mod field;
pub mod session;

pub use error::{OpsError, OpsResult};
pub use field::{DisplacementField, LensParams};
pub use session::LensSession;
