//! # loupe-core
//!
//! Core types for the loupe magnifying-lens compositor.
//!
//! This crate provides the foundation the rest of the workspace builds on:
//!
//! - [`Image`] - Owned 32-bit RGBA pixel buffer with copy-on-write sharing
//! - [`Error`], [`Result`] - Unified error handling for buffer operations
//!
//! ## Crate Structure
//!
//! `loupe-core` has no internal dependencies. The other workspace crates
//! depend on it:
//!
//! ```text
//! loupe-core (this crate)
//!    ^
//!    |
//!    +-- loupe-bmp (BMP output frame)
//!    +-- loupe-ops (displacement field, compositor, session)
//! ```
//!
//! ## Buffer Generations
//!
//! Pixel data lives behind an [`std::sync::Arc`], so cloning an [`Image`] is
//! cheap and a clone taken before a mutation keeps observing the generation
//! it was cloned from. Replacing a buffer never invalidates handles that
//! were handed out earlier.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::{Image, BYTES_PER_PIXEL, TRANSPARENT};
