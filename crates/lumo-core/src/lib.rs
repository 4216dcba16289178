//! Core types for the lumo GPU compute tools.
//!
//! Provides the host-side data model shared by every crate in the
//! workspace:
//!
//! - [`Image`] - an 8-bit pixel grid (grayscale or RGB)
//! - [`Histogram`] - 256-bin per-intensity pixel counts
//! - [`CumulativeHistogram`] - running totals of a histogram
//! - [`Lut`] - a per-intensity remapping table for contrast adjustment
//!
//! The histogram and LUT types carry CPU reference implementations
//! (rayon-parallel) used by tests and by callers that want to verify
//! GPU results against a known-good path.

pub mod error;
pub mod histogram;
pub mod image;

pub use error::{Error, Result};
pub use histogram::{BIN_COUNT, CumulativeHistogram, Histogram, Lut};
pub use image::Image;
