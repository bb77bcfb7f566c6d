//! Image transformation operations.
//!
//! # Coordinate System
//!
//! - Selections are normalized (0.0 to 1.0) relative to image dimensions
//! - Origin is top-left corner
//! - Fractions map to pixels by flooring, never by rounding

mod strip;

pub use strip::{cut_range, remove_strip, CutRange, StripError};
