//! Mapping pointer drags to fractional strip selections.
//!
//! A drag happens on a canvas that shows the image, possibly scaled. The
//! selection is stored as fractions of the canvas so it can be applied to the
//! full-resolution image later.
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner of the canvas
//! - (1.0, 1.0) = bottom-right corner
//! - Horizontal selections always span the full width, vertical selections
//!   the full height

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while turning a drag into a selection.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SelectionError {
    /// The drag covered no area after the orientation constraint.
    #[error("Invalid selection - too small or zero size")]
    Degenerate,

    /// The canvas has no usable size.
    #[error("Canvas bounds must be positive, got {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },
}

/// Which kind of strip gets removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Remove a full-width band of rows.
    #[default]
    Horizontal,
    /// Remove a full-height band of columns.
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Lowercase name used in status messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the image is displayed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds of a canvas sized exactly to the image, anchored at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// A selection expressed as fractions (0.0 to 1.0) of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Force the rectangle to span the full axis for `orientation`.
    ///
    /// Horizontal keeps `y`/`height` and sets `x = 0`, `width = 1`. Vertical
    /// keeps `x`/`width` and sets `y = 0`, `height = 1`. Idempotent.
    pub fn constrain(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self {
                x: 0.0,
                width: 1.0,
                ..self
            },
            Orientation::Vertical => Self {
                y: 0.0,
                height: 1.0,
                ..self
            },
        }
    }

    /// True when both sides are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Thickness of the selected band in canvas pixels.
    ///
    /// `canvas_extent` is the canvas height for horizontal selections and the
    /// canvas width for vertical ones.
    pub fn pixel_extent(&self, orientation: Orientation, canvas_extent: f64) -> f64 {
        match orientation {
            Orientation::Horizontal => self.height * canvas_extent,
            Orientation::Vertical => self.width * canvas_extent,
        }
    }
}

/// Convert a two-point drag into an orientation-constrained selection.
///
/// The drag is order independent: the bounding box of `start` and `end` is
/// used. Position and size are mapped into canvas fractions and clamped to
/// [0, 1] before the orientation constraint is applied.
///
/// # Errors
///
/// - `SelectionError::InvalidBounds` if the canvas has no area
/// - `SelectionError::Degenerate` if the constrained rectangle has no area,
///   e.g. a click without a drag
pub fn normalize_selection(
    start: CanvasPoint,
    end: CanvasPoint,
    bounds: CanvasBounds,
    orientation: Orientation,
) -> Result<SelectionRect, SelectionError> {
    // Also rejects NaN
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        return Err(SelectionError::InvalidBounds {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let raw_x = start.x.min(end.x);
    let raw_y = start.y.min(end.y);
    let raw_w = (start.x - end.x).abs();
    let raw_h = (start.y - end.y).abs();

    let rect = SelectionRect {
        x: clamp_unit((raw_x - bounds.x) / bounds.width),
        y: clamp_unit((raw_y - bounds.y) / bounds.height),
        width: clamp_unit(raw_w / bounds.width),
        height: clamp_unit(raw_h / bounds.height),
    }
    .constrain(orientation);

    if !rect.has_area() {
        return Err(SelectionError::Degenerate);
    }
    Ok(rect)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
