//! Strip removal and rejoin.
//!
//! Removes a full-width band of rows (horizontal mode) or a full-height band
//! of columns (vertical mode) and slides the remainder over so the two kept
//! regions touch.
//!
//! # Pixel Mapping
//!
//! Fractions are mapped to pixels with `floor`, then clamped to the image:
//!
//! - `start = floor(fraction_start * extent)`
//! - `end = start + floor(fraction_length * extent)`
//!
//! Everything before `start` keeps its coordinates. Everything from `end`
//! onwards moves back by `end - start`. Pixels are copied verbatim.

use thiserror::Error;

use crate::decode::{DecodedImage, BYTES_PER_PIXEL};
use crate::selection::{Orientation, SelectionRect};

/// Errors from [`remove_strip`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StripError {
    /// The selection has no area. Callers should reject these before
    /// processing.
    #[error("Invalid selection: {width}x{height} has no area")]
    InvalidSelection { width: f64, height: f64 },

    /// The pixel buffer does not match the image dimensions.
    #[error("Invalid image buffer: expected {expected} bytes, got {actual}")]
    InvalidImage { expected: usize, actual: usize },
}

/// A half-open pixel range `[start, end)` along the cut axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutRange {
    pub start: u32,
    pub end: u32,
}

impl CutRange {
    /// Number of rows or columns removed.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Relative distance below which a scaled fraction counts as a whole pixel.
const SNAP_EPSILON: f64 = 1e-9;

/// Map a fractional span onto `extent` pixels.
///
/// Both ends are clamped to `[0, extent]` and `end` is never below `start`.
/// A fraction of the form `k / extent` maps back to exactly `k`, even when
/// the product lands a rounding error below it.
pub fn cut_range(extent: u32, start_fraction: f64, length_fraction: f64) -> CutRange {
    let extent_f = f64::from(extent);
    // `as` saturates and maps NaN to 0
    let start = floor_snapped(start_fraction * extent_f) as i64;
    let length = floor_snapped(length_fraction * extent_f) as i64;
    let end = start.saturating_add(length);

    let clamp = |v: i64| v.clamp(0, i64::from(extent)) as u32;
    let start = clamp(start);
    let end = clamp(end).max(start);

    CutRange { start, end }
}

fn floor_snapped(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= SNAP_EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value.floor()
    }
}

/// Remove the selected strip from `image` and join the remaining parts.
///
/// The source is not modified. When the selection maps to zero pixels, or
/// to every row/column of the image, a clone of the source is returned
/// instead of an empty image.
///
/// # Arguments
///
/// * `image` - Source image
/// * `rect` - Orientation-constrained fractional selection
/// * `orientation` - Which axis the strip runs along
///
/// # Errors
///
/// - `StripError::InvalidSelection` if `rect` has a non-positive side
/// - `StripError::InvalidImage` if the pixel buffer length is inconsistent
pub fn remove_strip(
    image: &DecodedImage,
    rect: &SelectionRect,
    orientation: Orientation,
) -> Result<DecodedImage, StripError> {
    if !rect.has_area() {
        return Err(StripError::InvalidSelection {
            width: rect.width,
            height: rect.height,
        });
    }

    let expected = image.width as usize * image.height as usize * BYTES_PER_PIXEL;
    if image.pixels.len() != expected {
        return Err(StripError::InvalidImage {
            expected,
            actual: image.pixels.len(),
        });
    }

    let result = match orientation {
        Orientation::Horizontal => {
            let range = cut_range(image.height, rect.y, rect.height);
            log::debug!(
                "Horizontal cut rows {}..{} of {}",
                range.start,
                range.end,
                image.height
            );
            remove_rows(image, range)
        }
        Orientation::Vertical => {
            let range = cut_range(image.width, rect.x, rect.width);
            log::debug!(
                "Vertical cut columns {}..{} of {}",
                range.start,
                range.end,
                image.width
            );
            remove_columns(image, range)
        }
    };

    Ok(result.unwrap_or_else(|| {
        log::debug!("Cut is empty or spans the whole image, keeping source");
        image.clone()
    }))
}

/// Returns `None` when the cut would be a no-op or consume every row.
fn remove_rows(image: &DecodedImage, range: CutRange) -> Option<DecodedImage> {
    if range.is_empty() || range.len() >= image.height {
        return None;
    }

    let stride = image.stride();
    let new_height = image.height - range.len();
    let mut pixels = Vec::with_capacity(stride * new_height as usize);

    // Rows above the cut stay in place, rows below slide up to meet them
    pixels.extend_from_slice(&image.pixels[..range.start as usize * stride]);
    pixels.extend_from_slice(&image.pixels[range.end as usize * stride..]);

    Some(DecodedImage::new(image.width, new_height, pixels))
}

/// Returns `None` when the cut would be a no-op or consume every column.
fn remove_columns(image: &DecodedImage, range: CutRange) -> Option<DecodedImage> {
    if range.is_empty() || range.len() >= image.width {
        return None;
    }

    let new_width = image.width - range.len();
    let left = range.start as usize * BYTES_PER_PIXEL;
    let right = range.end as usize * BYTES_PER_PIXEL;
    let mut pixels = Vec::with_capacity(new_width as usize * BYTES_PER_PIXEL * image.height as usize);

    for row in image.pixels.chunks_exact(image.stride()) {
        pixels.extend_from_slice(&row[..left]);
        pixels.extend_from_slice(&row[right..]);
    }

    Some(DecodedImage::new(new_width, image.height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{normalize_selection, CanvasBounds, CanvasPoint};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    /// Create a test image where each pixel encodes its own coordinates.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x % 256) as u8);
                pixels.push((y % 256) as u8);
                pixels.push(((x + y) % 256) as u8);
                pixels.push(255);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    /// 100x100, top half red, bottom half blue.
    fn red_over_blue() -> DecodedImage {
        let mut pixels = Vec::with_capacity(100 * 100 * 4);
        for y in 0..100 {
            let color = if y < 50 { RED } else { BLUE };
            for _ in 0..100 {
                pixels.extend_from_slice(&color);
            }
        }
        DecodedImage::new(100, 100, pixels)
    }

    #[test]
    fn test_horizontal_cut_red_over_blue() {
        let img = red_over_blue();
        let rect = SelectionRect::new(0.0, 0.3, 1.0, 0.2);

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();

        assert_eq!((result.width, result.height), (100, 80));
        for y in 0..80 {
            let expected = if y < 30 { RED } else { BLUE };
            for x in [0, 50, 99] {
                assert_eq!(result.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_vertical_cut_50x50() {
        let img = test_image(50, 50);
        let rect = SelectionRect::new(0.4, 0.0, 0.2, 1.0);

        assert_eq!(cut_range(50, 0.4, 0.2), CutRange { start: 20, end: 30 });

        let result = remove_strip(&img, &rect, Orientation::Vertical).unwrap();
        assert_eq!((result.width, result.height), (40, 50));

        for y in 0..50 {
            assert_eq!(result.pixel(20, y), img.pixel(30, y));
            assert_eq!(result.pixel(19, y), img.pixel(19, y));
        }
    }

    #[test]
    fn test_whole_image_is_noop() {
        let img = red_over_blue();
        let rect = SelectionRect::new(0.0, 0.0, 1.0, 1.0);

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        assert_eq!(result, img);

        let result = remove_strip(&img, &rect, Orientation::Vertical).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_sub_pixel_selection_is_noop() {
        let img = test_image(10, 10);
        // 0.05 * 10 floors to 0 rows
        let rect = SelectionRect::new(0.0, 0.5, 1.0, 0.05);

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_zero_area_selection_is_rejected() {
        let img = test_image(10, 10);
        let rect = SelectionRect::new(0.0, 0.5, 1.0, 0.0);

        let result = remove_strip(&img, &rect, Orientation::Horizontal);
        assert!(matches!(result, Err(StripError::InvalidSelection { .. })));
    }

    #[test]
    fn test_inconsistent_buffer_is_rejected() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 12],
        };
        let rect = SelectionRect::new(0.0, 0.5, 1.0, 0.2);

        let result = remove_strip(&img, &rect, Orientation::Horizontal);
        assert!(matches!(result, Err(StripError::InvalidImage { .. })));
    }

    #[test]
    fn test_cut_at_top_edge() {
        let img = test_image(4, 10);
        let rect = SelectionRect::new(0.0, 0.0, 1.0, 0.3);

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        assert_eq!(result.height, 7);
        assert_eq!(result.row(0), img.row(3));
    }

    #[test]
    fn test_cut_at_bottom_edge() {
        let img = test_image(4, 10);
        let rect = SelectionRect::new(0.0, 0.8, 1.0, 0.2);

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        assert_eq!(result.height, 8);
        assert_eq!(&result.pixels[..], &img.pixels[..8 * img.stride()]);
    }

    #[test]
    fn test_cut_past_end_is_clamped() {
        let img = test_image(10, 4);
        // 0.7 + 0.6 overshoots the right edge
        let rect = SelectionRect::new(0.7, 0.0, 0.6, 1.0);

        let result = remove_strip(&img, &rect, Orientation::Vertical).unwrap();
        assert_eq!(result.width, 7);
        for y in 0..4 {
            assert_eq!(result.pixel(6, y), img.pixel(6, y));
        }
    }

    #[test]
    fn test_source_is_not_modified() {
        let img = test_image(20, 20);
        let before = img.clone();
        let rect = SelectionRect::new(0.25, 0.0, 0.5, 1.0);

        let _ = remove_strip(&img, &rect, Orientation::Vertical).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_cuts_chain() {
        let img = test_image(10, 10);
        let rect = SelectionRect::new(0.0, 0.2, 1.0, 0.2);

        let once = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        let twice = remove_strip(&once, &rect, Orientation::Horizontal).unwrap();

        // 10 -> 8 rows, then floor(0.2 * 8) = 1 row
        assert_eq!(once.height, 8);
        assert_eq!(twice.height, 7);
    }

    #[test]
    fn test_runs_on_worker_thread() {
        let img = test_image(30, 30);
        let rect = SelectionRect::new(0.0, 0.5, 1.0, 0.1);

        let expected = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();
        let handle = std::thread::spawn(move || remove_strip(&img, &rect, Orientation::Horizontal));
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }

    #[test]
    fn test_cut_range_clamps_negative_start() {
        assert_eq!(cut_range(100, -0.1, 0.3), CutRange { start: 0, end: 20 });
        assert_eq!(cut_range(100, 0.9, 0.5), CutRange { start: 90, end: 100 });
        assert_eq!(cut_range(100, 1.5, 0.5), CutRange { start: 100, end: 100 });
        assert!(cut_range(100, f64::NAN, 0.5).start == 0);
    }

    #[test]
    fn test_cut_range_recovers_whole_pixels() {
        // 29/100 * 100 is 28.999999999999996 in f64
        assert_eq!(cut_range(100, 29.0 / 100.0, 20.0 / 100.0), CutRange { start: 29, end: 49 });
        assert_eq!(cut_range(1080, 156.0 / 1080.0, 1.0 / 1080.0), CutRange { start: 156, end: 157 });
        // Genuine fractions still floor
        assert_eq!(cut_range(100, 0.295, 0.2), CutRange { start: 29, end: 49 });
    }

    #[test]
    fn test_drag_removes_exactly_the_dragged_rows() {
        let mut pixels = Vec::with_capacity(100 * 100 * 4);
        for y in 0..100u8 {
            for _ in 0..100 {
                pixels.extend_from_slice(&[y, 0, 0, 255]);
            }
        }
        let img = DecodedImage::new(100, 100, pixels);
        let rect = normalize_selection(
            CanvasPoint::new(0.0, 29.0),
            CanvasPoint::new(100.0, 49.0),
            CanvasBounds::sized(100.0, 100.0),
            Orientation::Horizontal,
        )
        .unwrap();

        let result = remove_strip(&img, &rect, Orientation::Horizontal).unwrap();

        assert_eq!(result.height, 80);
        assert_eq!(result.pixel(0, 28), Some([28, 0, 0, 255]));
        assert_eq!(result.pixel(0, 29), Some([49, 0, 0, 255]));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
