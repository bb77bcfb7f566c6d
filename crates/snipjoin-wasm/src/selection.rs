//! Selection WASM bindings.
//!
//! Selections cross the boundary as plain objects,
//! `{ x, y, width, height }`, with fractional values in 0..1. Canvas bounds
//! use the same shape in canvas pixels.

use snipjoin_core::selection::{self, CanvasBounds, CanvasPoint, Orientation, SelectionRect};
use wasm_bindgen::prelude::*;

/// Turn a pointer drag into a fractional, orientation-constrained selection.
///
/// # Arguments
///
/// * `start_x`, `start_y` - Where the drag started, in canvas pixels
/// * `end_x`, `end_y` - Where the drag ended, in canvas pixels
/// * `bounds` - `{ x, y, width, height }` of the displayed image on the canvas
/// * `orientation` - "horizontal" or "vertical"
///
/// # Errors
///
/// Fails for malformed arguments, an empty canvas, or a drag with no area
/// ("Invalid selection - too small or zero size").
#[wasm_bindgen]
pub fn normalize_selection(
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    bounds: JsValue,
    orientation: &str,
) -> Result<JsValue, JsValue> {
    let bounds: CanvasBounds = from_js(bounds, "bounds")?;
    let orientation = parse_orientation(orientation)?;

    let rect = selection::normalize_selection(
        CanvasPoint::new(start_x, start_y),
        CanvasPoint::new(end_x, end_y),
        bounds,
        orientation,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&rect)
}

pub(crate) fn parse_orientation(value: &str) -> Result<Orientation, JsValue> {
    orientation_from_str(value)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown orientation: {}", value)))
}

fn orientation_from_str(value: &str) -> Option<Orientation> {
    match value.to_ascii_lowercase().as_str() {
        "horizontal" | "h" => Some(Orientation::Horizontal),
        "vertical" | "v" => Some(Orientation::Vertical),
        _ => None,
    }
}

pub(crate) fn selection_from_js(value: JsValue) -> Result<SelectionRect, JsValue> {
    from_js(value, "selection")
}

pub(crate) fn from_js<T: serde::de::DeserializeOwned>(
    value: JsValue,
    what: &str,
) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

pub(crate) fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_str() {
        assert_eq!(orientation_from_str("horizontal"), Some(Orientation::Horizontal));
        assert_eq!(orientation_from_str("Vertical"), Some(Orientation::Vertical));
        assert_eq!(orientation_from_str("v"), Some(Orientation::Vertical));
        assert_eq!(orientation_from_str("diagonal"), None);
    }
}
