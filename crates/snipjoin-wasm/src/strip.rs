//! Strip removal WASM bindings.
//!
//! Stateless counterpart of `JsSession::process` for hosts that keep their
//! own state.

use crate::selection::{parse_orientation, selection_from_js};
use crate::types::JsImage;
use snipjoin_core::transform;
use wasm_bindgen::prelude::*;

/// Remove the selected strip and join the remaining parts.
///
/// # Arguments
///
/// * `image` - Source image, left untouched
/// * `selection` - `{ x, y, width, height }` fractions, as returned by
///   `normalize_selection`
/// * `orientation` - "horizontal" (removes rows) or "vertical" (removes columns)
///
/// A selection that rounds to nothing, or covers the whole image, returns an
/// unchanged copy.
#[wasm_bindgen]
pub fn remove_strip(
    image: &JsImage,
    selection: JsValue,
    orientation: &str,
) -> Result<JsImage, JsValue> {
    let rect = selection_from_js(selection)?;
    let orientation = parse_orientation(orientation)?;

    transform::remove_strip(image.as_decoded(), &rect, orientation)
        .map(JsImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
