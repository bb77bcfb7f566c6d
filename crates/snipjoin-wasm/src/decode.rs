//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@snipjoin/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height} image`);
//! ```

use crate::types::JsImage;
use snipjoin_core::decode;
use wasm_bindgen::prelude::*;

/// Decode a PNG, JPEG, BMP or GIF image from bytes.
///
/// The format is detected from the content. EXIF orientation is applied so
/// the pixels match what the user sees.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the data is corrupt.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// EXIF orientation tag value (1-8) of an encoded image, 1 when absent.
#[wasm_bindgen]
pub fn image_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use snipjoin_core::decode::DecodedImage;
    use snipjoin_core::encode::{encode_image, OutputFormat};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let png = encode_image(&DecodedImage::filled(6, 4, [1, 2, 3, 255]), OutputFormat::Png, 90)
            .unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!((image.width(), image.height()), (6, 4));
    }

    #[wasm_bindgen_test]
    fn test_decode_garbage() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
