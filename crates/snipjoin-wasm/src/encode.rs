//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image, output_format_for } from '@snipjoin/wasm';
//!
//! const png = encode_image(image, 'png', 90);
//! const blob = new Blob([png], { type: output_format_for('result.png') });
//! ```

use crate::types::JsImage;
use snipjoin_core::encode::{self, OutputFormat};
use wasm_bindgen::prelude::*;

/// Encode an image to PNG, JPEG, BMP or GIF bytes.
///
/// # Arguments
///
/// * `image` - Image to encode
/// * `format` - Extension or file name selecting the format ("png", "jpg",
///   "out.bmp", ...). Unknown values encode as PNG.
/// * `quality` - JPEG quality (1-100); ignored by the other formats
#[wasm_bindgen]
pub fn encode_image(image: &JsImage, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_image(image.as_decoded(), parse_format(format), quality)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// MIME type that `encode_image` produces for `format`.
#[wasm_bindgen]
pub fn output_format_for(format: &str) -> String {
    parse_format(format).mime_type().to_string()
}

/// Accept either a bare extension or a file name.
pub(crate) fn parse_format(format: &str) -> OutputFormat {
    let ext = format.rsplit('.').next().unwrap_or(format);
    OutputFormat::from_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipjoin_core::decode::DecodedImage;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("png"), OutputFormat::Png);
        assert_eq!(parse_format("JPEG"), OutputFormat::Jpeg);
        assert_eq!(parse_format("holiday.strip.jpg"), OutputFormat::Jpeg);
        assert_eq!(parse_format("out.bmp"), OutputFormat::Bmp);
        assert_eq!(parse_format(""), OutputFormat::Png);
    }

    #[test]
    fn test_output_format_for() {
        assert_eq!(output_format_for("gif"), "image/gif");
        assert_eq!(output_format_for("photo.tiff"), "image/png");
    }

    #[test]
    fn test_encode_image_bmp() {
        let image = JsImage::from_decoded(DecodedImage::filled(4, 4, [0, 255, 0, 255]));
        let bmp = encode_image(&image, "bmp", 90).unwrap();
        assert_eq!(&bmp[0..2], b"BM");
    }
}
