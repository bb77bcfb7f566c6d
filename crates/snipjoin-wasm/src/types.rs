//! WASM-compatible wrapper types for image data.

use snipjoin_core::decode::{DecodedImage, BYTES_PER_PIXEL};
use wasm_bindgen::prelude::*;

/// An RGBA image for JavaScript.
///
/// The pixel layout matches canvas `ImageData`, so `pixels()` can be wrapped
/// in a `Uint8ClampedArray` and drawn directly.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it into a
/// JavaScript `Uint8Array`.
#[wasm_bindgen]
pub struct JsImage {
    inner: DecodedImage,
}

#[wasm_bindgen]
impl JsImage {
    /// Create an image from dimensions and RGBA pixel data.
    ///
    /// # Errors
    ///
    /// Fails if `pixels.length != width * height * 4`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsImage, JsValue> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(JsValue::from_str(&format!(
                "Expected {} bytes for a {}x{} RGBA image, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self::from_decoded(DecodedImage::new(width, height, pixels)))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns RGBA pixel data as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsImage {
    pub(crate) fn from_decoded(image: DecodedImage) -> Self {
        Self { inner: image }
    }

    pub(crate) fn as_decoded(&self) -> &DecodedImage {
        &self.inner
    }
}
