//! Encoding RGBA images with the `image` crate's encoders.

use std::path::{Path, PathBuf};

use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use super::OutputFormat;
use crate::decode::{DecodedImage, BYTES_PER_PIXEL};

/// Errors that can occur during encoding or saving.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the image
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },

    /// Writing the encoded bytes to disk failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Encode an RGBA image in the given format.
///
/// # Arguments
///
/// * `image` - Image to encode
/// * `format` - Output container
/// * `quality` - JPEG quality (1-100); ignored by the other formats
///
/// # Errors
///
/// Returns an error if the image has a zero dimension, if the pixel buffer
/// does not match the dimensions, or if the encoder fails.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * BYTES_PER_PIXEL;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    let mut buffer = Vec::new();
    match format {
        OutputFormat::Png => PngEncoder::new(&mut buffer)
            .write_image(&image.pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(failed)?,
        OutputFormat::Jpeg => {
            // JPEG carries no alpha channel
            let rgb = strip_alpha(&image.pixels);
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(failed)?
        }
        OutputFormat::Bmp => BmpEncoder::new(&mut buffer)
            .write_image(&image.pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(failed)?,
        OutputFormat::Gif => GifEncoder::new(&mut buffer)
            .encode(&image.pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(failed)?,
    }

    Ok(buffer)
}

/// Encode an image and write it to `path`.
///
/// The format is chosen from the path's extension (PNG when unknown). The
/// encoded bytes are written to a temporary file next to the destination and
/// renamed into place, so a failed save never leaves a truncated file at
/// `path`.
pub fn save_to_file(
    image: &DecodedImage,
    path: impl AsRef<Path>,
    quality: u8,
) -> Result<OutputFormat, EncodeError> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path);
    let bytes = encode_image(image, format, quality)?;

    let tmp = temp_path_for(path);
    let io_err = |source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = std::fs::write(&tmp, &bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(e));
    }

    log::info!(
        "Saved {}x{} {:?} image ({} bytes) to {}",
        image.width,
        image.height,
        format,
        bytes.len(),
        path.display()
    );
    Ok(format)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / BYTES_PER_PIXEL * 3);
    for px in rgba.chunks_exact(BYTES_PER_PIXEL) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(128);
                pixels.push(255);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snipjoin-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_encode_png_round_trip() {
        let img = gradient(16, 9);
        let png = encode_image(&img, OutputFormat::Png, 90).unwrap();

        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(decode_image(&png).unwrap(), img);
    }

    #[test]
    fn test_encode_jpeg_magic_bytes() {
        let img = gradient(20, 20);
        let jpeg = encode_image(&img, OutputFormat::Jpeg, 90).unwrap();

        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        let len = jpeg.len();
        assert_eq!(&jpeg[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let img = DecodedImage::filled(10, 10, [128, 128, 128, 255]);
        assert!(encode_image(&img, OutputFormat::Jpeg, 0).is_ok());
        assert!(encode_image(&img, OutputFormat::Jpeg, 255).is_ok());
    }

    #[test]
    fn test_encode_bmp_and_gif() {
        let img = DecodedImage::filled(8, 4, [255, 0, 0, 255]);

        let bmp = encode_image(&img, OutputFormat::Bmp, 90).unwrap();
        assert_eq!(&bmp[0..2], b"BM");

        let gif = encode_image(&img, OutputFormat::Gif, 90).unwrap();
        assert_eq!(&gif[0..3], b"GIF");

        let decoded = decode_image(&bmp).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 4));
        assert_eq!(decoded.pixel(3, 2), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let img = DecodedImage {
            width: 0,
            height: 10,
            pixels: vec![],
        };
        let result = encode_image(&img, OutputFormat::Png, 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_invalid_pixel_data() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 10 * 9 * 4],
        };
        let result = encode_image(&img, OutputFormat::Png, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_save_to_file_picks_format_from_extension() {
        let img = gradient(12, 6);
        let path = scratch_path("save.bmp");

        let format = save_to_file(&img, &path, 90).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(format, OutputFormat::Bmp);
        assert_eq!(&bytes[0..2], b"BM");
    }

    #[test]
    fn test_save_to_file_unknown_extension_writes_png() {
        let img = gradient(5, 5);
        let path = scratch_path("save.unknown");

        let format = save_to_file(&img, &path, 90).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(format, OutputFormat::Png);
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_save_to_missing_directory_leaves_nothing() {
        let img = gradient(5, 5);
        let path = std::env::temp_dir()
            .join("snipjoin-no-such-dir")
            .join("out.png");

        let result = save_to_file(&img, &path, 90);
        assert!(matches!(result, Err(EncodeError::Io { .. })));
        assert!(!path.exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_failed_encode_does_not_touch_destination() {
        let path = scratch_path("keep.png");
        std::fs::write(&path, b"original").unwrap();

        let broken = DecodedImage {
            width: 3,
            height: 3,
            pixels: vec![0u8; 5],
        };
        assert!(save_to_file(&broken, &path, 90).is_err());

        let contents = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(contents, b"original");
    }

    #[test]
    fn test_strip_alpha() {
        assert_eq!(strip_alpha(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![1, 2, 3, 5, 6, 7]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
