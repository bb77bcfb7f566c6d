//! Image decoding for SnipJoin.
//!
//! This module provides functionality for:
//! - Decoding PNG, JPEG, BMP and GIF images from bytes or files
//! - Applying EXIF orientation so cuts line up with what the user sees
//!
//! All decoders produce a [`DecodedImage`] with RGBA pixel data, which is the
//! only pixel layout the rest of the crate works with.
//!
//! # Examples
//!
//! ```ignore
//! use snipjoin_core::decode::decode_file;
//!
//! let image = decode_file("screenshot.png").unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod reader;
mod types;

pub use reader::{decode_file, decode_image, get_orientation};
pub use types::{DecodeError, DecodedImage, ExifOrientation, BYTES_PER_PIXEL};
