//! Image encoding for SnipJoin.
//!
//! This module provides functionality for:
//! - Choosing an output format from a file name ([`OutputFormat`])
//! - Encoding RGBA images to PNG, JPEG, BMP or GIF bytes
//! - Writing encoded images to disk without leaving truncated files behind
//!
//! # Examples
//!
//! ```ignore
//! use snipjoin_core::encode::{encode_image, OutputFormat};
//!
//! let png = encode_image(&image, OutputFormat::Png, 90).unwrap();
//! println!("Encoded {} bytes", png.len());
//! ```

mod format;
mod writer;

pub use format::OutputFormat;
pub use writer::{encode_image, save_to_file, EncodeError};
