//! Clipboard adapters.
//!
//! Platform clipboards hand out bitmaps in their own channel order (Windows
//! and most native bitmap APIs use BGRA). Adapters convert at the boundary so
//! the rest of the crate only ever sees RGBA.

use std::borrow::Cow;

use thiserror::Error;

use crate::decode::{DecodedImage, BYTES_PER_PIXEL};

/// Clipboard failures. All of them are retryable by the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// The clipboard could not be opened or accessed.
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// A bitmap's byte length does not match its dimensions.
    #[error("Invalid clipboard bitmap: expected {expected} bytes, got {actual}")]
    InvalidBitmap { expected: usize, actual: usize },
}

/// Byte order of the four channels in a clipboard bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgba,
    Bgra,
}

/// A raw bitmap as exchanged with a platform clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardBitmap<'a> {
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
    pub bytes: Cow<'a, [u8]>,
}

impl<'a> ClipboardBitmap<'a> {
    /// Convert to an RGBA image, swapping channels if needed.
    pub fn into_image(self) -> Result<DecodedImage, ClipboardError> {
        let expected = self.width as usize * self.height as usize * BYTES_PER_PIXEL;
        if self.bytes.len() != expected {
            return Err(ClipboardError::InvalidBitmap {
                expected,
                actual: self.bytes.len(),
            });
        }

        let mut pixels = self.bytes.into_owned();
        if self.order == ChannelOrder::Bgra {
            swap_red_blue(&mut pixels);
        }
        Ok(DecodedImage::new(self.width, self.height, pixels))
    }

    /// Build a bitmap in `order` from an RGBA image.
    ///
    /// RGBA output borrows the image's buffer, BGRA output copies it.
    pub fn from_image(image: &'a DecodedImage, order: ChannelOrder) -> Self {
        let bytes = match order {
            ChannelOrder::Rgba => Cow::Borrowed(image.pixels.as_slice()),
            ChannelOrder::Bgra => {
                let mut swapped = image.pixels.clone();
                swap_red_blue(&mut swapped);
                Cow::Owned(swapped)
            }
        };
        Self {
            width: image.width,
            height: image.height,
            order,
            bytes,
        }
    }
}

/// Swap the first and third byte of every pixel (RGBA <-> BGRA).
pub fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

/// Read and write images on a clipboard.
pub trait ClipboardAdapter {
    /// Read the clipboard image. `Ok(None)` means the clipboard holds no image.
    fn read_image(&mut self) -> Result<Option<DecodedImage>, ClipboardError>;

    /// Replace the clipboard contents with `image`.
    fn write_image(&mut self, image: &DecodedImage) -> Result<(), ClipboardError>;
}

/// An in-process clipboard.
///
/// Stores the image in a configurable channel order so hosts that exchange
/// BGRA bitmaps with their platform can stage them here.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    order: ChannelOrder,
    content: Option<ClipboardBitmap<'static>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard that stores bitmaps in `order`.
    pub fn with_order(order: ChannelOrder) -> Self {
        Self {
            order,
            content: None,
        }
    }

    /// Put a raw platform bitmap on the clipboard.
    pub fn set_bitmap(&mut self, bitmap: ClipboardBitmap<'static>) {
        self.content = Some(bitmap);
    }

    /// The raw bitmap as the platform would see it.
    pub fn bitmap(&self) -> Option<&ClipboardBitmap<'static>> {
        self.content.as_ref()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }
}

impl ClipboardAdapter for MemoryClipboard {
    fn read_image(&mut self) -> Result<Option<DecodedImage>, ClipboardError> {
        self.content.clone().map(ClipboardBitmap::into_image).transpose()
    }

    fn write_image(&mut self, image: &DecodedImage) -> Result<(), ClipboardError> {
        let bitmap = ClipboardBitmap::from_image(image, self.order);
        self.content = Some(ClipboardBitmap {
            width: bitmap.width,
            height: bitmap.height,
            order: bitmap.order,
            bytes: Cow::Owned(bitmap.bytes.into_owned()),
        });
        Ok(())
    }
}

/// The operating system clipboard, through `arboard`.
///
/// `arboard` already exchanges RGBA, so no channel swap is needed here.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardAdapter for SystemClipboard {
    fn read_image(&mut self) -> Result<Option<DecodedImage>, ClipboardError> {
        match self.inner.get_image() {
            Ok(data) => {
                let width = u32::try_from(data.width)
                    .map_err(|_| ClipboardError::Unavailable("image too wide".to_string()))?;
                let height = u32::try_from(data.height)
                    .map_err(|_| ClipboardError::Unavailable("image too tall".to_string()))?;
                ClipboardBitmap {
                    width,
                    height,
                    order: ChannelOrder::Rgba,
                    bytes: data.bytes,
                }
                .into_image()
                .map(Some)
            }
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }

    fn write_image(&mut self, image: &DecodedImage) -> Result<(), ClipboardError> {
        let data = arboard::ImageData {
            width: image.width as usize,
            height: image.height as usize,
            bytes: Cow::Borrowed(image.pixels.as_slice()),
        };
        self.inner
            .set_image(data)
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}
