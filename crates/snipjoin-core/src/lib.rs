//! SnipJoin Core - strip removal library
//!
//! This crate provides the core functionality for SnipJoin: select a
//! horizontal or vertical band of an image, cut it out and join the remaining
//! parts. It also covers decoding, encoding, clipboard exchange and the
//! session state a host UI binds to.

pub mod clipboard;
pub mod decode;
pub mod encode;
pub mod selection;
pub mod session;
pub mod transform;

pub use clipboard::{ChannelOrder, ClipboardAdapter, ClipboardBitmap, ClipboardError, MemoryClipboard};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{EncodeError, OutputFormat};
pub use selection::{
    normalize_selection, CanvasBounds, CanvasPoint, Orientation, SelectionError, SelectionRect,
};
pub use session::{ChangeSet, ImageSource, ProcessJob, Session, SessionConfig, SessionError};
pub use transform::{remove_strip, StripError};

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
