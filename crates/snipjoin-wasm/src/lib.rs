//! SnipJoin WASM - WebAssembly bindings for SnipJoin
//!
//! This crate exposes snipjoin-core to JavaScript/TypeScript so a browser
//! canvas can drive strip removal.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for RGBA image data
//! - `decode` / `encode` - Image file bindings
//! - `selection` - Turning pointer drags into selections
//! - `strip` - Stateless strip removal
//! - `session` - Stateful editing session for UI binding
//! - `logger` - Routes `log` records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession } from '@snipjoin/wasm';
//!
//! await init();
//!
//! const session = new JsSession();
//! session.load_bytes(new Uint8Array(await file.arrayBuffer()));
//! session.select(10, 120, 300, 180, canvasBounds);
//! session.process();
//! const png = session.encode('png');
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod logger;
mod selection;
mod session;
mod strip;
mod types;

// Re-export public types
pub use decode::{decode_image, image_orientation};
pub use encode::{encode_image, output_format_for};
pub use selection::normalize_selection;
pub use session::JsSession;
pub use strip::remove_strip;
pub use types::JsImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Change how verbose console logging is ("error" to "trace").
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    log::set_max_level(filter);
    Ok(())
}
