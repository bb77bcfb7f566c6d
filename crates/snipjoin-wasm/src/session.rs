//! Editing session WASM bindings.
//!
//! `JsSession` wraps the core session for a browser UI. Clipboard access is
//! left to the host (the async Clipboard API), which passes raw bitmaps in and
//! receives them back in the channel order it asks for.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsSession();
//! // The session is still mid-call while this runs, so read state from the
//! // arguments rather than from `session`.
//! session.subscribe((update, image) => {
//!   statusBar.textContent = update.status;
//!   processButton.disabled = !update.can_process;
//!   if (image) redraw(image);
//! });
//!
//! session.load_clipboard_bitmap(w, h, bgraBytes, 'bgra');
//! session.select(x0, y0, x1, y1, { x: 0, y: 0, width: w, height: h });
//! session.process();
//! ```

use std::borrow::Cow;

use crate::encode::parse_format;
use crate::selection::{from_js, parse_orientation, selection_from_js, to_js};
use crate::types::JsImage;
use serde::Serialize;
use snipjoin_core::clipboard::{ChannelOrder, ClipboardBitmap, MemoryClipboard};
use snipjoin_core::selection::{CanvasBounds, CanvasPoint, Orientation, SelectionRect};
use snipjoin_core::session::{ChangeSet, Session, SessionConfig, SessionError};
use wasm_bindgen::prelude::*;

/// What a subscriber receives about the session after an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SessionUpdate {
    changes: ChangeSet,
    status: String,
    orientation: Orientation,
    selection: Option<SelectionRect>,
    busy: bool,
    can_process: bool,
    can_save: bool,
    image_width: Option<u32>,
    image_height: Option<u32>,
}

impl SessionUpdate {
    pub(crate) fn capture(changes: &ChangeSet, session: &Session) -> Self {
        let image = session.active_image();
        Self {
            changes: *changes,
            status: session.status().to_string(),
            orientation: session.orientation(),
            selection: session.selection(),
            busy: session.is_busy(),
            can_process: session.can_process(),
            can_save: session.can_save(),
            image_width: image.map(|i| i.width),
            image_height: image.map(|i| i.height),
        }
    }

    /// The displayed image only needs to be sent when it changed.
    fn image_changed(&self) -> bool {
        self.changes.current_image || self.changes.processed_image
    }
}

fn to_js_error(err: SessionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_channel_order(value: &str) -> Result<ChannelOrder, JsValue> {
    match value.to_ascii_lowercase().as_str() {
        "rgba" => Ok(ChannelOrder::Rgba),
        "bgra" => Ok(ChannelOrder::Bgra),
        _ => Err(JsValue::from_str(&format!("Unknown channel order: {}", value))),
    }
}

/// A stateful editing session for JavaScript.
#[wasm_bindgen]
pub struct JsSession {
    inner: Session,
}

impl Default for JsSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsSession {
    /// Create a session with default settings (PNG output, JPEG quality 90).
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsSession {
        JsSession {
            inner: Session::default(),
        }
    }

    /// Create a session from `{ jpeg_quality, default_format }`. Missing
    /// fields keep their defaults.
    pub fn with_config(config: JsValue) -> Result<JsSession, JsValue> {
        let config: SessionConfig = from_js(config, "config")?;
        Ok(JsSession {
            inner: Session::new(config),
        })
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.inner.status().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// "horizontal" or "vertical"
    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> String {
        self.inner.orientation().as_str().to_string()
    }

    pub fn can_process(&self) -> bool {
        self.inner.can_process()
    }

    pub fn can_save(&self) -> bool {
        self.inner.can_save()
    }

    /// The image to display: the processed image if any, else the loaded one.
    pub fn active_image(&self) -> Option<JsImage> {
        self.inner.active_image().cloned().map(JsImage::from_decoded)
    }

    pub fn current_image(&self) -> Option<JsImage> {
        self.inner.current_image().cloned().map(JsImage::from_decoded)
    }

    pub fn processed_image(&self) -> Option<JsImage> {
        self.inner.processed_image().cloned().map(JsImage::from_decoded)
    }

    /// Current selection as `{ x, y, width, height }`, or `null`.
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        match self.inner.selection() {
            Some(rect) => to_js(&rect),
            None => Ok(JsValue::NULL),
        }
    }

    /// Fields changed since the last call, as an object of booleans.
    pub fn take_changes(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.take_changes())
    }

    /// Call `callback(update, image)` after every published update.
    ///
    /// The callback runs while this session is still inside the call that
    /// caused the update, so it must not call back into the session. `update`
    /// carries `changes`, `status`, `orientation`, `selection`, `busy`,
    /// `can_process`, `can_save`, `image_width` and `image_height`. `image` is
    /// the new active image when it changed, else `undefined`.
    pub fn subscribe(&mut self, callback: js_sys::Function) {
        self.inner.subscribe(move |changes, session| {
            let update = SessionUpdate::capture(changes, session);
            let image = match session.active_image() {
                Some(active) if update.image_changed() => {
                    JsValue::from(JsImage::from_decoded(active.clone()))
                }
                _ => JsValue::UNDEFINED,
            };
            let serializer = serde_wasm_bindgen::Serializer::json_compatible();
            let notified = update
                .serialize(&serializer)
                .map_err(JsValue::from)
                .and_then(|value| callback.call2(&JsValue::NULL, &value, &image));
            if let Err(e) = notified {
                log::warn!("Session subscriber failed: {:?}", e);
            }
        });
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Decode an encoded image (PNG, JPEG, BMP, GIF) and load it.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_from_bytes(bytes).map_err(to_js_error)
    }

    /// Load a raw clipboard bitmap.
    ///
    /// Pass `null` bytes when the clipboard held no image; the session then
    /// reports "No image found in clipboard".
    ///
    /// # Arguments
    ///
    /// * `order` - "rgba" or "bgra"
    pub fn load_clipboard_bitmap(
        &mut self,
        width: u32,
        height: u32,
        bytes: Option<Vec<u8>>,
        order: &str,
    ) -> Result<(), JsValue> {
        let order = parse_channel_order(order)?;
        let mut clipboard = MemoryClipboard::with_order(order);
        if let Some(bytes) = bytes {
            clipboard.set_bitmap(ClipboardBitmap {
                width,
                height,
                order,
                bytes: Cow::Owned(bytes),
            });
        }
        self.inner
            .load_from_clipboard(&mut clipboard)
            .map_err(to_js_error)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// "horizontal" or "vertical". Clears the selection.
    pub fn set_orientation(&mut self, orientation: &str) -> Result<(), JsValue> {
        let orientation = parse_orientation(orientation)?;
        self.inner.set_orientation(orientation).map_err(to_js_error)
    }

    /// Finish a pointer drag. Returns the stored selection.
    ///
    /// `bounds` is `{ x, y, width, height }` of the displayed active image.
    pub fn select(
        &mut self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        bounds: JsValue,
    ) -> Result<JsValue, JsValue> {
        let bounds: CanvasBounds = from_js(bounds, "bounds")?;
        let rect = self
            .inner
            .select(
                CanvasPoint::new(start_x, start_y),
                CanvasPoint::new(end_x, end_y),
                bounds,
            )
            .map_err(to_js_error)?;
        to_js(&rect)
    }

    /// Store an already normalized `{ x, y, width, height }` selection.
    pub fn set_selection(&mut self, selection: JsValue) -> Result<JsValue, JsValue> {
        let rect = selection_from_js(selection)?;
        let rect = self.inner.set_selection(rect).map_err(to_js_error)?;
        to_js(&rect)
    }

    pub fn clear_selection(&mut self) -> Result<(), JsValue> {
        self.inner.clear_selection().map_err(to_js_error)
    }

    /// Switch to the other orientation and return its name.
    pub fn toggle_orientation(&mut self) -> Result<String, JsValue> {
        let orientation = self.inner.toggle_orientation().map_err(to_js_error)?;
        Ok(orientation.as_str().to_string())
    }

    // ------------------------------------------------------------------
    // Processing and output
    // ------------------------------------------------------------------

    /// Remove the selected strip from the active image.
    pub fn process(&mut self) -> Result<(), JsValue> {
        self.inner.process().map_err(to_js_error)
    }

    /// Encode the processed image. `format` is an extension or file name;
    /// omitted means the configured default.
    pub fn encode(&mut self, format: Option<String>) -> Result<Vec<u8>, JsValue> {
        let format = format.as_deref().map(parse_format);
        self.inner.encode_processed(format).map_err(to_js_error)
    }

    /// Raw bitmap of the processed image in `order` ("rgba" or "bgra"), for
    /// the host to place on the system clipboard.
    pub fn copy_to_clipboard(&mut self, order: &str) -> Result<Vec<u8>, JsValue> {
        let order = parse_channel_order(order)?;
        let mut clipboard = MemoryClipboard::with_order(order);
        self.inner
            .save_to_clipboard(&mut clipboard)
            .map_err(to_js_error)?;
        Ok(clipboard
            .bitmap()
            .map(|bitmap| bitmap.bytes.to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipjoin_core::decode::DecodedImage;

    fn bgra_stripes() -> Vec<u8> {
        // 10x10, rows 0-4 blue, rows 5-9 red, stored as BGRA
        let mut bytes = Vec::new();
        for y in 0..10 {
            let px = if y < 5 { [255, 0, 0, 255] } else { [0, 0, 255, 255] };
            for _ in 0..10 {
                bytes.extend_from_slice(&px);
            }
        }
        bytes
    }

    #[test]
    fn test_clipboard_bitmap_session_flow() {
        let mut session = JsSession::new();
        session
            .load_clipboard_bitmap(10, 10, Some(bgra_stripes()), "bgra")
            .unwrap();
        assert_eq!(session.status(), "Image loaded from clipboard (10×10px)");

        // Stored as RGBA
        let current = session.current_image().unwrap();
        assert_eq!(&current.pixels()[..4], &[0, 0, 255, 255]);

        session
            .inner
            .set_selection(SelectionRect::new(0.0, 0.0, 1.0, 0.5))
            .unwrap();
        assert!(session.can_process());
        session.process().unwrap();

        let active = session.active_image().unwrap();
        assert_eq!((active.width(), active.height()), (10, 5));
        assert!(session.can_save());

        let raw = session.copy_to_clipboard("bgra").unwrap();
        assert_eq!(raw.len(), 10 * 5 * 4);
        // Only the red rows remain, back in BGRA
        assert_eq!(&raw[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_encode_uses_requested_format() {
        let mut session = JsSession::new();
        session
            .load_clipboard_bitmap(10, 10, Some(bgra_stripes()), "bgra")
            .unwrap();
        session
            .inner
            .set_selection(SelectionRect::new(0.2, 0.0, 0.3, 1.0))
            .unwrap();
        session.set_orientation("horizontal").unwrap();
        // Orientation change cleared the selection
        assert!(!session.can_process());

        session
            .inner
            .set_selection(SelectionRect::new(0.0, 0.5, 1.0, 0.5))
            .unwrap();
        session.process().unwrap();

        let gif = session.encode(Some("result.gif".to_string())).unwrap();
        assert_eq!(&gif[0..3], b"GIF");
        let png = session.encode(None).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_load_bytes_replaces_processed() {
        let mut session = JsSession::new();
        session
            .load_clipboard_bitmap(10, 10, Some(bgra_stripes()), "bgra")
            .unwrap();
        session
            .inner
            .set_selection(SelectionRect::new(0.0, 0.0, 1.0, 0.5))
            .unwrap();
        session.process().unwrap();

        let png = snipjoin_core::encode::encode_image(
            &DecodedImage::filled(3, 3, [5, 5, 5, 255]),
            snipjoin_core::encode::OutputFormat::Png,
            90,
        )
        .unwrap();
        session.load_bytes(&png).unwrap();

        assert!(session.processed_image().is_none());
        assert_eq!(session.active_image().unwrap().width(), 3);
        assert_eq!(session.orientation(), "horizontal");
    }

    #[test]
    fn test_update_captures_state_after_process() {
        let mut session = JsSession::new();
        session
            .load_clipboard_bitmap(10, 10, Some(bgra_stripes()), "bgra")
            .unwrap();

        let captured: std::rc::Rc<std::cell::RefCell<Vec<SessionUpdate>>> = Default::default();
        let sink = std::rc::Rc::clone(&captured);
        session
            .inner
            .subscribe(move |changes, s| sink.borrow_mut().push(SessionUpdate::capture(changes, s)));

        session
            .inner
            .set_selection(SelectionRect::new(0.0, 0.0, 1.0, 0.5))
            .unwrap();
        session.process().unwrap();

        let captured = captured.borrow();
        let last = captured.last().unwrap();
        assert!(last.image_changed());
        assert_eq!(last.status, "Image processed - horizontal segment removed and parts joined");
        assert_eq!((last.image_width, last.image_height), (Some(10), Some(5)));
        assert_eq!(last.selection, None);
        assert!(!last.busy);
        assert!(last.can_save);
        assert!(!last.can_process);

        // The "Processing image..." update reports busy without a new image
        let processing = &captured[captured.len() - 2];
        assert!(processing.busy);
        assert!(!processing.image_changed());
    }

    #[test]
    fn test_toggle_orientation() {
        let mut session = JsSession::new();
        assert_eq!(session.toggle_orientation().unwrap(), "vertical");
        assert_eq!(session.orientation(), "vertical");
        assert_eq!(session.toggle_orientation().unwrap(), "horizontal");
    }
}
