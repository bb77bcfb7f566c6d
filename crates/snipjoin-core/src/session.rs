//! Editing session state.
//!
//! A [`Session`] owns everything a host UI needs to drive the strip tool: the
//! loaded image, the most recent cut result, the orientation, the current
//! selection and a status line. Every operation stages its new values first
//! and publishes them as one [`ChangeSet`], so observers never see a new
//! image next to a stale selection.
//!
//! # Long-running Work
//!
//! Decoding, encoding and cutting can be slow for large images. Hosts that
//! want to keep their UI responsive use the two-phase API:
//!
//! ```ignore
//! let job = session.start_process()?;          // marks the session busy
//! let outcome = run_on_worker(move || job.run());
//! session.complete_process(outcome);            // publishes and clears busy
//! ```
//!
//! While busy, every other operation is refused with [`SessionError::Busy`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clipboard::{ClipboardAdapter, ClipboardError};
use crate::decode::{self, DecodeError, DecodedImage};
use crate::encode::{self, EncodeError, OutputFormat};
use crate::selection::{
    normalize_selection, CanvasBounds, CanvasPoint, Orientation, SelectionError, SelectionRect,
};
use crate::transform::{remove_strip, StripError};

/// Status shown before anything has been loaded.
pub const INITIAL_STATUS: &str = "Load an image from clipboard or file to begin";

/// Errors reported by session operations.
///
/// Each one is also turned into the session's status message.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Strip(#[from] StripError),

    #[error("No image loaded")]
    NoImage,

    #[error("No selection")]
    NoSelection,

    #[error("No image found in clipboard")]
    ClipboardEmpty,

    #[error("No processed image to save")]
    NoProcessedImage,

    #[error("Another operation is still running")]
    Busy,
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JPEG quality (1-100) used when saving as JPEG.
    pub jpeg_quality: u8,
    /// Format used by [`Session::encode_processed`] when none is given.
    pub default_format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            default_format: OutputFormat::Png,
        }
    }
}

/// Where a loaded image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Clipboard,
    File,
    Bytes,
}

impl ImageSource {
    fn as_str(self) -> &'static str {
        match self {
            ImageSource::Clipboard => "clipboard",
            ImageSource::File => "file",
            ImageSource::Bytes => "memory",
        }
    }
}

/// Fields touched by one published update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub current_image: bool,
    pub processed_image: bool,
    pub orientation: bool,
    pub selection: bool,
    pub status: bool,
    pub busy: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combine two change sets.
    pub fn merge(self, other: ChangeSet) -> ChangeSet {
        ChangeSet {
            current_image: self.current_image || other.current_image,
            processed_image: self.processed_image || other.processed_image,
            orientation: self.orientation || other.orientation,
            selection: self.selection || other.selection,
            status: self.status || other.status,
            busy: self.busy || other.busy,
        }
    }
}

/// A cut detached from the session, safe to run on another thread.
#[derive(Debug, Clone)]
pub struct ProcessJob {
    pub source: DecodedImage,
    pub selection: SelectionRect,
    pub orientation: Orientation,
}

impl ProcessJob {
    pub fn run(&self) -> Result<DecodedImage, StripError> {
        remove_strip(&self.source, &self.selection, self.orientation)
    }
}

type Subscriber = Box<dyn FnMut(&ChangeSet, &Session)>;

/// Values waiting to be published together.
#[derive(Default)]
struct Staged {
    current: Option<Option<DecodedImage>>,
    processed: Option<Option<DecodedImage>>,
    orientation: Option<Orientation>,
    selection: Option<Option<SelectionRect>>,
    status: Option<String>,
    busy: Option<bool>,
}

impl Staged {
    fn status(message: impl Into<String>) -> Self {
        Self {
            status: Some(message.into()),
            ..Self::default()
        }
    }

    fn idle(mut self) -> Self {
        self.busy = Some(false);
        self
    }
}

/// State of one editing session.
pub struct Session {
    config: SessionConfig,
    current: Option<DecodedImage>,
    processed: Option<DecodedImage>,
    orientation: Orientation,
    selection: Option<SelectionRect>,
    status: String,
    busy: bool,
    pending: ChangeSet,
    subscribers: Vec<Subscriber>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("current", &self.current.as_ref().map(|i| (i.width, i.height)))
            .field("processed", &self.processed.as_ref().map(|i| (i.width, i.height)))
            .field("orientation", &self.orientation)
            .field("selection", &self.selection)
            .field("status", &self.status)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            current: None,
            processed: None,
            orientation: Orientation::default(),
            selection: None,
            status: INITIAL_STATUS.to_string(),
            busy: false,
            pending: ChangeSet::default(),
            subscribers: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The image as originally loaded.
    pub fn current_image(&self) -> Option<&DecodedImage> {
        self.current.as_ref()
    }

    /// The result of the most recent cut.
    pub fn processed_image(&self) -> Option<&DecodedImage> {
        self.processed.as_ref()
    }

    /// The image the next cut applies to, which is also the one to display:
    /// the processed image if there is one, else the loaded image.
    pub fn active_image(&self) -> Option<&DecodedImage> {
        self.processed.as_ref().or(self.current.as_ref())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether a cut can be started right now.
    pub fn can_process(&self) -> bool {
        !self.busy && self.active_image().is_some() && self.selection.is_some()
    }

    /// Whether there is a result to save.
    pub fn can_save(&self) -> bool {
        !self.busy && self.processed.is_some()
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Register a callback invoked once per published update, after all of
    /// the update's values are in place.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ChangeSet, &Session) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Changes published since the last call, for hosts that poll.
    pub fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }

    fn publish(&mut self, staged: Staged) {
        let mut changes = ChangeSet::default();

        if let Some(current) = staged.current {
            self.current = current;
            changes.current_image = true;
        }
        if let Some(processed) = staged.processed {
            self.processed = processed;
            changes.processed_image = true;
        }
        if let Some(orientation) = staged.orientation {
            changes.orientation = orientation != self.orientation;
            self.orientation = orientation;
        }
        if let Some(selection) = staged.selection {
            changes.selection = selection != self.selection;
            self.selection = selection;
        }
        if let Some(status) = staged.status {
            changes.status = status != self.status;
            self.status = status;
        }
        if let Some(busy) = staged.busy {
            changes.busy = busy != self.busy;
            self.busy = busy;
        }

        if changes.is_empty() {
            return;
        }
        self.pending = self.pending.merge(changes);

        let mut subscribers = std::mem::take(&mut self.subscribers);
        for subscriber in subscribers.iter_mut() {
            subscriber(&changes, self);
        }
        self.subscribers = subscribers;
    }

    fn begin(&mut self, status: &str) -> Result<(), SessionError> {
        if self.busy {
            log::warn!("Refusing to start '{}' while busy", status);
            return Err(SessionError::Busy);
        }
        self.publish(Staged {
            status: Some(status.to_string()),
            busy: Some(true),
            ..Staged::default()
        });
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Mark the session busy for a load from `source`.
    pub fn start_load(&mut self, source: ImageSource) -> Result<(), SessionError> {
        self.begin(&format!("Loading image from {}...", source.as_str()))
    }

    /// Publish the outcome of a load started with [`Session::start_load`].
    ///
    /// On success the loaded image replaces the current image and the
    /// processed image and selection are cleared. On failure only the status
    /// changes.
    pub fn complete_load(
        &mut self,
        source: ImageSource,
        outcome: Result<DecodedImage, SessionError>,
    ) -> Result<(), SessionError> {
        match outcome {
            Ok(image) => {
                log::info!(
                    "Loaded {}x{} image from {}",
                    image.width,
                    image.height,
                    source.as_str()
                );
                let status = format!(
                    "Image loaded from {} ({}×{}px)",
                    source.as_str(),
                    image.width,
                    image.height
                );
                self.publish(Staged {
                    current: Some(Some(image)),
                    processed: Some(None),
                    selection: Some(None),
                    status: Some(status),
                    busy: Some(false),
                    ..Staged::default()
                });
                Ok(())
            }
            Err(err) => {
                log::warn!("Loading from {} failed: {}", source.as_str(), err);
                let status = match &err {
                    SessionError::ClipboardEmpty => err.to_string(),
                    SessionError::Decode(DecodeError::IoError(msg)) => msg.clone(),
                    _ => format!("Error loading from {}: {}", source.as_str(), err),
                };
                self.publish(Staged::status(status).idle());
                Err(err)
            }
        }
    }

    /// Decode `bytes` and make the result the current image.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.start_load(ImageSource::Bytes)?;
        let outcome = decode::decode_image(bytes).map_err(SessionError::from);
        self.complete_load(ImageSource::Bytes, outcome)
    }

    /// Decode the file at `path` and make it the current image.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.start_load(ImageSource::File)?;
        let outcome = decode::decode_file(path).map_err(SessionError::from);
        self.complete_load(ImageSource::File, outcome)
    }

    /// Read an image from `clipboard` and make it the current image.
    pub fn load_from_clipboard(
        &mut self,
        clipboard: &mut dyn ClipboardAdapter,
    ) -> Result<(), SessionError> {
        self.start_load(ImageSource::Clipboard)?;
        let outcome = match clipboard.read_image() {
            Ok(Some(image)) if !image.is_empty() => Ok(image),
            Ok(_) => Err(SessionError::ClipboardEmpty),
            Err(e) => Err(e.into()),
        };
        self.complete_load(ImageSource::Clipboard, outcome)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Switch orientation. Any existing selection is cleared since it was
    /// constrained for the old orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let status = match orientation {
            Orientation::Horizontal => {
                "Horizontal mode: Click and drag to select a horizontal segment to remove"
            }
            Orientation::Vertical => {
                "Vertical mode: Click and drag to select a vertical segment to remove"
            }
        };
        self.publish(Staged {
            orientation: Some(orientation),
            selection: Some(None),
            status: Some(status.to_string()),
            ..Staged::default()
        });
        Ok(())
    }

    /// Flip between horizontal and vertical mode.
    pub fn toggle_orientation(&mut self) -> Result<Orientation, SessionError> {
        let next = self.orientation.toggled();
        self.set_orientation(next)?;
        Ok(next)
    }

    /// Turn a finished pointer drag into the session's selection.
    ///
    /// `bounds` is where the active image is drawn on the canvas. A drag
    /// that yields no area clears the selection.
    pub fn select(
        &mut self,
        start: CanvasPoint,
        end: CanvasPoint,
        bounds: CanvasBounds,
    ) -> Result<SelectionRect, SessionError> {
        self.ensure_idle()?;
        if self.active_image().is_none() {
            return Err(SessionError::NoImage);
        }

        match normalize_selection(start, end, bounds, self.orientation) {
            Ok(rect) => {
                let extent = match self.orientation {
                    Orientation::Horizontal => bounds.height,
                    Orientation::Vertical => bounds.width,
                };
                let status = format!(
                    "{} selection: {:.0}px",
                    capitalize(self.orientation.as_str()),
                    rect.pixel_extent(self.orientation, extent)
                );
                self.publish(Staged {
                    selection: Some(Some(rect)),
                    status: Some(status),
                    ..Staged::default()
                });
                Ok(rect)
            }
            Err(err) => {
                self.publish(Staged {
                    selection: Some(None),
                    status: Some(err.to_string()),
                    ..Staged::default()
                });
                Err(err.into())
            }
        }
    }

    /// Set an already normalized selection. It is constrained to the current
    /// orientation before being stored.
    pub fn set_selection(&mut self, rect: SelectionRect) -> Result<SelectionRect, SessionError> {
        self.ensure_idle()?;
        let rect = rect.constrain(self.orientation);
        if !rect.has_area() {
            return Err(SelectionError::Degenerate.into());
        }
        self.publish(Staged {
            selection: Some(Some(rect)),
            ..Staged::default()
        });
        Ok(rect)
    }

    pub fn clear_selection(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.publish(Staged {
            selection: Some(None),
            ..Staged::default()
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Snapshot the inputs of a cut and mark the session busy.
    pub fn start_process(&mut self) -> Result<ProcessJob, SessionError> {
        self.ensure_idle()?;
        let Some(source) = self.active_image().cloned() else {
            return self.refuse_process(SessionError::NoImage);
        };
        let Some(selection) = self.selection else {
            return self.refuse_process(SessionError::NoSelection);
        };
        self.begin("Processing image...")?;
        Ok(ProcessJob {
            source,
            selection,
            orientation: self.orientation,
        })
    }

    fn refuse_process(&mut self, err: SessionError) -> Result<ProcessJob, SessionError> {
        self.publish(Staged::status("No image or selection to process"));
        Err(err)
    }

    /// Publish the outcome of a job from [`Session::start_process`].
    ///
    /// The result becomes the processed image and the selection is cleared,
    /// so a further cut needs a fresh selection.
    pub fn complete_process(
        &mut self,
        outcome: Result<DecodedImage, StripError>,
    ) -> Result<(), SessionError> {
        match outcome {
            Ok(image) => {
                log::info!(
                    "Cut {} strip, result is {}x{}",
                    self.orientation.as_str(),
                    image.width,
                    image.height
                );
                let status = format!(
                    "Image processed - {} segment removed and parts joined",
                    self.orientation.as_str()
                );
                self.publish(Staged {
                    processed: Some(Some(image)),
                    selection: Some(None),
                    status: Some(status),
                    busy: Some(false),
                    ..Staged::default()
                });
                Ok(())
            }
            Err(err) => {
                log::warn!("Processing failed: {}", err);
                self.publish(Staged::status(format!("Error processing image: {}", err)).idle());
                Err(err.into())
            }
        }
    }

    /// Cut the selected strip out of the active image.
    pub fn process(&mut self) -> Result<(), SessionError> {
        let job = self.start_process()?;
        let outcome = job.run();
        self.complete_process(outcome)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    fn processed_or_refuse(&mut self, refusal: &str) -> Result<DecodedImage, SessionError> {
        self.ensure_idle()?;
        match &self.processed {
            Some(image) => Ok(image.clone()),
            None => {
                self.publish(Staged::status(refusal));
                Err(SessionError::NoProcessedImage)
            }
        }
    }

    /// Copy the processed image to `clipboard`.
    pub fn save_to_clipboard(
        &mut self,
        clipboard: &mut dyn ClipboardAdapter,
    ) -> Result<(), SessionError> {
        let image = self.processed_or_refuse("No processed image to save to clipboard")?;
        self.begin("Copying to clipboard...")?;

        match clipboard.write_image(&image) {
            Ok(()) => {
                log::info!("Copied {}x{} image to clipboard", image.width, image.height);
                self.publish(Staged::status("Image copied to clipboard successfully").idle());
                Ok(())
            }
            Err(err) => {
                log::warn!("Clipboard write failed: {}", err);
                self.publish(
                    Staged::status(format!("Failed to copy image to clipboard: {}", err)).idle(),
                );
                Err(err.into())
            }
        }
    }

    /// Write the processed image to `path`, format chosen by extension.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<OutputFormat, SessionError> {
        let path = path.as_ref();
        let image = self.processed_or_refuse("No processed image to save")?;
        self.begin("Saving image to file...")?;

        match encode::save_to_file(&image, path, self.config.jpeg_quality) {
            Ok(format) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.publish(Staged::status(format!("Image saved to {}", name)).idle());
                Ok(format)
            }
            Err(err) => {
                log::warn!("Saving to {} failed: {}", path.display(), err);
                self.publish(Staged::status(format!("Error saving file: {}", err)).idle());
                Err(err.into())
            }
        }
    }

    /// Encode the processed image, for hosts that handle persistence
    /// themselves. Uses the configured default format when `format` is `None`.
    pub fn encode_processed(&mut self, format: Option<OutputFormat>) -> Result<Vec<u8>, SessionError> {
        let image = self.processed_or_refuse("No processed image to save")?;
        let format = format.unwrap_or(self.config.default_format);
        encode::encode_image(&image, format, self.config.jpeg_quality).map_err(|err| {
            log::warn!("Encoding {:?} failed: {}", format, err);
            self.publish(Staged::status(format!("Error encoding image: {}", err)));
            err.into()
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
