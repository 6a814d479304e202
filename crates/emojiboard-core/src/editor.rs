//! The editor: mediates between gesture deltas and the document.
//!
//! Owns the document, camera, selection, and background loader, and is
//! driven from a single thread; the background fetch is the only work
//! that runs concurrently, and its results arrive through a watch
//! channel rather than shared memory. Drag and magnification gestures
//! switch mode on selection emptiness: with nothing selected they
//! transform the whole board, with a selection they move or scale the
//! selected emojis instead.

use kurbo::{Point, Size, Vec2};
use url::Url;

use crate::background::{self, BackgroundLoader, BackgroundState};
use crate::camera::Camera;
use crate::document::{Document, Emoji, EmojiId};
use crate::selection::Selection;
use crate::storage;
use tokio::sync::watch;

/// Font size for emojis inserted by drag-and-drop.
pub const DEFAULT_EMOJI_SIZE: i32 = 40;

/// A payload delivered by drag-and-drop or paste.
///
/// Callers should offer a URL payload before a text payload when a drop
/// provides both.
#[derive(Debug, Clone)]
pub enum DropPayload {
    /// An image URL becomes the new background.
    Url(Url),
    /// A text payload is inserted as an emoji.
    Text(String),
}

/// Headless controller for one document.
pub struct Editor {
    document: Document,
    camera: Camera,
    selection: Selection,
    loader: BackgroundLoader,
    /// Live drag offset of the selected emojis, in document space.
    live_selection_offset: Vec2,
    /// Live magnification of the selected emojis.
    live_selection_scale: f64,
    dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor over a fresh empty document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create an editor over an existing document.
    ///
    /// When the document carries a background URL the fetch starts
    /// immediately, which requires an ambient tokio runtime.
    pub fn with_document(document: Document) -> Self {
        let mut loader = BackgroundLoader::new();
        if let Some(url) = document.background_url() {
            loader.request(Some(url.clone()));
        }
        Self {
            document,
            camera: Camera::new(),
            selection: Selection::new(),
            loader,
            live_selection_offset: Vec2::ZERO,
            live_selection_scale: 1.0,
            dirty: false,
        }
    }

    /// The document being edited.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The view transform.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The persistence key for this document.
    pub fn storage_key(&self) -> String {
        storage::document_key(&self.document.id)
    }

    /// Whether the document changed since the dirty flag was last taken.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Take and clear the dirty flag. The persistence driver calls this
    /// to decide whether a snapshot write is due.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
    }

    // Document intents

    /// Insert an emoji at a document-space position.
    pub fn add_emoji(&mut self, text: &str, location: Point, size: i32) -> Option<EmojiId> {
        let id = self
            .document
            .add_emoji(text, location.x.round() as i32, location.y.round() as i32, size)?;
        self.mark_changed();
        Some(id)
    }

    /// Remove an emoji, dropping it from the selection as well.
    pub fn remove_emoji(&mut self, id: EmojiId) {
        if !self.document.contains(id) {
            return;
        }
        self.document.remove_emoji(id);
        self.selection.remove(id);
        self.mark_changed();
    }

    /// Remove every selected emoji.
    pub fn delete_selected(&mut self) {
        let ids: Vec<EmojiId> = self.selection.iter().collect();
        for id in ids {
            self.document.remove_emoji(id);
            self.mark_changed();
        }
        self.selection.clear();
    }

    /// Replace the background, normalizing share links and starting the
    /// fetch. Requires an ambient tokio runtime when `url` is `Some`.
    pub fn set_background_url(&mut self, url: Option<Url>) {
        let normalized = url.map(|u| background::direct_image_url(&u));
        self.document.set_background_url(normalized.clone());
        self.mark_changed();
        self.loader.request(normalized);
    }

    // Selection intents

    /// Toggle an emoji's selection membership. Stale ids are ignored.
    pub fn tap_emoji(&mut self, id: EmojiId) {
        if self.document.contains(id) {
            self.selection.toggle(id);
        }
    }

    /// A tap on empty background clears the selection.
    pub fn tap_background(&mut self) {
        self.selection.clear();
    }

    // Drag gestures

    /// Update the live drag tier. Pans the board, or moves the selected
    /// emojis when the selection is non-empty.
    pub fn drag_changed(&mut self, translation: Vec2) {
        if self.selection.is_empty() {
            self.camera.pan_changed(translation);
        } else {
            self.live_selection_offset = translation / self.camera.zoom_scale();
        }
    }

    /// Commit a finished drag.
    pub fn drag_ended(&mut self, translation: Vec2) {
        if self.selection.is_empty() {
            self.camera.pan_ended(translation);
            return;
        }
        self.live_selection_offset = Vec2::ZERO;
        let delta = translation / self.camera.zoom_scale();
        let (dx, dy) = (delta.x.round() as i32, delta.y.round() as i32);
        let ids: Vec<EmojiId> = self.selection.iter().collect();
        for id in ids {
            self.document.move_emoji(id, dx, dy);
        }
        self.mark_changed();
    }

    // Magnification gestures

    /// Update the live zoom tier. Zooms the board, or scales the
    /// selected emojis when the selection is non-empty.
    pub fn magnify_changed(&mut self, scale: f64) {
        if self.selection.is_empty() {
            self.camera.magnify_changed(scale);
        } else if scale.is_finite() && scale > 0.0 {
            self.live_selection_scale = scale;
        }
    }

    /// Commit a finished magnification.
    pub fn magnify_ended(&mut self, scale: f64) {
        if self.selection.is_empty() {
            self.camera.magnify_ended(scale);
            return;
        }
        self.live_selection_scale = 1.0;
        let ids: Vec<EmojiId> = self.selection.iter().collect();
        for id in ids {
            self.document.scale_emoji(id, scale);
        }
        self.mark_changed();
    }

    // Fit and drop

    /// Fit the loaded background image into the viewport. No-op when no
    /// image is loaded.
    pub fn zoom_to_fit(&mut self, viewport: Size) {
        if let Some(image) = self.loader.state().image() {
            self.camera.zoom_to_fit(viewport, image.natural_size());
        }
    }

    /// A double-tap on the background zooms to fit.
    pub fn double_tap(&mut self, viewport: Size) {
        self.zoom_to_fit(viewport);
    }

    /// Handle a drop at a raw viewport location. Returns whether the
    /// payload was consumed.
    pub fn drop_payload(&mut self, payload: DropPayload, location: Point, viewport: Size) -> bool {
        match payload {
            DropPayload::Url(url) => {
                self.set_background_url(Some(url));
                true
            }
            DropPayload::Text(text) => {
                let point = self.camera.document_point(location, viewport);
                self.add_emoji(&text, point, DEFAULT_EMOJI_SIZE).is_some()
            }
        }
    }

    // Derived geometry and background state

    /// Viewport position of an emoji, including any live drag offset on
    /// the selection.
    pub fn emoji_position(&self, emoji: &Emoji, viewport: Size) -> Point {
        let mut location = Point::new(emoji.x as f64, emoji.y as f64);
        if self.selection.contains(emoji.id) {
            location += self.live_selection_offset;
        }
        self.camera.viewport_point(location, viewport)
    }

    /// On-screen font size of an emoji, including any live
    /// magnification on the selection.
    pub fn emoji_display_size(&self, emoji: &Emoji) -> f64 {
        let mut size = emoji.size as f64 * self.camera.zoom_scale();
        if self.selection.contains(emoji.id) {
            size *= self.live_selection_scale;
        }
        size
    }

    /// Whether a background fetch is in flight (show a spinner).
    pub fn is_loading(&self) -> bool {
        self.loader.state().is_fetching()
    }

    /// Snapshot of the background loading state.
    pub fn background_state(&self) -> BackgroundState {
        self.loader.state()
    }

    /// Subscribe to background loading state changes.
    pub fn subscribe_background(&self) -> watch::Receiver<BackgroundState> {
        self.loader.subscribe()
    }
}
