//! Emojiboard Core Library
//!
//! Platform-agnostic document model and view-state logic for the
//! Emojiboard collage canvas: emojis placed over a fetched background
//! image, with pan/zoom, selection, and write-on-change persistence.
//! Rendering, windowing, and gesture recognition hardware live in the
//! host application; this crate consumes gesture deltas and produces
//! state.

pub mod background;
pub mod camera;
pub mod document;
pub mod editor;
pub mod input;
pub mod palette;
pub mod selection;
pub mod storage;

pub use background::{BackgroundImage, BackgroundLoader, BackgroundState};
pub use camera::Camera;
pub use document::{Document, Emoji, EmojiId};
pub use editor::{DropPayload, Editor};
pub use input::{Gesture, GestureRecognizer, PointerEvent};
pub use palette::PaletteRegistry;
pub use selection::Selection;
pub use storage::{AutosaveManager, FileStorage, MemoryStorage, Storage};
