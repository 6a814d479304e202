//! Emoji collage document model.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Current document encoding version.
const ENCODING_VERSION: u32 = 1;

/// Smallest font size an emoji can be scaled down to.
pub const MIN_EMOJI_SIZE: i32 = 1;

/// Identity of an emoji within a document.
///
/// Assigned at creation, never reused, strictly increasing in call order
/// within a document instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmojiId(pub u64);

impl std::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single emoji placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Unique identity within the document.
    pub id: EmojiId,
    /// The emoji character (one grapheme cluster).
    pub text: String,
    /// Horizontal position in document space (origin at the board center).
    pub x: i32,
    /// Vertical position in document space.
    pub y: i32,
    /// Font size in document-space units. Always positive.
    pub size: i32,
}

/// Errors produced while decoding a persisted document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes were not valid document JSON.
    #[error("invalid document encoding: {0}")]
    Json(#[from] serde_json::Error),
    /// The encoding version is newer than this build understands.
    #[error("unsupported document encoding version {0}")]
    UnsupportedVersion(u32),
    /// The decoded document violates a structural invariant.
    #[error("inconsistent document: {0}")]
    Inconsistent(String),
}

/// A document: an ordered collection of emojis over an optional
/// background image URL.
///
/// Insertion order of `emojis` is significant; it determines draw order
/// and identity tie-breaks. Mutation intents are silent no-ops when the
/// target identity is absent, so a stale selection or a racing removal
/// never surfaces as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Encoding version of the serialized form.
    #[serde(default = "current_version")]
    version: u32,
    /// Stable document identity, used as the persistence key.
    pub id: Uuid,
    emojis: Vec<Emoji>,
    background_url: Option<Url>,
    /// Next identity to hand out. Serialized so uniqueness survives reload.
    next_id: u64,
}

fn current_version() -> u32 {
    ENCODING_VERSION
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document with a fresh identity.
    pub fn new() -> Self {
        Self {
            version: ENCODING_VERSION,
            id: Uuid::new_v4(),
            emojis: Vec::new(),
            background_url: None,
            next_id: 1,
        }
    }

    /// The emojis in draw order (first drawn at the back).
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// Look up an emoji by identity.
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }

    /// Whether an identity is present in the document.
    pub fn contains(&self, id: EmojiId) -> bool {
        self.emoji(id).is_some()
    }

    /// Check if the document has no emojis.
    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    /// Number of emojis in the document.
    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    /// Append a new emoji at the given document-space position.
    ///
    /// Returns the freshly allocated identity, or `None` (a no-op) when
    /// `text` is empty. `size` is clamped to [`MIN_EMOJI_SIZE`].
    pub fn add_emoji(&mut self, text: &str, x: i32, y: i32, size: i32) -> Option<EmojiId> {
        if text.is_empty() {
            return None;
        }
        let id = EmojiId(self.next_id);
        self.next_id += 1;
        self.emojis.push(Emoji {
            id,
            text: text.to_string(),
            x,
            y,
            size: size.max(MIN_EMOJI_SIZE),
        });
        log::debug!("added emoji {} ({:?}) at ({}, {})", id, text, x, y);
        Some(id)
    }

    /// Move an emoji by integer document-space deltas. No-op when absent.
    pub fn move_emoji(&mut self, id: EmojiId, dx: i32, dy: i32) {
        if let Some(emoji) = self.emojis.iter_mut().find(|e| e.id == id) {
            emoji.x += dx;
            emoji.y += dy;
        }
    }

    /// Multiply an emoji's size by `factor`, rounding half-to-even and
    /// clamping to [`MIN_EMOJI_SIZE`]. No-op when absent or when the
    /// factor is not a positive finite number.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        if let Some(emoji) = self.emojis.iter_mut().find(|e| e.id == id) {
            let scaled = (emoji.size as f64 * factor).round_ties_even();
            emoji.size = scaled.clamp(MIN_EMOJI_SIZE as f64, i32::MAX as f64) as i32;
        }
    }

    /// Remove an emoji by identity. No-op when absent.
    pub fn remove_emoji(&mut self, id: EmojiId) {
        self.emojis.retain(|e| e.id != id);
    }

    /// The background image URL, if any.
    pub fn background_url(&self) -> Option<&Url> {
        self.background_url.as_ref()
    }

    /// Replace the background image URL.
    pub fn set_background_url(&mut self, url: Option<Url>) {
        self.background_url = url;
    }

    /// Serialize the document to its versioned JSON encoding.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a document from its JSON encoding, validating invariants.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let mut doc: Document = serde_json::from_str(json)?;
        if doc.version > ENCODING_VERSION {
            return Err(DecodeError::UnsupportedVersion(doc.version));
        }
        let mut seen = std::collections::HashSet::new();
        for emoji in &doc.emojis {
            if !seen.insert(emoji.id) {
                return Err(DecodeError::Inconsistent(format!(
                    "duplicate emoji id {}",
                    emoji.id
                )));
            }
            if emoji.size < MIN_EMOJI_SIZE {
                return Err(DecodeError::Inconsistent(format!(
                    "emoji {} has non-positive size {}",
                    emoji.id, emoji.size
                )));
            }
        }
        // An id counter behind the highest allocated id would reuse identities.
        let max_id = doc.emojis.iter().map(|e| e.id.0).max().unwrap_or(0);
        doc.next_id = doc.next_id.max(max_id + 1);
        Ok(doc)
    }

    /// Decode a document, substituting an empty default when the bytes
    /// are missing or malformed. Never fails the caller.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("discarding undecodable document: {err}");
                Self::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_increasing_unique_ids() {
        let mut doc = Document::new();
        let ids: Vec<EmojiId> = ["😀", "🎈", "🌮", "🚀"]
            .iter()
            .filter_map(|e| doc.add_emoji(e, 0, 0, 40))
            .collect();

        assert_eq!(ids.len(), 4);
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_add_empty_text_is_noop() {
        let mut doc = Document::new();
        assert_eq!(doc.add_emoji("", 0, 0, 40), None);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_move_round_trip() {
        let mut doc = Document::new();
        let id = doc.add_emoji("😀", 10, 20, 40).unwrap();

        doc.move_emoji(id, 7, -3);
        doc.move_emoji(id, -7, 3);

        let emoji = doc.emoji(id).unwrap();
        assert_eq!((emoji.x, emoji.y), (10, 20));
    }

    #[test]
    fn test_move_unknown_id_is_noop() {
        let mut doc = Document::new();
        doc.add_emoji("😀", 0, 0, 40);
        doc.move_emoji(EmojiId(99), 5, 5);
        let emoji = &doc.emojis()[0];
        assert_eq!((emoji.x, emoji.y), (0, 0));
    }

    #[test]
    fn test_scale_composes_within_rounding() {
        let mut composed = Document::new();
        let id1 = composed.add_emoji("😀", 0, 0, 41).unwrap();
        composed.scale_emoji(id1, 1.3);
        composed.scale_emoji(id1, 0.7);

        let mut single = Document::new();
        let id2 = single.add_emoji("😀", 0, 0, 41).unwrap();
        single.scale_emoji(id2, 1.3 * 0.7);

        let a = composed.emoji(id1).unwrap().size;
        let b = single.emoji(id2).unwrap().size;
        assert!((a - b).abs() <= 1, "{a} vs {b}");
    }

    #[test]
    fn test_scale_rounds_half_to_even() {
        let mut doc = Document::new();
        let id = doc.add_emoji("😀", 0, 0, 5).unwrap();
        // 5 * 0.5 = 2.5 rounds to 2 under round-half-to-even.
        doc.scale_emoji(id, 0.5);
        assert_eq!(doc.emoji(id).unwrap().size, 2);
    }

    #[test]
    fn test_scale_clamps_to_minimum() {
        let mut doc = Document::new();
        let id = doc.add_emoji("😀", 0, 0, 4).unwrap();
        for _ in 0..10 {
            doc.scale_emoji(id, 0.1);
        }
        assert_eq!(doc.emoji(id).unwrap().size, MIN_EMOJI_SIZE);
    }

    #[test]
    fn test_scale_rejects_bad_factors() {
        let mut doc = Document::new();
        let id = doc.add_emoji("😀", 0, 0, 40).unwrap();
        doc.scale_emoji(id, 0.0);
        doc.scale_emoji(id, -2.0);
        doc.scale_emoji(id, f64::NAN);
        assert_eq!(doc.emoji(id).unwrap().size, 40);
    }

    #[test]
    fn test_intent_scenario() {
        let mut doc = Document::new();

        let id = doc.add_emoji("😀", 10, 20, 40).unwrap();
        assert_eq!(id, EmojiId(1));
        let emoji = doc.emoji(id).unwrap();
        assert_eq!((emoji.text.as_str(), emoji.x, emoji.y, emoji.size), ("😀", 10, 20, 40));

        doc.scale_emoji(id, 2.0);
        assert_eq!(doc.emoji(id).unwrap().size, 80);

        doc.move_emoji(id, 5, -5);
        let emoji = doc.emoji(id).unwrap();
        assert_eq!((emoji.x, emoji.y), (15, 15));

        doc.remove_emoji(id);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new();
        doc.add_emoji("😀", 10, 20, 40);
        doc.add_emoji("🎈", -5, 0, 64);
        doc.set_background_url(Some(Url::parse("https://example.com/bg.png").unwrap()));

        let json = doc.to_json().unwrap();
        let decoded = Document::from_json(&json).unwrap();

        assert_eq!(decoded.id, doc.id);
        assert_eq!(decoded.emojis(), doc.emojis());
        assert_eq!(decoded.background_url(), doc.background_url());
    }

    #[test]
    fn test_ids_stay_unique_after_reload() {
        let mut doc = Document::new();
        let first = doc.add_emoji("😀", 0, 0, 40).unwrap();

        let json = doc.to_json().unwrap();
        let mut reloaded = Document::from_json(&json).unwrap();
        let second = reloaded.add_emoji("🎈", 0, 0, 40).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_corrupted_json_falls_back_to_default() {
        let doc = Document::from_json_or_default("{not json");
        assert!(doc.is_empty());
        assert!(doc.background_url().is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut doc = Document::new();
        doc.add_emoji("😀", 0, 0, 40);
        let mut json = serde_json::to_value(&doc).unwrap();
        let dup = json["emojis"][0].clone();
        json["emojis"].as_array_mut().unwrap().push(dup);

        let result = Document::from_json(&json.to_string());
        assert!(matches!(result, Err(DecodeError::Inconsistent(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut doc = Document::new();
        doc.add_emoji("😀", 0, 0, 40);
        let mut json = serde_json::to_value(&doc).unwrap();
        json["version"] = serde_json::json!(999);

        let result = Document::from_json(&json.to_string());
        assert!(matches!(result, Err(DecodeError::UnsupportedVersion(999))));
    }
}
