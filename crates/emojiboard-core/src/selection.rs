//! Selection set over emoji identities.

use crate::document::{Document, EmojiId};
use std::collections::HashSet;

/// The set of currently selected emojis.
///
/// Holds identities only, never the emojis themselves. The editor calls
/// [`Selection::prune`] after removals so the set never references an
/// identity absent from the document.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<EmojiId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle an identity's membership.
    pub fn toggle(&mut self, id: EmojiId) {
        if !self.ids.insert(id) {
            self.ids.remove(&id);
        }
    }

    /// Whether an identity is selected.
    pub fn contains(&self, id: EmojiId) -> bool {
        self.ids.contains(&id)
    }

    /// Drop a single identity from the selection.
    pub fn remove(&mut self, id: EmojiId) {
        self.ids.remove(&id);
    }

    /// Clear the selection entirely.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected emojis.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate over the selected identities (unordered).
    pub fn iter(&self) -> impl Iterator<Item = EmojiId> + '_ {
        self.ids.iter().copied()
    }

    /// Drop identities no longer present in the document.
    pub fn prune(&mut self, document: &Document) {
        self.ids.retain(|&id| document.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        let id = EmojiId(1);

        selection.toggle(id);
        assert!(selection.contains(id));

        selection.toggle(id);
        assert!(!selection.contains(id));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::new();
        selection.toggle(EmojiId(1));
        selection.toggle(EmojiId(2));
        assert_eq!(selection.len(), 2);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_prune_drops_stale_ids() {
        let mut doc = Document::new();
        let kept = doc.add_emoji("😀", 0, 0, 40).unwrap();
        let removed = doc.add_emoji("🎈", 0, 0, 40).unwrap();

        let mut selection = Selection::new();
        selection.toggle(kept);
        selection.toggle(removed);

        doc.remove_emoji(removed);
        selection.prune(&doc);

        assert!(selection.contains(kept));
        assert!(!selection.contains(removed));
    }
}
