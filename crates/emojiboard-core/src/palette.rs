//! Palette registry: named quick-insert emoji strings.
//!
//! A palette is keyed by its own content, a string of concatenated emoji
//! characters, with a human-readable display name alongside. Editing a
//! palette therefore remaps its key; the edit operations return the
//! resulting key so callers can keep their "current palette" selection
//! in sync. Which palette is current is session-local state and is not
//! part of the persisted document.

use serde::{Deserialize, Serialize};

/// A named palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Palette {
    /// The palette key: its emojis, concatenated.
    emojis: String,
    /// Display name.
    name: String,
}

/// Insertion-ordered registry of palettes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteRegistry {
    palettes: Vec<Palette>,
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self {
            palettes: vec![
                Palette {
                    emojis: "😀😂😍🤓🥳".to_string(),
                    name: "Faces".to_string(),
                },
                Palette {
                    emojis: "🍎🍌🍇🥑🌮".to_string(),
                    name: "Food".to_string(),
                },
                Palette {
                    emojis: "🐶🐱🦊🐼🦉".to_string(),
                    name: "Animals".to_string(),
                },
                Palette {
                    emojis: "⚽🏀🎾🏈🎱".to_string(),
                    name: "Sports".to_string(),
                },
            ],
        }
    }
}

impl PaletteRegistry {
    /// Create a registry with the built-in default palettes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            palettes: Vec::new(),
        }
    }

    /// Number of palettes.
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Whether the registry holds no palettes.
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// The first palette's key, or empty when the registry is empty.
    pub fn default_palette(&self) -> String {
        self.palettes
            .first()
            .map(|p| p.emojis.clone())
            .unwrap_or_default()
    }

    /// Display name for a palette key.
    pub fn name(&self, key: &str) -> Option<&str> {
        self.index_of(key).map(|i| self.palettes[i].name.as_str())
    }

    /// Iterate over `(key, name)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.palettes
            .iter()
            .map(|p| (p.emojis.as_str(), p.name.as_str()))
    }

    /// The palette key following `key`, cycling past the end.
    /// An unknown key resolves to the first palette.
    pub fn palette_after(&self, key: &str) -> String {
        self.neighbor(key, 1)
    }

    /// The palette key preceding `key`, cycling past the start.
    /// An unknown key resolves to the first palette.
    pub fn palette_before(&self, key: &str) -> String {
        self.neighbor(key, -1)
    }

    fn neighbor(&self, key: &str, step: isize) -> String {
        if self.palettes.is_empty() {
            return String::new();
        }
        match self.index_of(key) {
            Some(index) => {
                let count = self.palettes.len() as isize;
                let next = (index as isize + step).rem_euclid(count) as usize;
                self.palettes[next].emojis.clone()
            }
            None => self.default_palette(),
        }
    }

    /// Set the display name for a palette. No-op on an unknown key.
    pub fn rename(&mut self, key: &str, name: &str) {
        if let Some(index) = self.index_of(key) {
            self.palettes[index].name = name.to_string();
        }
    }

    /// Append emojis to a palette, skipping ones already present.
    ///
    /// Returns the resulting palette key. An unknown key creates a new
    /// unnamed palette from the added emojis.
    pub fn add_emoji(&mut self, emojis: &str, key: &str) -> String {
        match self.index_of(key) {
            Some(index) => {
                let additions: String = emojis
                    .chars()
                    .filter(|&c| !self.palettes[index].emojis.contains(c))
                    .collect();
                let new_key = format!("{}{}", self.palettes[index].emojis, additions);
                self.remap(index, new_key)
            }
            None => {
                if emojis.is_empty() {
                    return String::new();
                }
                self.palettes.push(Palette {
                    emojis: emojis.to_string(),
                    name: String::new(),
                });
                emojis.to_string()
            }
        }
    }

    /// Remove emojis from a palette.
    ///
    /// Returns the resulting palette key so the caller can keep its
    /// selection in sync. An unknown key returns the key unchanged.
    pub fn remove_emoji(&mut self, emojis: &str, key: &str) -> String {
        match self.index_of(key) {
            Some(index) => {
                let remaining: String = self.palettes[index]
                    .emojis
                    .chars()
                    .filter(|&c| !emojis.contains(c))
                    .collect();
                self.remap(index, remaining)
            }
            None => key.to_string(),
        }
    }

    /// Move the palette at `index` under `new_key`, keeping its name.
    /// When another palette already owns the new key, the edited entry
    /// merges into it.
    fn remap(&mut self, index: usize, new_key: String) -> String {
        if self.palettes[index].emojis == new_key {
            return new_key;
        }
        if let Some(existing) = self.index_of(&new_key) {
            if existing != index {
                self.palettes.remove(index);
                return new_key;
            }
        }
        self.palettes[index].emojis = new_key.clone();
        new_key
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.palettes.iter().position(|p| p.emojis == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PaletteRegistry {
        let mut reg = PaletteRegistry::empty();
        reg.add_emoji("😀😂", "");
        reg.rename("😀😂", "Faces");
        reg.add_emoji("🍎🍌", "");
        reg.rename("🍎🍌", "Food");
        reg
    }

    #[test]
    fn test_default_registry_is_populated() {
        let reg = PaletteRegistry::new();
        assert!(!reg.is_empty());
        assert_eq!(reg.name(&reg.default_palette()), Some("Faces"));
    }

    #[test]
    fn test_cyclic_navigation() {
        let reg = registry();

        let first = reg.default_palette();
        let second = reg.palette_after(&first);
        assert_eq!(reg.name(&second), Some("Food"));

        // Wraps around in both directions.
        assert_eq!(reg.palette_after(&second), first);
        assert_eq!(reg.palette_before(&first), second);
    }

    #[test]
    fn test_unknown_key_resolves_to_first() {
        let reg = registry();
        assert_eq!(reg.palette_after("🚀"), reg.default_palette());
        assert_eq!(reg.palette_before("🚀"), reg.default_palette());
    }

    #[test]
    fn test_rename_preserves_key() {
        let mut reg = registry();
        reg.rename("😀😂", "Smileys");
        assert_eq!(reg.name("😀😂"), Some("Smileys"));
    }

    #[test]
    fn test_add_emoji_remaps_key_and_keeps_name() {
        let mut reg = registry();
        let new_key = reg.add_emoji("🥳", "😀😂");

        assert_eq!(new_key, "😀😂🥳");
        assert_eq!(reg.name(&new_key), Some("Faces"));
        assert_eq!(reg.name("😀😂"), None);
    }

    #[test]
    fn test_add_emoji_skips_duplicates() {
        let mut reg = registry();
        let new_key = reg.add_emoji("😂🥳", "😀😂");
        assert_eq!(new_key, "😀😂🥳");
    }

    #[test]
    fn test_remove_emoji_returns_new_key() {
        let mut reg = registry();
        let new_key = reg.remove_emoji("😂", "😀😂");

        assert_eq!(new_key, "😀");
        assert_eq!(reg.name("😀"), Some("Faces"));
    }

    #[test]
    fn test_remove_unknown_key_is_noop() {
        let mut reg = registry();
        let key = reg.remove_emoji("😀", "🚀");
        assert_eq!(key, "🚀");
        assert_eq!(reg.len(), 2);
    }
}
