//! Editor configuration.

use crate::block::Variant;

/// Storage key used by the notes editor.
pub const NOTES_STORAGE_KEY: &str = "blocks";
/// Storage key used by the to-do editor.
pub const TODO_STORAGE_KEY: &str = "todos";

/// Configuration for a [`BlockEditor`](crate::BlockEditor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Kind of blocks new documents and new blocks use.
    pub variant: Variant,
    /// Key the document is stored under.
    pub storage_key: String,
    /// Save after every content change.
    pub autosave: bool,
}

impl EditorConfig {
    /// The to-do editor: key `"todos"`, autosave on.
    pub fn todo() -> Self {
        Self {
            variant: Variant::Todo,
            storage_key: TODO_STORAGE_KEY.to_string(),
            autosave: true,
        }
    }

    /// Override the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Enable or disable autosave.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Notes,
            storage_key: NOTES_STORAGE_KEY.to_string(),
            autosave: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let notes = EditorConfig::default();
        assert_eq!(notes.variant, Variant::Notes);
        assert_eq!(notes.storage_key, "blocks");
        assert!(!notes.autosave);

        let todo = EditorConfig::todo().with_storage_key("work");
        assert_eq!(todo.variant, Variant::Todo);
        assert_eq!(todo.storage_key, "work");
        assert!(todo.autosave);
    }
}
