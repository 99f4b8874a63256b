//! Block records and character-offset helpers.
//!
//! A [`Block`] is the unit of document content: a stable identifier plus plain text, and for
//! to-do documents a completion flag. All offsets in this crate are expressed in characters
//! (Unicode scalar values), never bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque block identifier, stable for the block's lifetime and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g. one restored from storage).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of blocks a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Plain paragraphs; blocks carry no `checked` flag.
    #[default]
    Notes,
    /// To-do items; every block carries a `checked` flag.
    Todo,
}

impl Variant {
    /// Create a new block of this variant. To-do blocks start unchecked.
    pub fn new_block(self, text: impl Into<String>) -> Block {
        match self {
            Variant::Notes => Block::new(text),
            Variant::Todo => Block::todo(text, false),
        }
    }
}

/// One unit of editable text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier.
    pub id: BlockId,
    /// Current plain-text content.
    pub text: String,
    /// Completion flag (to-do blocks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Block {
    /// Create a notes block with a fresh id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            text: text.into(),
            checked: None,
        }
    }

    /// Create a to-do block with a fresh id.
    pub fn todo(text: impl Into<String>, checked: bool) -> Self {
        Self {
            id: BlockId::new(),
            text: text.into(),
            checked: Some(checked),
        }
    }

    /// Create an empty notes block.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Length of `text` in characters.
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }

    /// Returns `true` if the block has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the character offset `offset` (clamped to the end of `text`).
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Split `text` at a character offset. Offsets past the end split at the end.
pub fn split_at_char(text: &str, offset: usize) -> (&str, &str) {
    text.split_at(byte_index(text, offset))
}
