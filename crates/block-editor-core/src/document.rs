//! Block Store
//!
//! [`Document`] is the ordered sequence of blocks and the single source of truth for content and
//! order. It never becomes empty: construction rejects an empty block list and
//! [`Document::remove_at`] refuses to remove the last remaining block.
//!
//! # Example
//!
//! ```rust
//! use block_editor_core::{Block, Document};
//!
//! let mut doc = Document::new();
//! doc.insert(1, Block::new("second")).unwrap();
//! doc.set_text(0, "first").unwrap();
//!
//! assert_eq!(doc.len(), 2);
//! assert_eq!(doc.get(0).unwrap().text, "first");
//! assert!(doc.remove_at(0).is_ok());
//! assert!(doc.remove_at(0).is_err());
//! ```

use crate::block::{Block, BlockId, Variant};
use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, never-empty sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// A document holding one empty notes block.
    pub fn new() -> Self {
        Self::seeded(Variant::Notes)
    }

    /// A document holding one empty block of the given variant.
    pub fn seeded(variant: Variant) -> Self {
        Self {
            blocks: vec![variant.new_block(String::new())],
        }
    }

    /// Build a document from existing blocks.
    ///
    /// Fails with [`EditorError::InvalidOperation`] for an empty list and
    /// [`EditorError::InvalidArgument`] if two blocks share an id.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, EditorError> {
        if blocks.is_empty() {
            return Err(EditorError::InvalidOperation(
                "a document must contain at least one block",
            ));
        }

        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id) {
                return Err(EditorError::InvalidArgument(format!(
                    "duplicate block id {}",
                    block.id
                )));
            }
        }

        Ok(Self { blocks })
    }

    /// Number of blocks (always at least 1).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in editing order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block ids in editing order.
    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    /// Block at `index`.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Block with identifier `id`.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Current index of the block with identifier `id`.
    ///
    /// Linear scan; indices shift after every insert/remove, so callers re-resolve before each
    /// structural mutation instead of caching the result.
    pub fn index_of_id(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Id of the block immediately before `id`, if any.
    pub fn previous_id(&self, id: BlockId) -> Option<BlockId> {
        let index = self.index_of_id(id)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.blocks.get(prev))
            .map(|b| b.id)
    }

    /// Id of the block immediately after `id`, if any.
    pub fn next_id(&self, id: BlockId) -> Option<BlockId> {
        let index = self.index_of_id(id)?;
        self.blocks.get(index + 1).map(|b| b.id)
    }

    /// Insert `block` at `index` (`0 <= index <= len`), shifting later blocks down.
    pub fn insert(&mut self, index: usize, block: Block) -> Result<(), EditorError> {
        if index > self.blocks.len() {
            return Err(EditorError::IndexOutOfBounds {
                index,
                len: self.blocks.len(),
            });
        }
        if self.index_of_id(block.id).is_some() {
            return Err(EditorError::InvalidArgument(format!(
                "duplicate block id {}",
                block.id
            )));
        }

        self.blocks.insert(index, block);
        Ok(())
    }

    /// Remove and return the block at `index`.
    ///
    /// Fails with [`EditorError::InvalidOperation`] if this would empty the document.
    pub fn remove_at(&mut self, index: usize) -> Result<Block, EditorError> {
        self.check_index(index)?;
        if self.blocks.len() == 1 {
            return Err(EditorError::InvalidOperation(
                "cannot remove the last remaining block",
            ));
        }

        Ok(self.blocks.remove(index))
    }

    /// Replace the text of the block at `index`, returning the previous text.
    pub fn set_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<String, EditorError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.blocks[index].text, text.into()))
    }

    /// Replace the checked flag of the block at `index`, returning the previous flag.
    pub fn set_checked(
        &mut self,
        index: usize,
        checked: bool,
    ) -> Result<Option<bool>, EditorError> {
        self.check_index(index)?;
        Ok(self.blocks[index].checked.replace(checked))
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index >= self.blocks.len() {
            return Err(EditorError::IndexOutOfBounds {
                index,
                len: self.blocks.len(),
            });
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Block>> for Document {
    type Error = EditorError;

    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        Self::from_blocks(blocks)
    }
}

impl From<Document> for Vec<Block> {
    fn from(document: Document) -> Self {
        document.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> Document {
        Document::from_blocks(texts.iter().map(|t| Block::new(*t)).collect()).unwrap()
    }

    fn texts(doc: &Document) -> Vec<&str> {
        doc.blocks().iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_new_document_has_one_empty_block() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        assert!(doc.get(0).unwrap().is_empty());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_insert_shifts_following_blocks() {
        let mut d = doc(&["a", "c"]);
        d.insert(1, Block::new("b")).unwrap();
        d.insert(3, Block::new("d")).unwrap();
        assert_eq!(texts(&d), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_insert_out_of_bounds_is_rejected_without_mutation() {
        let mut d = doc(&["a"]);
        let err = d.insert(2, Block::new("x")).unwrap_err();
        assert!(matches!(
            err,
            EditorError::IndexOutOfBounds { index: 2, len: 1 }
        ));
        assert_eq!(texts(&d), vec!["a"]);
    }

    #[test]
    fn test_remove_last_block_is_rejected() {
        let mut d = doc(&["only"]);
        assert!(matches!(
            d.remove_at(0),
            Err(EditorError::InvalidOperation(_))
        ));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_remove_returns_block() {
        let mut d = doc(&["a", "b"]);
        let removed = d.remove_at(0).unwrap();
        assert_eq!(removed.text, "a");
        assert_eq!(texts(&d), vec!["b"]);
    }

    #[test]
    fn test_index_of_id_tracks_shifts() {
        let mut d = doc(&["a", "b"]);
        let b = d.get(1).unwrap().id;
        d.insert(0, Block::new("z")).unwrap();
        assert_eq!(d.index_of_id(b), Some(2));
        assert_eq!(d.index_of_id(BlockId::new()), None);
    }

    #[test]
    fn test_neighbours() {
        let d = doc(&["a", "b", "c"]);
        let ids = d.ids();
        assert_eq!(d.previous_id(ids[0]), None);
        assert_eq!(d.previous_id(ids[1]), Some(ids[0]));
        assert_eq!(d.next_id(ids[1]), Some(ids[2]));
        assert_eq!(d.next_id(ids[2]), None);
    }

    #[test]
    fn test_set_text_and_checked() {
        let mut d = Document::seeded(Variant::Todo);
        assert_eq!(d.set_text(0, "task").unwrap(), "");
        assert_eq!(d.set_checked(0, true).unwrap(), Some(false));
        assert_eq!(d.get(0).unwrap().checked, Some(true));
        assert!(d.set_text(1, "nope").is_err());
    }

    #[test]
    fn test_from_blocks_rejects_empty_and_duplicates() {
        assert!(matches!(
            Document::from_blocks(Vec::new()),
            Err(EditorError::InvalidOperation(_))
        ));

        let block = Block::new("a");
        assert!(matches!(
            Document::from_blocks(vec![block.clone(), block]),
            Err(EditorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_and_validation() {
        let d = doc(&["a", "b"]);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.starts_with('['));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);

        assert!(serde_json::from_str::<Document>("[]").is_err());
    }
}
