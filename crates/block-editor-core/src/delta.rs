//! Structured document change deltas.
//!
//! Every dispatcher operation reports the edits it applied to the block store, in the order they
//! were applied. Hosts and subscribers can use these to persist, sync or animate changes without
//! diffing old and new documents.

use crate::block::BlockId;

/// A single change applied to the block store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEdit {
    /// A block was inserted at `index`.
    Inserted {
        /// Index of the new block at the time of insertion.
        index: usize,
        /// Id of the new block.
        id: BlockId,
    },
    /// A block was removed from `index`.
    Removed {
        /// Index of the removed block at the time of removal.
        index: usize,
        /// Id of the removed block.
        id: BlockId,
    },
    /// A block's text was replaced.
    TextChanged {
        /// Id of the edited block.
        id: BlockId,
        /// Text before the edit.
        old_text: String,
        /// Text after the edit.
        new_text: String,
    },
    /// A block's checked flag was replaced.
    CheckedChanged {
        /// Id of the edited block.
        id: BlockId,
        /// New flag.
        checked: bool,
    },
}

impl BlockEdit {
    /// Returns `true` for inserts and removals.
    pub fn is_structural(&self) -> bool {
        matches!(self, BlockEdit::Inserted { .. } | BlockEdit::Removed { .. })
    }
}

/// A structured description of one operation's document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDelta {
    /// Block count before applying `edits`.
    pub before_len: usize,
    /// Block count after applying `edits`.
    pub after_len: usize,
    /// Ordered list of edits.
    pub edits: Vec<BlockEdit>,
}

impl DocumentDelta {
    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns `true` if any edit inserted or removed a block.
    pub fn is_structural(&self) -> bool {
        self.edits.iter().any(BlockEdit::is_structural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_delta_is_not_structural() {
        let id = BlockId::new();
        let delta = DocumentDelta {
            before_len: 1,
            after_len: 1,
            edits: vec![
                BlockEdit::TextChanged {
                    id,
                    old_text: "a".to_string(),
                    new_text: "ab".to_string(),
                },
                BlockEdit::CheckedChanged { id, checked: true },
            ],
        };
        assert!(!delta.is_empty());
        assert!(!delta.is_structural());

        let split = DocumentDelta {
            before_len: 1,
            after_len: 2,
            edits: vec![BlockEdit::Inserted {
                index: 1,
                id: BlockId::new(),
            }],
        };
        assert!(split.is_structural());
    }
}
