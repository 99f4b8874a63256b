//! Caret Locator
//!
//! Translates between an abstract `(block, offset)` caret and the surface's own selection state.
//! Out-of-range requests are clamped, never rejected:
//!
//! - offsets past the end of a block clamp to its length
//! - targets that are not plain text clamp to position 0 (logged as a warning)

use crate::block::BlockId;
use crate::document::Document;
use crate::surface::{NodeContent, Surface};

/// The caret as seen by the dispatcher: the focused block, its text and the caret offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretPosition {
    /// Focused block.
    pub block_id: BlockId,
    /// Full text of the focused block.
    pub text: String,
    /// Length of `text` in characters.
    pub len: usize,
    /// Caret offset: 0 is before the first character, `len` after the last.
    pub offset: usize,
}

impl CaretPosition {
    /// Caret sits before the first character.
    pub fn at_start(&self) -> bool {
        self.offset == 0
    }

    /// Caret sits after the last character.
    pub fn at_end(&self) -> bool {
        self.offset == self.len
    }
}

/// Caret reading and placement, available on every [`Surface`].
pub trait CaretLocator: Surface {
    /// The focused block, its text and the caret offset within it.
    ///
    /// Returns `None` if nothing is focused or the surface reports a block the document no
    /// longer contains.
    fn current_position(&self, document: &Document) -> Option<CaretPosition>;

    /// Place the caret at `offset` inside `handle`, returning the offset actually used.
    fn set_position(&mut self, handle: &Self::Handle, offset: usize) -> usize;
}

impl<S: Surface + ?Sized> CaretLocator for S {
    fn current_position(&self, document: &Document) -> Option<CaretPosition> {
        let caret = self.caret()?;
        let Some(block) = document.block(caret.block) else {
            tracing::warn!(block = %caret.block, "focused block is not in the document");
            return None;
        };

        let len = block.char_len();
        if caret.offset > len {
            tracing::debug!(
                block = %caret.block,
                requested = caret.offset,
                len,
                "clamping reported caret offset"
            );
        }

        Some(CaretPosition {
            block_id: block.id,
            text: block.text.clone(),
            len,
            offset: caret.offset.min(len),
        })
    }

    fn set_position(&mut self, handle: &Self::Handle, offset: usize) -> usize {
        let offset = match self.node_content(handle) {
            NodeContent::Text { char_len } => {
                if offset > char_len {
                    tracing::debug!(?handle, requested = offset, char_len, "clamping caret");
                }
                offset.min(char_len)
            }
            NodeContent::Other => {
                tracing::warn!(?handle, requested = offset, "caret target is not text; using 0");
                0
            }
        };

        self.select(handle, offset);
        offset
    }
}
