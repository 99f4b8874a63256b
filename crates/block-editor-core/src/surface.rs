//! Surface Synchronizer contract.
//!
//! The surface is the directly-editable visual projection of the document. It is owned by the
//! host (a terminal UI, a GUI toolkit, a test double) and driven exclusively by explicit calls
//! from the [`Dispatcher`](crate::Dispatcher); it never acts as an independent source of truth.
//! The only facts it reports back are the focused block and the caret offset, which the
//! [`CaretLocator`](crate::CaretLocator) translates into a [`CaretPosition`](crate::CaretPosition).
//!
//! # Paint sequencing
//!
//! Replacing a block's text may not land on screen immediately. [`Surface::set_block_text`]
//! therefore returns a [`PaintStatus`]: a [`PaintStatus::Pending`] token defers any caret
//! placement until the host acknowledges the paint through
//! [`Dispatcher::paint_committed`](crate::Dispatcher::paint_committed).

use crate::block::{Block, BlockId};
use std::fmt;

/// Where to mount a newly rendered block, relative to an anchor block's handle.
#[derive(Debug)]
pub enum Mount<'a, H> {
    /// After every mounted block (initial mount).
    End,
    /// Immediately before the anchor.
    Before(&'a H),
    /// Immediately after the anchor.
    After(&'a H),
}

/// Read-only view of a block handed to the surface for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockView<'a> {
    /// Block id; surfaces report it back through [`SurfaceCaret`].
    pub id: BlockId,
    /// Text to display.
    pub text: &'a str,
    /// Completion flag for to-do blocks.
    pub checked: Option<bool>,
}

impl<'a> From<&'a Block> for BlockView<'a> {
    fn from(block: &'a Block) -> Self {
        Self {
            id: block.id,
            text: &block.text,
            checked: block.checked,
        }
    }
}

/// Caret facts reported by the surface: the focused block and the caret's character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCaret {
    /// Focused block.
    pub block: BlockId,
    /// Character offset reported by the surface (may be out of range; callers clamp).
    pub offset: usize,
}

/// What kind of content a caret target holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeContent {
    /// Plain text content of the given length in characters.
    Text {
        /// Length in characters.
        char_len: usize,
    },
    /// Anything else (a widget, an unmounted node); carets clamp to position 0.
    Other,
}

/// Identifies one pending paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaintToken(u64);

impl PaintToken {
    /// Create a token from a surface-assigned sequence number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The surface-assigned sequence number.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Result of a text replacement on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStatus {
    /// The new text is already visible; follow-up caret placement may run immediately.
    Committed,
    /// The new text lands later; caret placement waits for this token to be committed.
    Pending(PaintToken),
}

/// The visual surface the dispatcher projects the document onto.
pub trait Surface {
    /// Surface-specific reference to a mounted block.
    type Handle: Clone + fmt::Debug;

    /// Mount a block's visual representation. The returned handle is used for every later call
    /// concerning this block.
    fn render_block_at(
        &mut self,
        mount: Mount<'_, Self::Handle>,
        view: BlockView<'_>,
    ) -> Self::Handle;

    /// Move input focus to a mounted block.
    fn focus(&mut self, handle: &Self::Handle);

    /// Unmount a block.
    fn remove_block(&mut self, handle: &Self::Handle);

    /// Replace a block's displayed text.
    fn set_block_text(&mut self, handle: &Self::Handle, text: &str) -> PaintStatus;

    /// Replace a to-do block's displayed completion flag.
    fn set_block_checked(&mut self, handle: &Self::Handle, checked: bool);

    /// The focused block and caret offset, if any block has focus.
    fn caret(&self) -> Option<SurfaceCaret>;

    /// The content kind of a mounted block, used to clamp caret placement.
    fn node_content(&self, handle: &Self::Handle) -> NodeContent;

    /// Place the caret at `offset` inside a block (already clamped by the caller).
    fn select(&mut self, handle: &Self::Handle, offset: usize);
}
