//! Edit Command Dispatcher
//!
//! The dispatcher is the state machine at the centre of the editor. Given a key event and the
//! current caret context it decides which blocks are created, split, merged or removed, applies
//! the change to the [`Document`], drives the [`Surface`] to mirror it, and places the caret.
//!
//! # Cases
//!
//! | Key | Condition | Case |
//! |---|---|---|
//! | Enter | empty block, or caret at end | [`EditCase::InsertAfter`] |
//! | Enter | caret at start of a non-empty block | [`EditCase::InsertBefore`] |
//! | Enter | caret in the middle | [`EditCase::Split`] |
//! | Backspace | caret at 0, previous block, empty block | [`EditCase::RemoveEmpty`] |
//! | Backspace | caret at 0, previous block, non-empty block | [`EditCase::MergeIntoPrevious`] |
//! | Left | caret at 0, previous block | [`EditCase::MoveToEndOfPrevious`] |
//! | Right | caret at end, next block | [`EditCase::MoveToStartOfNext`] |
//! | Up | previous block | [`EditCase::MoveUp`] (else [`EditCase::TopBoundary`]) |
//! | Down | next block | [`EditCase::MoveDown`] |
//!
//! Everything else is [`EditCase::PassThrough`]: the host applies its default behaviour and
//! reports the result through [`Dispatcher::handle_input`].
//!
//! # Example
//!
//! ```rust
//! use block_editor_core::{
//!     Block, Dispatcher, Document, HeadlessSurface, Key, KeyOutcome, Variant,
//! };
//!
//! let doc = Document::from_blocks(vec![Block::new("hello")]).unwrap();
//! let mut dispatcher = Dispatcher::new(doc, HeadlessSurface::new(), Variant::Notes);
//! let first = dispatcher.document().get(0).unwrap().id;
//! dispatcher.focus_block(first, 2).unwrap();
//!
//! let result = dispatcher.handle_key(Key::Enter).unwrap();
//! assert_eq!(result.outcome, KeyOutcome::PreventDefault);
//!
//! let texts: Vec<&str> = dispatcher.document().blocks().iter().map(|b| b.text.as_str()).collect();
//! assert_eq!(texts, vec!["he", "llo"]);
//! assert_eq!(dispatcher.caret_position().unwrap().offset, 0);
//! ```

use crate::block::{Block, BlockId, Variant, char_len, split_at_char};
use crate::caret::{CaretLocator, CaretPosition};
use crate::delta::BlockEdit;
use crate::document::Document;
use crate::error::EditorError;
use crate::surface::{BlockView, Mount, PaintStatus, PaintToken, Surface};
use crate::vertical::ColumnTracker;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Keys the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Enter / Return.
    Enter,
    /// Backspace.
    Backspace,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Any other key (typing, Home/End, Delete, ...).
    Other,
}

impl Key {
    /// Up or Down.
    pub fn is_vertical(self) -> bool {
        matches!(self, Key::ArrowUp | Key::ArrowDown)
    }
}

/// Where a new block goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Immediately before the anchor.
    Before,
    /// Immediately after the anchor.
    After,
}

impl FromStr for Placement {
    type Err = EditorError;

    /// Parses `"before"` / `"after"`. Anything else is [`EditorError::InvalidArgument`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Placement::Before),
            "after" => Ok(Placement::After),
            other => Err(EditorError::InvalidArgument(format!(
                "unknown insertion level '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Before => write!(f, "before"),
            Placement::After => write!(f, "after"),
        }
    }
}

/// Whether the host should run its own default behaviour for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The dispatcher acted; suppress the default.
    PreventDefault,
    /// The dispatcher did nothing; let the default happen.
    AllowDefault,
}

/// Everything the classifier needs to know about the caret when a key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    /// Focused block.
    pub block_id: BlockId,
    /// Its current index.
    pub index: usize,
    /// Its text length in characters.
    pub len: usize,
    /// Caret offset within it.
    pub offset: usize,
    /// Block immediately before, if any.
    pub previous: Option<BlockId>,
    /// Block immediately after, if any.
    pub next: Option<BlockId>,
}

impl KeyContext {
    /// Build the context for a caret position, or `None` if its block is not in `document`.
    pub fn from_position(position: &CaretPosition, document: &Document) -> Option<Self> {
        let index = document.index_of_id(position.block_id)?;
        Some(Self {
            block_id: position.block_id,
            index,
            len: position.len,
            offset: position.offset,
            previous: index
                .checked_sub(1)
                .and_then(|prev| document.get(prev))
                .map(|b| b.id),
            next: document.get(index + 1).map(|b| b.id),
        })
    }
}

/// The named cases of the editing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCase {
    /// Insert an empty block after the current one and focus it.
    InsertAfter,
    /// Insert an empty block before the current one; focus stays.
    InsertBefore,
    /// Split the current block at `offset`; focus the tail at 0.
    Split {
        /// Split point in characters.
        offset: usize,
    },
    /// Remove the (empty) current block; caret to the end of `previous`.
    RemoveEmpty {
        /// Block receiving the caret.
        previous: BlockId,
    },
    /// Append the current block to `previous`, remove it; caret at the join point.
    MergeIntoPrevious {
        /// Block receiving the text.
        previous: BlockId,
    },
    /// Caret to the end of `previous`.
    MoveToEndOfPrevious {
        /// Target block.
        previous: BlockId,
    },
    /// Caret to the start of `next`.
    MoveToStartOfNext {
        /// Target block.
        next: BlockId,
    },
    /// Caret to the remembered column in `previous`.
    MoveUp {
        /// Target block.
        previous: BlockId,
    },
    /// Caret to the remembered column in `next`.
    MoveDown {
        /// Target block.
        next: BlockId,
    },
    /// Up in the first block: default behaviour, remembered column resets.
    TopBoundary,
    /// No special handling.
    PassThrough,
}

impl EditCase {
    /// Whether the host must suppress its default behaviour.
    pub fn outcome(self) -> KeyOutcome {
        match self {
            EditCase::TopBoundary | EditCase::PassThrough => KeyOutcome::AllowDefault,
            _ => KeyOutcome::PreventDefault,
        }
    }
}

/// Classify a key press. Pure; performs no mutation.
pub fn classify(key: Key, ctx: &KeyContext) -> EditCase {
    match key {
        Key::Enter => {
            if ctx.len == 0 || ctx.offset >= ctx.len {
                EditCase::InsertAfter
            } else if ctx.offset == 0 {
                EditCase::InsertBefore
            } else {
                EditCase::Split { offset: ctx.offset }
            }
        }
        Key::Backspace => match ctx.previous {
            Some(previous) if ctx.offset == 0 && ctx.len == 0 => EditCase::RemoveEmpty { previous },
            Some(previous) if ctx.offset == 0 => EditCase::MergeIntoPrevious { previous },
            _ => EditCase::PassThrough,
        },
        Key::ArrowLeft => match ctx.previous {
            Some(previous) if ctx.offset == 0 => EditCase::MoveToEndOfPrevious { previous },
            _ => EditCase::PassThrough,
        },
        Key::ArrowRight => match ctx.next {
            Some(next) if ctx.offset >= ctx.len => EditCase::MoveToStartOfNext { next },
            _ => EditCase::PassThrough,
        },
        Key::ArrowUp => match ctx.previous {
            Some(previous) => EditCase::MoveUp { previous },
            None => EditCase::TopBoundary,
        },
        Key::ArrowDown => match ctx.next {
            Some(next) => EditCase::MoveDown { next },
            None => EditCase::PassThrough,
        },
        Key::Other => EditCase::PassThrough,
    }
}

/// Result of dispatching one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// The classified case.
    pub case: EditCase,
    /// Whether the host should suppress its default behaviour.
    pub outcome: KeyOutcome,
    /// Block store edits, in application order.
    pub edits: Vec<BlockEdit>,
    /// Whether the dispatcher moved (or scheduled moving) the caret.
    pub caret_moved: bool,
}

impl Dispatched {
    fn unfocused(key: Key) -> Self {
        let outcome = if key == Key::Enter {
            KeyOutcome::PreventDefault
        } else {
            KeyOutcome::AllowDefault
        };
        Self {
            case: EditCase::PassThrough,
            outcome,
            edits: Vec::new(),
            caret_moved: false,
        }
    }
}

/// Outstanding paints and the caret placement waiting on them.
#[derive(Debug, Default)]
struct PaintQueue {
    outstanding: Vec<PaintToken>,
    caret: Option<(BlockId, usize)>,
}

impl PaintQueue {
    fn is_idle(&self) -> bool {
        self.outstanding.is_empty()
    }

    fn track(&mut self, status: PaintStatus) {
        if let PaintStatus::Pending(token) = status {
            self.outstanding.push(token);
        }
    }

    /// Acknowledge a paint. Returns the deferred caret once nothing is outstanding.
    fn commit(&mut self, token: PaintToken) -> Option<(BlockId, usize)> {
        let before = self.outstanding.len();
        self.outstanding.retain(|t| *t != token);
        if self.outstanding.len() == before {
            tracing::debug!(token = token.value(), "ignoring unknown paint token");
        }

        if self.outstanding.is_empty() {
            self.caret.take()
        } else {
            None
        }
    }
}

/// The edit command dispatcher.
///
/// Owns the document, the surface and the handle of every mounted block. It is the only writer
/// of both: every operation mutates the [`Document`] first and then projects the change onto
/// the surface.
pub struct Dispatcher<S: Surface> {
    document: Document,
    surface: S,
    handles: HashMap<BlockId, S::Handle>,
    columns: ColumnTracker,
    variant: Variant,
    paint: PaintQueue,
}

impl<S: Surface> Dispatcher<S> {
    /// Mount `document` on `surface` and focus the first block at offset 0.
    pub fn new(document: Document, surface: S, variant: Variant) -> Self {
        let mut dispatcher = Self {
            document,
            surface,
            handles: HashMap::new(),
            columns: ColumnTracker::new(),
            variant,
            paint: PaintQueue::default(),
        };

        for block in dispatcher.document.blocks() {
            let handle = dispatcher
                .surface
                .render_block_at(Mount::End, BlockView::from(block));
            dispatcher.handles.insert(block.id, handle);
        }

        if let Some(first) = dispatcher.document.get(0).map(|b| b.id)
            && let Some(handle) = dispatcher.handles.get(&first).cloned()
        {
            dispatcher.surface.focus(&handle);
            dispatcher.surface.set_position(&handle, 0);
        }

        dispatcher
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for host-side default behaviour (typing, pointer).
    ///
    /// Changes made here must be reported back through [`handle_input`](Self::handle_input) or
    /// [`handle_pointer`](Self::handle_pointer).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Block variant used for new blocks.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Remembered column for vertical navigation.
    pub fn remembered_column(&self) -> usize {
        self.columns.remembered()
    }

    /// Whether a caret placement is waiting on a paint acknowledgement.
    pub fn has_pending_paint(&self) -> bool {
        !self.paint.is_idle()
    }

    /// Current caret position.
    pub fn caret_position(&self) -> Option<CaretPosition> {
        self.surface.current_position(&self.document)
    }

    /// Current caret context for classification.
    pub fn key_context(&self) -> Option<KeyContext> {
        let position = self.caret_position()?;
        KeyContext::from_position(&position, &self.document)
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: Key) -> Result<Dispatched, EditorError> {
        self.ensure_painted()?;

        let Some(ctx) = self.key_context() else {
            tracing::debug!(?key, "key with no focused block");
            return Ok(Dispatched::unfocused(key));
        };

        let case = classify(key, &ctx);
        tracing::trace!(
            ?key,
            ?case,
            block = %ctx.block_id,
            offset = ctx.offset,
            len = ctx.len,
            "dispatch"
        );

        if !key.is_vertical() {
            self.columns.record_column(ctx.offset);
        }

        let mut edits = Vec::new();
        let landed = self.apply(case, &ctx, &mut edits)?;

        if let Some(offset) = landed
            && !key.is_vertical()
        {
            self.columns.record_column(offset);
        }

        Ok(Dispatched {
            case,
            outcome: case.outcome(),
            edits,
            caret_moved: landed.is_some(),
        })
    }

    /// Reconcile text the surface changed on its own (typing, native deletion) into the store.
    ///
    /// A block the document no longer contains is ignored with a diagnostic.
    pub fn handle_input(
        &mut self,
        block: BlockId,
        text: impl Into<String>,
    ) -> Result<Vec<BlockEdit>, EditorError> {
        self.ensure_painted()?;

        let Some(index) = self.document.index_of_id(block) else {
            tracing::warn!(%block, "input for a block that is not in the document");
            return Ok(Vec::new());
        };

        let text = text.into();
        let mut edits = Vec::new();
        if self.document.get(index).is_some_and(|b| b.text != text) {
            let old_text = self.document.set_text(index, text.clone())?;
            edits.push(BlockEdit::TextChanged {
                id: block,
                old_text,
                new_text: text,
            });
        }

        if let Some(position) = self.caret_position() {
            self.columns.record_column(position.offset);
        }

        Ok(edits)
    }

    /// Record the caret column after a pointer-driven caret placement on the surface.
    pub fn handle_pointer(&mut self) -> Result<(), EditorError> {
        self.caret_moved()
    }

    /// Record the caret column after the host moved the caret on its own.
    ///
    /// Hosts call this once their default behaviour for a passed-through horizontal key (Left,
    /// Right, Home, End) has moved the caret, so the next vertical move starts from where the
    /// caret actually is.
    pub fn caret_moved(&mut self) -> Result<(), EditorError> {
        self.ensure_painted()?;
        if let Some(position) = self.caret_position() {
            self.columns.record_column(position.offset);
        }
        Ok(())
    }

    /// Focus `block` and place the caret at `offset` (clamped). Returns the offset used.
    pub fn focus_block(&mut self, block: BlockId, offset: usize) -> Result<usize, EditorError> {
        self.ensure_painted()?;
        let offset = self.focus_at(block, offset)?;
        self.columns.record_column(offset);
        Ok(offset)
    }

    /// Insert a new block with `text` next to `anchor`. Focus does not move.
    pub fn insert_block(
        &mut self,
        anchor: BlockId,
        placement: Placement,
        text: impl Into<String>,
    ) -> Result<(BlockId, Vec<BlockEdit>), EditorError> {
        self.ensure_painted()?;
        let block = self.variant.new_block(text);
        let id = block.id;
        let index = self.insert_relative(anchor, placement, block)?;
        Ok((id, vec![BlockEdit::Inserted { index, id }]))
    }

    /// Remove `block`. Removing the last block is rejected. If the block had focus, the caret
    /// moves to the end of the previous block (or the start of the next one).
    pub fn remove_block(&mut self, block: BlockId) -> Result<Vec<BlockEdit>, EditorError> {
        self.ensure_painted()?;
        if self.document.len() == 1 {
            return Err(EditorError::InvalidOperation(
                "cannot remove the last remaining block",
            ));
        }

        let had_focus = self.surface.caret().is_some_and(|c| c.block == block);
        let previous = self.document.previous_id(block);
        let next = self.document.next_id(block);

        let index = self.remove(block)?;

        if had_focus {
            match (previous, next) {
                (Some(previous), _) => {
                    let end = self.block_len(previous)?;
                    self.focus_at(previous, end)?;
                }
                (None, Some(next)) => {
                    self.focus_at(next, 0)?;
                }
                (None, None) => {}
            }
        }

        Ok(vec![BlockEdit::Removed { index, id: block }])
    }

    /// Set a to-do block's completion flag.
    ///
    /// Only to-do documents carry the flag; a block the document no longer contains is ignored
    /// with a diagnostic.
    pub fn set_checked(
        &mut self,
        block: BlockId,
        checked: bool,
    ) -> Result<Vec<BlockEdit>, EditorError> {
        self.ensure_painted()?;
        if self.variant != Variant::Todo {
            return Err(EditorError::InvalidOperation(
                "checked flags exist only in to-do documents",
            ));
        }

        let Some(index) = self.document.index_of_id(block) else {
            tracing::warn!(%block, "checked change for a block that is not in the document");
            return Ok(Vec::new());
        };
        let handle = self.handle(block)?;

        if self.document.set_checked(index, checked)? == Some(checked) {
            return Ok(Vec::new());
        }
        self.surface.set_block_checked(&handle, checked);

        Ok(vec![BlockEdit::CheckedChanged { id: block, checked }])
    }

    /// Acknowledge that a pending paint has landed on screen.
    ///
    /// Once no paint is outstanding, the deferred caret placement runs. Returns `true` if it did.
    pub fn paint_committed(&mut self, token: PaintToken) -> Result<bool, EditorError> {
        match self.paint.commit(token) {
            Some((block, offset)) => {
                self.focus_at(block, offset)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Apply a classified case. Returns the caret's landing offset if the caret moved.
    fn apply(
        &mut self,
        case: EditCase,
        ctx: &KeyContext,
        edits: &mut Vec<BlockEdit>,
    ) -> Result<Option<usize>, EditorError> {
        let current = ctx.block_id;

        match case {
            EditCase::InsertAfter => {
                let block = self.variant.new_block(String::new());
                let id = block.id;
                let index = self.insert_relative(current, Placement::After, block)?;
                edits.push(BlockEdit::Inserted { index, id });
                Ok(Some(self.focus_at(id, 0)?))
            }
            EditCase::InsertBefore => {
                let block = self.variant.new_block(String::new());
                let id = block.id;
                let index = self.insert_relative(current, Placement::Before, block)?;
                edits.push(BlockEdit::Inserted { index, id });
                Ok(Some(self.focus_at(current, 0)?))
            }
            EditCase::Split { offset } => {
                let handle = self.handle(current)?;
                let index = self.resolve(current)?;
                let text = self.block_text(index)?;
                let (head, tail) = split_at_char(&text, offset);
                let tail_block = self.variant.new_block(tail);
                let tail_id = tail_block.id;

                let old_text = self.document.set_text(index, head)?;
                let status = self.surface.set_block_text(&handle, head);
                self.paint.track(status);
                edits.push(BlockEdit::TextChanged {
                    id: current,
                    old_text,
                    new_text: head.to_string(),
                });

                let tail_index = self.insert_relative(current, Placement::After, tail_block)?;
                edits.push(BlockEdit::Inserted {
                    index: tail_index,
                    id: tail_id,
                });

                self.place_caret_after_paint(tail_id, 0)?;
                Ok(Some(0))
            }
            EditCase::RemoveEmpty { previous } => {
                self.handle(previous)?;
                let index = self.remove(current)?;
                edits.push(BlockEdit::Removed { index, id: current });

                let end = self.block_len(previous)?;
                Ok(Some(self.focus_at(previous, end)?))
            }
            EditCase::MergeIntoPrevious { previous } => {
                let previous_handle = self.handle(previous)?;
                self.handle(current)?;
                let previous_index = self.resolve(previous)?;
                let previous_text = self.block_text(previous_index)?;
                let current_text = self.block_text(self.resolve(current)?)?;
                let join = char_len(&previous_text);
                let merged = format!("{}{}", previous_text, current_text);

                let old_text = self.document.set_text(previous_index, merged.clone())?;
                let status = self.surface.set_block_text(&previous_handle, &merged);
                self.paint.track(status);
                edits.push(BlockEdit::TextChanged {
                    id: previous,
                    old_text,
                    new_text: merged,
                });

                let index = self.remove(current)?;
                edits.push(BlockEdit::Removed { index, id: current });

                self.place_caret_after_paint(previous, join)?;
                Ok(Some(join))
            }
            EditCase::MoveToEndOfPrevious { previous } => {
                let end = self.block_len(previous)?;
                Ok(Some(self.focus_at(previous, end)?))
            }
            EditCase::MoveToStartOfNext { next } => Ok(Some(self.focus_at(next, 0)?)),
            EditCase::MoveUp { previous } => {
                let column = self.columns.resolve_column(ctx.offset);
                Ok(Some(self.focus_at(previous, column)?))
            }
            EditCase::MoveDown { next } => {
                let column = self.columns.resolve_column(ctx.offset);
                Ok(Some(self.focus_at(next, column)?))
            }
            EditCase::TopBoundary => {
                self.columns.reset();
                Ok(None)
            }
            EditCase::PassThrough => Ok(None),
        }
    }

    fn ensure_painted(&self) -> Result<(), EditorError> {
        if self.paint.is_idle() {
            Ok(())
        } else {
            Err(EditorError::PaintPending)
        }
    }

    fn resolve(&self, block: BlockId) -> Result<usize, EditorError> {
        self.document
            .index_of_id(block)
            .ok_or(EditorError::NotFound(block))
    }

    fn handle(&self, block: BlockId) -> Result<S::Handle, EditorError> {
        self.handles
            .get(&block)
            .cloned()
            .ok_or(EditorError::NotFound(block))
    }

    fn block_text(&self, index: usize) -> Result<String, EditorError> {
        self.document
            .get(index)
            .map(|b| b.text.clone())
            .ok_or(EditorError::IndexOutOfBounds {
                index,
                len: self.document.len(),
            })
    }

    fn block_len(&self, block: BlockId) -> Result<usize, EditorError> {
        self.document
            .block(block)
            .map(|b| b.char_len())
            .ok_or(EditorError::NotFound(block))
    }

    fn focus_at(&mut self, block: BlockId, offset: usize) -> Result<usize, EditorError> {
        let handle = self.handle(block)?;
        self.surface.focus(&handle);
        Ok(self.surface.set_position(&handle, offset))
    }

    fn place_caret_after_paint(
        &mut self,
        block: BlockId,
        offset: usize,
    ) -> Result<(), EditorError> {
        if self.paint.is_idle() {
            self.focus_at(block, offset)?;
        } else {
            self.paint.caret = Some((block, offset));
        }
        Ok(())
    }

    // Insert `block` next to `anchor` in the store, then mount it on the surface.
    fn insert_relative(
        &mut self,
        anchor: BlockId,
        placement: Placement,
        block: Block,
    ) -> Result<usize, EditorError> {
        let anchor_handle = self.handle(anchor)?;
        let anchor_index = self.resolve(anchor)?;
        let index = match placement {
            Placement::Before => anchor_index,
            Placement::After => anchor_index + 1,
        };
        let id = block.id;

        self.document.insert(index, block)?;

        let view = self
            .document
            .get(index)
            .map(BlockView::from)
            .ok_or(EditorError::IndexOutOfBounds {
                index,
                len: self.document.len(),
            })?;
        let mount = match placement {
            Placement::Before => Mount::Before(&anchor_handle),
            Placement::After => Mount::After(&anchor_handle),
        };
        let handle = self.surface.render_block_at(mount, view);
        self.handles.insert(id, handle);

        Ok(index)
    }

    // Remove `block` from the store (index re-resolved here), then unmount it.
    fn remove(&mut self, block: BlockId) -> Result<usize, EditorError> {
        let handle = self.handle(block)?;
        let index = self.resolve(block)?;
        self.document.remove_at(index)?;
        self.surface.remove_block(&handle);
        self.handles.remove(&block);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    fn ctx(len: usize, offset: usize, previous: bool, next: bool) -> KeyContext {
        KeyContext {
            block_id: BlockId::new(),
            index: usize::from(previous),
            len,
            offset,
            previous: previous.then(BlockId::new),
            next: next.then(BlockId::new),
        }
    }

    fn dispatcher(texts: &[&str]) -> Dispatcher<HeadlessSurface> {
        let doc = Document::from_blocks(texts.iter().map(|t| Block::new(*t)).collect()).unwrap();
        Dispatcher::new(doc, HeadlessSurface::new(), Variant::Notes)
    }

    fn texts<S: Surface>(d: &Dispatcher<S>) -> Vec<String> {
        d.document().blocks().iter().map(|b| b.text.clone()).collect()
    }

    #[test]
    fn test_classify_enter() {
        assert_eq!(
            classify(Key::Enter, &ctx(0, 0, false, false)),
            EditCase::InsertAfter
        );
        assert_eq!(
            classify(Key::Enter, &ctx(5, 5, false, false)),
            EditCase::InsertAfter
        );
        assert_eq!(
            classify(Key::Enter, &ctx(5, 0, false, false)),
            EditCase::InsertBefore
        );
        assert_eq!(
            classify(Key::Enter, &ctx(5, 2, false, false)),
            EditCase::Split { offset: 2 }
        );
    }

    #[test]
    fn test_classify_backspace() {
        let c = ctx(0, 0, true, false);
        assert_eq!(
            classify(Key::Backspace, &c),
            EditCase::RemoveEmpty {
                previous: c.previous.unwrap()
            }
        );
        let c = ctx(3, 0, true, false);
        assert_eq!(
            classify(Key::Backspace, &c),
            EditCase::MergeIntoPrevious {
                previous: c.previous.unwrap()
            }
        );
        assert_eq!(
            classify(Key::Backspace, &ctx(3, 1, true, false)),
            EditCase::PassThrough
        );
        assert_eq!(
            classify(Key::Backspace, &ctx(0, 0, false, true)),
            EditCase::PassThrough
        );
    }

    #[test]
    fn test_classify_arrows() {
        assert_eq!(
            classify(Key::ArrowLeft, &ctx(3, 1, true, true)),
            EditCase::PassThrough
        );
        assert!(matches!(
            classify(Key::ArrowLeft, &ctx(3, 0, true, true)),
            EditCase::MoveToEndOfPrevious { .. }
        ));
        assert_eq!(
            classify(Key::ArrowRight, &ctx(3, 3, true, false)),
            EditCase::PassThrough
        );
        assert!(matches!(
            classify(Key::ArrowRight, &ctx(3, 3, true, true)),
            EditCase::MoveToStartOfNext { .. }
        ));
        assert_eq!(
            classify(Key::ArrowUp, &ctx(3, 1, false, true)),
            EditCase::TopBoundary
        );
        assert!(matches!(
            classify(Key::ArrowUp, &ctx(3, 1, true, true)),
            EditCase::MoveUp { .. }
        ));
        assert_eq!(
            classify(Key::ArrowDown, &ctx(3, 1, true, false)),
            EditCase::PassThrough
        );
        assert_eq!(
            classify(Key::Other, &ctx(3, 1, true, true)),
            EditCase::PassThrough
        );
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(EditCase::InsertAfter.outcome(), KeyOutcome::PreventDefault);
        assert_eq!(EditCase::TopBoundary.outcome(), KeyOutcome::AllowDefault);
        assert_eq!(EditCase::PassThrough.outcome(), KeyOutcome::AllowDefault);
    }

    #[test]
    fn test_placement_parse() {
        assert_eq!("before".parse::<Placement>().unwrap(), Placement::Before);
        assert_eq!("after".parse::<Placement>().unwrap(), Placement::After);
        assert!(matches!(
            "sideways".parse::<Placement>(),
            Err(EditorError::InvalidArgument(_))
        ));
        assert_eq!(Placement::After.to_string(), "after");
    }

    #[test]
    fn test_new_focuses_first_block() {
        let d = dispatcher(&["a", "b"]);
        let pos = d.caret_position().unwrap();
        assert_eq!(pos.block_id, d.document().get(0).unwrap().id);
        assert_eq!(pos.offset, 0);
        assert_eq!(d.surface().texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_enter_at_start_keeps_focus_on_current() {
        let mut d = dispatcher(&["hello"]);
        let current = d.document().get(0).unwrap().id;

        let result = d.handle_key(Key::Enter).unwrap();
        assert_eq!(result.case, EditCase::InsertBefore);
        assert_eq!(texts(&d), vec!["", "hello"]);
        assert_eq!(d.caret_position().unwrap().block_id, current);
        assert_eq!(d.surface().block_ids(), d.document().ids());
    }

    #[test]
    fn test_left_and_right_cross_block_boundaries() {
        let mut d = dispatcher(&["ab", "cd"]);
        let ids = d.document().ids();

        d.focus_block(ids[1], 0).unwrap();
        let result = d.handle_key(Key::ArrowLeft).unwrap();
        assert_eq!(result.outcome, KeyOutcome::PreventDefault);
        let pos = d.caret_position().unwrap();
        assert_eq!((pos.block_id, pos.offset), (ids[0], 2));

        let result = d.handle_key(Key::ArrowRight).unwrap();
        assert_eq!(result.outcome, KeyOutcome::PreventDefault);
        let pos = d.caret_position().unwrap();
        assert_eq!((pos.block_id, pos.offset), (ids[1], 0));
    }

    #[test]
    fn test_insert_block_with_parsed_level() {
        let mut d = dispatcher(&["a"]);
        let anchor = d.document().get(0).unwrap().id;

        let err = "above".parse::<Placement>().unwrap_err();
        assert!(matches!(err, EditorError::InvalidArgument(_)));
        assert_eq!(d.document().len(), 1);

        let placement: Placement = "before".parse().unwrap();
        let (id, edits) = d.insert_block(anchor, placement, "z").unwrap();
        assert_eq!(edits, vec![BlockEdit::Inserted { index: 0, id }]);
        assert_eq!(texts(&d), vec!["z", "a"]);
        assert_eq!(d.surface().texts(), vec!["z", "a"]);
    }

    #[test]
    fn test_remove_block_moves_focus_and_refuses_last() {
        let mut d = dispatcher(&["ab", "cd"]);
        let ids = d.document().ids();
        d.focus_block(ids[1], 1).unwrap();

        d.remove_block(ids[1]).unwrap();
        let pos = d.caret_position().unwrap();
        assert_eq!((pos.block_id, pos.offset), (ids[0], 2));

        assert!(matches!(
            d.remove_block(ids[0]),
            Err(EditorError::InvalidOperation(_))
        ));
        assert_eq!(d.document().len(), 1);
    }

    #[test]
    fn test_set_checked_requires_todo_variant() {
        let mut d = dispatcher(&["a"]);
        let id = d.document().get(0).unwrap().id;
        assert!(matches!(
            d.set_checked(id, true),
            Err(EditorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_input_for_unknown_block_is_ignored() {
        let mut d = dispatcher(&["a"]);
        let edits = d.handle_input(BlockId::new(), "zzz").unwrap();
        assert!(edits.is_empty());
        assert_eq!(texts(&d), vec!["a"]);
    }
}
