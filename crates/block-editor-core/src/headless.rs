//! Headless surface
//!
//! [`HeadlessSurface`] is an in-memory [`Surface`]: it keeps the mounted blocks in display order
//! together with focus and caret state, and can defer paints to exercise the after-paint caret
//! sequencing. Tests and benches drive the dispatcher through it, and terminal hosts can use it
//! as their view model, painting [`HeadlessSurface::nodes`] each frame.
//!
//! Besides the [`Surface`] contract it offers the native editing primitives an editable surface
//! performs on its own when the dispatcher lets a key pass through: inserting typed text at the
//! caret, deleting around it and moving it within the focused block.

use crate::block::{BlockId, byte_index, char_len};
use crate::surface::{BlockView, Mount, NodeContent, PaintStatus, PaintToken, Surface, SurfaceCaret};

/// Handle of a block mounted on a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

/// One mounted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessNode {
    handle: NodeHandle,
    block: BlockId,
    text: String,
    checked: Option<bool>,
    text_content: bool,
}

impl HeadlessNode {
    /// Surface handle.
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Id of the projected block.
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Displayed completion flag.
    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    /// Whether the caret target is plain text.
    pub fn is_text(&self) -> bool {
        self.text_content
    }
}

/// When text replacements become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintMode {
    /// `set_block_text` reports [`PaintStatus::Committed`].
    #[default]
    Immediate,
    /// `set_block_text` reports [`PaintStatus::Pending`] until the host collects the tokens.
    Deferred,
}

/// In-memory surface.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    nodes: Vec<HeadlessNode>,
    next_handle: u64,
    focused: Option<NodeHandle>,
    caret: usize,
    paint_mode: PaintMode,
    next_paint: u64,
    uncommitted: Vec<PaintToken>,
}

impl HeadlessSurface {
    /// A surface whose paints commit immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose paints stay pending until the host takes them with
    /// [`take_uncommitted_paints`](Self::take_uncommitted_paints).
    pub fn deferred() -> Self {
        Self {
            paint_mode: PaintMode::Deferred,
            ..Self::default()
        }
    }

    /// Current paint mode.
    pub fn paint_mode(&self) -> PaintMode {
        self.paint_mode
    }

    /// Mounted blocks in display order.
    pub fn nodes(&self) -> &[HeadlessNode] {
        &self.nodes
    }

    /// Ids of the mounted blocks in display order.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.nodes.iter().map(|n| n.block).collect()
    }

    /// Displayed texts in display order.
    pub fn texts(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.text.as_str()).collect()
    }

    /// The node projecting `block`.
    pub fn node(&self, block: BlockId) -> Option<&HeadlessNode> {
        self.nodes.iter().find(|n| n.block == block)
    }

    /// The focused block, if any.
    pub fn focused_block(&self) -> Option<BlockId> {
        self.focused_node().map(|n| n.block)
    }

    /// Caret offset inside the focused block.
    pub fn caret_offset(&self) -> usize {
        self.caret
    }

    /// Paints that have not been acknowledged yet.
    pub fn has_uncommitted_paints(&self) -> bool {
        !self.uncommitted.is_empty()
    }

    /// Mark all pending paints as landed and return their tokens, oldest first.
    pub fn take_uncommitted_paints(&mut self) -> Vec<PaintToken> {
        std::mem::take(&mut self.uncommitted)
    }

    /// Mark a block's caret target as plain text or not. Returns `false` if not mounted.
    pub fn set_text_content(&mut self, block: BlockId, is_text: bool) -> bool {
        match self.nodes.iter_mut().find(|n| n.block == block) {
            Some(node) => {
                node.text_content = is_text;
                true
            }
            None => false,
        }
    }

    /// Pointer placement: focus `block` and put the caret at `offset` (clamped).
    pub fn place_caret(&mut self, block: BlockId, offset: usize) -> bool {
        let Some(node) = self.nodes.iter().find(|n| n.block == block) else {
            return false;
        };
        self.focused = Some(node.handle);
        self.caret = offset.min(char_len(&node.text));
        true
    }

    /// Move the caret within the focused block (clamped to its text).
    pub fn move_caret_to(&mut self, offset: usize) {
        if let Some(len) = self.focused_node().map(|n| char_len(&n.text)) {
            self.caret = offset.min(len);
        }
    }

    /// Native typing: insert `text` at the caret and advance it.
    ///
    /// Returns the focused block and its new text, to be reported as an input event.
    pub fn insert_at_caret(&mut self, text: &str) -> Option<(BlockId, String)> {
        let caret = self.caret;
        let node = self.focused_node_mut()?;
        let at = byte_index(&node.text, caret);
        node.text.insert_str(at, text);
        let reported = (node.block, node.text.clone());
        self.caret = caret + char_len(text);
        Some(reported)
    }

    /// Native deletion of `count` characters before the caret.
    ///
    /// Returns the focused block and its new text, or `None` if nothing was deleted.
    pub fn delete_before_caret(&mut self, count: usize) -> Option<(BlockId, String)> {
        let caret = self.caret;
        let start = caret.saturating_sub(count);
        if start == caret {
            return None;
        }
        let reported = self.delete_range(start, caret)?;
        self.caret = start;
        Some(reported)
    }

    /// Native deletion of `count` characters after the caret.
    pub fn delete_after_caret(&mut self, count: usize) -> Option<(BlockId, String)> {
        let caret = self.caret;
        let len = char_len(&self.focused_node()?.text);
        let end = caret.saturating_add(count).min(len);
        if end == caret {
            return None;
        }
        self.delete_range(caret, end)
    }

    fn delete_range(&mut self, start: usize, end: usize) -> Option<(BlockId, String)> {
        let node = self.focused_node_mut()?;
        let from = byte_index(&node.text, start);
        let to = byte_index(&node.text, end);
        node.text.replace_range(from..to, "");
        Some((node.block, node.text.clone()))
    }

    fn focused_node(&self) -> Option<&HeadlessNode> {
        let handle = self.focused?;
        self.nodes.iter().find(|n| n.handle == handle)
    }

    fn focused_node_mut(&mut self) -> Option<&mut HeadlessNode> {
        let handle = self.focused?;
        self.nodes.iter_mut().find(|n| n.handle == handle)
    }

    fn position_of(&self, handle: NodeHandle) -> Option<usize> {
        self.nodes.iter().position(|n| n.handle == handle)
    }
}

impl Surface for HeadlessSurface {
    type Handle = NodeHandle;

    fn render_block_at(
        &mut self,
        mount: Mount<'_, NodeHandle>,
        view: BlockView<'_>,
    ) -> NodeHandle {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;

        let node = HeadlessNode {
            handle,
            block: view.id,
            text: view.text.to_string(),
            checked: view.checked,
            text_content: true,
        };

        let at = match mount {
            Mount::End => None,
            Mount::Before(anchor) => self.position_of(*anchor),
            Mount::After(anchor) => self.position_of(*anchor).map(|i| i + 1),
        };
        match at {
            Some(at) => self.nodes.insert(at, node),
            None => self.nodes.push(node),
        }

        handle
    }

    fn focus(&mut self, handle: &NodeHandle) {
        if self.position_of(*handle).is_some() {
            self.focused = Some(*handle);
            self.caret = 0;
        }
    }

    fn remove_block(&mut self, handle: &NodeHandle) {
        if let Some(at) = self.position_of(*handle) {
            self.nodes.remove(at);
        }
        if self.focused == Some(*handle) {
            self.focused = None;
            self.caret = 0;
        }
    }

    fn set_block_text(&mut self, handle: &NodeHandle, text: &str) -> PaintStatus {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.handle == *handle) {
            node.text = text.to_string();
        }
        if self.focused == Some(*handle) {
            self.caret = self.caret.min(char_len(text));
        }

        match self.paint_mode {
            PaintMode::Immediate => PaintStatus::Committed,
            PaintMode::Deferred => {
                let token = PaintToken::new(self.next_paint);
                self.next_paint += 1;
                self.uncommitted.push(token);
                PaintStatus::Pending(token)
            }
        }
    }

    fn set_block_checked(&mut self, handle: &NodeHandle, checked: bool) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.handle == *handle) {
            node.checked = Some(checked);
        }
    }

    fn caret(&self) -> Option<SurfaceCaret> {
        self.focused_node().map(|node| SurfaceCaret {
            block: node.block,
            offset: self.caret,
        })
    }

    fn node_content(&self, handle: &NodeHandle) -> NodeContent {
        match self.nodes.iter().find(|n| n.handle == *handle) {
            Some(node) if node.text_content => NodeContent::Text {
                char_len: char_len(&node.text),
            },
            _ => NodeContent::Other,
        }
    }

    fn select(&mut self, handle: &NodeHandle, offset: usize) {
        if self.position_of(*handle).is_some() {
            self.focused = Some(*handle);
            self.caret = offset;
        }
    }
}
