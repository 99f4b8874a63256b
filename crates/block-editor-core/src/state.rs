//! Editor state management.
//!
//! [`BlockEditor`] wraps a [`Dispatcher`] and adds the concerns a host application needs on top
//! of the raw editing state machine:
//!
//! - **Version tracking**: a monotonically increasing version, bumped on every observable change
//! - **Change notifications**: subscribers receive a [`StateChange`] with the applied
//!   [`DocumentDelta`]
//! - **Modification tracking**: whether the document has unsaved changes
//! - **Persistence**: loading from and saving to a [`DocumentStore`], optionally after every edit
//!
//! Save failures never roll back an edit. They are logged and kept in
//! [`BlockEditor::last_save_error`] until the next successful save.
//!
//! # Example
//!
//! ```rust
//! use block_editor_core::{
//!     BlockEditor, DocumentStore, EditorConfig, HeadlessSurface, Key, MemoryStore,
//!     StateChangeType,
//! };
//! use std::rc::Rc;
//! use std::sync::{Arc, Mutex};
//!
//! let store = Rc::new(MemoryStore::new());
//! let mut editor =
//!     BlockEditor::open(HeadlessSurface::new(), EditorConfig::todo(), Rc::clone(&store)).unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! editor.subscribe(move |change| sink.lock().unwrap().push(change.change_type));
//!
//! editor.handle_key(Key::Enter).unwrap();
//!
//! assert_eq!(editor.document().len(), 2);
//! assert_eq!(seen.lock().unwrap()[0], StateChangeType::StructureChanged);
//! // Autosave wrote the new document.
//! assert_eq!(store.load("todos").unwrap().unwrap().len(), 2);
//! ```

use crate::block::BlockId;
use crate::caret::CaretPosition;
use crate::commands::{Dispatched, Dispatcher, Key, Placement};
use crate::config::EditorConfig;
use crate::delta::{BlockEdit, DocumentDelta};
use crate::document::Document;
use crate::error::EditorError;
use crate::persistence::DocumentStore;
use crate::surface::{PaintToken, Surface};
use std::sync::Arc;

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeType {
    /// Block text changed
    TextChanged,
    /// Blocks were inserted or removed
    StructureChanged,
    /// A to-do block's checked flag changed
    CheckedChanged,
    /// The dispatcher moved the caret
    CaretMoved,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// Document edits behind this change (absent for caret moves).
    pub delta: Option<Arc<DocumentDelta>>,
}

impl StateChange {
    /// Create a new state change record without a delta.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            delta: None,
        }
    }

    /// Attach the document delta to this change record.
    pub fn with_delta(mut self, delta: Arc<DocumentDelta>) -> Self {
        self.delta = Some(delta);
        self
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Block editor: dispatcher plus versioning, notifications and persistence.
pub struct BlockEditor<S: Surface> {
    dispatcher: Dispatcher<S>,
    config: EditorConfig,
    store: Option<Box<dyn DocumentStore>>,
    version: u64,
    is_modified: bool,
    callbacks: Vec<StateChangeCallback>,
    last_save_error: Option<String>,
}

impl<S: Surface> BlockEditor<S> {
    /// Create an editor for `document` without persistence.
    pub fn new(document: Document, surface: S, config: EditorConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(document, surface, config.variant),
            config,
            store: None,
            version: 0,
            is_modified: false,
            callbacks: Vec::new(),
            last_save_error: None,
        }
    }

    /// Open the document stored under `config.storage_key`, or a fresh one-block document if
    /// nothing is stored yet.
    pub fn open(
        surface: S,
        config: EditorConfig,
        store: impl DocumentStore + 'static,
    ) -> Result<Self, EditorError> {
        let document = match store.load(&config.storage_key)? {
            Some(document) => {
                tracing::debug!(
                    key = %config.storage_key,
                    blocks = document.len(),
                    "loaded document"
                );
                document
            }
            None => {
                tracing::info!(key = %config.storage_key, "no stored document, starting fresh");
                Document::seeded(config.variant)
            }
        };

        Ok(Self::new(document, surface, config).with_store(store))
    }

    /// Attach a store; the document is saved there from now on.
    pub fn with_store(mut self, store: impl DocumentStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// The underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// The document.
    pub fn document(&self) -> &Document {
        self.dispatcher.document()
    }

    /// The surface.
    pub fn surface(&self) -> &S {
        self.dispatcher.surface()
    }

    /// Mutable surface access for host-side default behaviour.
    pub fn surface_mut(&mut self) -> &mut S {
        self.dispatcher.surface_mut()
    }

    /// The configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current caret position.
    pub fn caret_position(&self) -> Option<CaretPosition> {
        self.dispatcher.caret_position()
    }

    /// Current state version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Whether the document has changes that were not saved.
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Message of the most recent failed save, cleared by the next successful one.
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    /// Subscribe to state change notifications
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Handle a key press. See [`Dispatcher::handle_key`].
    pub fn handle_key(&mut self, key: Key) -> Result<Dispatched, EditorError> {
        let before_len = self.document().len();
        let result = self.dispatcher.handle_key(key)?;
        self.record(before_len, result.edits.clone());
        if result.caret_moved {
            self.mark_changed(StateChangeType::CaretMoved, None);
        }
        Ok(result)
    }

    /// Reconcile surface-side text changes. See [`Dispatcher::handle_input`].
    pub fn handle_input(
        &mut self,
        block: BlockId,
        text: impl Into<String>,
    ) -> Result<Vec<BlockEdit>, EditorError> {
        let before_len = self.document().len();
        let edits = self.dispatcher.handle_input(block, text)?;
        self.record(before_len, edits.clone());
        Ok(edits)
    }

    /// Record a pointer-driven caret placement. See [`Dispatcher::handle_pointer`].
    pub fn handle_pointer(&mut self) -> Result<(), EditorError> {
        self.dispatcher.handle_pointer()
    }

    /// Record a host-side caret move. See [`Dispatcher::caret_moved`].
    pub fn caret_moved(&mut self) -> Result<(), EditorError> {
        self.dispatcher.caret_moved()
    }

    /// Focus a block. See [`Dispatcher::focus_block`].
    pub fn focus_block(&mut self, block: BlockId, offset: usize) -> Result<usize, EditorError> {
        let offset = self.dispatcher.focus_block(block, offset)?;
        self.mark_changed(StateChangeType::CaretMoved, None);
        Ok(offset)
    }

    /// Insert a block next to `anchor`. See [`Dispatcher::insert_block`].
    pub fn insert_block(
        &mut self,
        anchor: BlockId,
        placement: Placement,
        text: impl Into<String>,
    ) -> Result<BlockId, EditorError> {
        let before_len = self.document().len();
        let (id, edits) = self.dispatcher.insert_block(anchor, placement, text)?;
        self.record(before_len, edits);
        Ok(id)
    }

    /// Remove a block. See [`Dispatcher::remove_block`].
    pub fn remove_block(&mut self, block: BlockId) -> Result<(), EditorError> {
        let before_len = self.document().len();
        let edits = self.dispatcher.remove_block(block)?;
        self.record(before_len, edits);
        Ok(())
    }

    /// Set a to-do block's checked flag. See [`Dispatcher::set_checked`].
    pub fn set_checked(&mut self, block: BlockId, checked: bool) -> Result<(), EditorError> {
        let before_len = self.document().len();
        let edits = self.dispatcher.set_checked(block, checked)?;
        self.record(before_len, edits);
        Ok(())
    }

    /// Flip a to-do block's checked flag, returning the new value.
    pub fn toggle_checked(&mut self, block: BlockId) -> Result<bool, EditorError> {
        let current = self
            .document()
            .block(block)
            .ok_or(EditorError::NotFound(block))?
            .checked
            .unwrap_or(false);
        self.set_checked(block, !current)?;
        Ok(!current)
    }

    /// Acknowledge a landed paint. See [`Dispatcher::paint_committed`].
    pub fn paint_committed(&mut self, token: PaintToken) -> Result<bool, EditorError> {
        let moved = self.dispatcher.paint_committed(token)?;
        if moved {
            self.mark_changed(StateChangeType::CaretMoved, None);
        }
        Ok(moved)
    }

    /// Save the document to the attached store.
    pub fn save(&mut self) -> Result<(), EditorError> {
        let Some(store) = self.store.as_ref() else {
            return Err(EditorError::InvalidOperation("no document store attached"));
        };

        match store.save(&self.config.storage_key, self.dispatcher.document()) {
            Ok(()) => {
                tracing::debug!(key = %self.config.storage_key, "document saved");
                self.is_modified = false;
                self.last_save_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    key = %self.config.storage_key,
                    error = %err,
                    "failed to save document"
                );
                self.last_save_error = Some(err.to_string());
                Err(EditorError::Storage(err))
            }
        }
    }

    fn record(&mut self, before_len: usize, edits: Vec<BlockEdit>) {
        if edits.is_empty() {
            return;
        }

        let change_type = if edits.iter().any(BlockEdit::is_structural) {
            StateChangeType::StructureChanged
        } else if edits
            .iter()
            .all(|e| matches!(e, BlockEdit::CheckedChanged { .. }))
        {
            StateChangeType::CheckedChanged
        } else {
            StateChangeType::TextChanged
        };

        let delta = DocumentDelta {
            before_len,
            after_len: self.document().len(),
            edits,
        };

        self.is_modified = true;
        self.mark_changed(change_type, Some(Arc::new(delta)));

        if self.config.autosave && self.store.is_some() {
            // The failure is already logged and kept in `last_save_error`.
            let _ = self.save();
        }
    }

    fn mark_changed(&mut self, change_type: StateChangeType, delta: Option<Arc<DocumentDelta>>) {
        let old_version = self.version;
        self.version += 1;

        let mut change = StateChange::new(change_type, old_version, self.version);
        if let Some(delta) = delta {
            change = change.with_delta(delta);
        }
        self.notify_callbacks(&change);
    }

    fn notify_callbacks(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}
