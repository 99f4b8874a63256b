#![warn(missing_docs)]
//! Block Editor Core - Headless Caret-Aware Block Editing Engine
//!
//! # Overview
//!
//! `block-editor-core` models a document as an ordered list of plain-text blocks (paragraphs or
//! to-do items) and implements the keyboard behaviour of a block editor on top of it: splitting
//! a block at the caret on Enter, merging into the previous block on Backspace, crossing block
//! boundaries with the arrow keys, and keeping the caret's column steady while moving Up and
//! Down through blocks of different lengths.
//!
//! It does not render anything. The host supplies a [`Surface`], the editable visual projection
//! of the document, and forwards key, input and pointer events to the editor.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  BlockEditor (versions, notifications, I/O) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Dispatcher (Enter/Backspace/Arrow cases)   │  ← Editing state machine
//! ├──────────────────────┬──────────────────────┤
//! │  Caret Locator       │  Column Tracker      │  ← Caret facts
//! ├──────────────────────┴──────────────────────┤
//! │  Document (Block Store)   │  Surface        │  ← Truth / projection
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use block_editor_core::{BlockEditor, Document, EditorConfig, HeadlessSurface, Key};
//!
//! let mut editor =
//!     BlockEditor::new(Document::new(), HeadlessSurface::new(), EditorConfig::default());
//!
//! // The host applies typing itself and reports the result.
//! let (block, text) = editor.surface_mut().insert_at_caret("hello").unwrap();
//! editor.handle_input(block, text).unwrap();
//!
//! // Enter at the end of a block starts a new one and moves the caret into it.
//! editor.handle_key(Key::Enter).unwrap();
//!
//! assert_eq!(editor.document().len(), 2);
//! let caret = editor.caret_position().unwrap();
//! assert_eq!(caret.block_id, editor.document().get(1).unwrap().id);
//! assert_eq!(caret.offset, 0);
//! ```
//!
//! # Module Description
//!
//! - [`block`] - Blocks, ids and character-offset helpers
//! - [`document`] - The block store
//! - [`surface`] - The surface contract; [`headless`] - an in-memory surface
//! - [`caret`] - Caret reading and clamped placement
//! - [`vertical`] - Remembered column for Up/Down
//! - [`commands`] - Key classification and the dispatcher
//! - [`delta`] - Structured change records
//! - [`state`] - Versioning, notifications and persistence
//! - [`persistence`] - Storage format and stores
//! - [`checklist`] - Markdown task-list import/export
//! - [`config`] - Editor configuration
//!
//! # Unicode Support
//!
//! All offsets count characters (Unicode scalar values), so splitting never cuts a UTF-8
//! sequence. Grapheme-aware caret movement within a block is the host's default behaviour.

pub mod block;
pub mod caret;
pub mod checklist;
pub mod commands;
pub mod config;
pub mod delta;
pub mod document;
pub mod error;
pub mod headless;
pub mod persistence;
pub mod state;
pub mod surface;
pub mod vertical;

pub use block::{Block, BlockId, Variant};
pub use caret::{CaretLocator, CaretPosition};
pub use checklist::ChecklistCodec;
pub use commands::{
    Dispatched, Dispatcher, EditCase, Key, KeyContext, KeyOutcome, Placement, classify,
};
pub use config::EditorConfig;
pub use delta::{BlockEdit, DocumentDelta};
pub use document::Document;
pub use error::{EditorError, StoreError};
pub use headless::{HeadlessNode, HeadlessSurface, NodeHandle, PaintMode};
pub use persistence::{DocumentStore, MemoryStore};
pub use state::{BlockEditor, StateChange, StateChangeCallback, StateChangeType};
pub use surface::{BlockView, Mount, NodeContent, PaintStatus, PaintToken, Surface, SurfaceCaret};
pub use vertical::ColumnTracker;
