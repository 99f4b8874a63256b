//! Document persistence.
//!
//! Documents are stored as a JSON array of `{id, text, checked?}` objects under a string key.
//! [`DocumentStore`] abstracts where that string lives; [`MemoryStore`] keeps it in memory for
//! tests and embedding, hosts provide file- or database-backed implementations.
//!
//! Stores take `&self`: implementations use interior mutability, so a store can be shared
//! (e.g. through `Rc`) between an editor and the code inspecting it.

use crate::document::Document;
use crate::error::StoreError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Encode a document in its storage format.
pub fn encode(document: &Document) -> Result<String, StoreError> {
    Ok(serde_json::to_string(document)?)
}

/// Decode a document from its storage format.
///
/// Empty arrays and duplicate ids are rejected.
pub fn decode(json: &str) -> Result<Document, StoreError> {
    Ok(serde_json::from_str(json)?)
}

/// Key-value persistence for documents.
pub trait DocumentStore {
    /// Load the document stored under `key`, or `None` if nothing is stored there.
    fn load(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Store `document` under `key`, replacing any previous value.
    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Rc<T> {
    fn load(&self, key: &str) -> Result<Option<Document>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        (**self).save(key, document)
    }
}

/// In-memory store holding serialized JSON strings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    simulate_write_error: Cell<bool>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// The raw JSON stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store raw JSON under `key` without validation.
    pub fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), json.into());
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Document>, StoreError> {
        self.entries
            .borrow()
            .get(key)
            .map(|json| decode(json))
            .transpose()
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        if self.simulate_write_error.get() {
            return Err(StoreError::Backend("Simulated write error".to_string()));
        }
        let json = encode(document)?;
        self.entries.borrow_mut().insert(key.to_string(), json);
        Ok(())
    }
}
