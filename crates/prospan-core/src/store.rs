//! In-memory document store.
//!
//! An ordered collection of [`Document`]s keyed by their opaque id. The store
//! is plain data owned by the [`Session`](crate::session::Session); it has no
//! interior mutability and no persistence.

use anyhow::{bail, Result};

use crate::models::Document;

/// Ordered, id-unique collection of documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an initial set, rejecting duplicate ids.
    pub fn with_documents(docs: impl IntoIterator<Item = Document>) -> Result<Self> {
        let mut store = Self::new();
        for doc in docs {
            store.add(doc)?;
        }
        Ok(store)
    }

    /// Append a document. Fails if a document with the same id exists.
    pub fn add(&mut self, document: Document) -> Result<()> {
        if self.contains(document.id()) {
            bail!("document already exists: {}", document.id());
        }
        self.docs.push(document);
        Ok(())
    }

    /// Remove a document by id. Returns `false` when the id is unknown.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.docs.len();
        self.docs.retain(|d| d.id() != id);
        self.docs.len() != before
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id() == id)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.docs.iter_mut().find(|d| d.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Documents in insertion order.
    pub fn list(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
