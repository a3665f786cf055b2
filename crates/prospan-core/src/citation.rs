//! Display-time citation resolution.
//!
//! A citation returned by the AI is either a document id or free text. It is
//! matched against the store when displayed; unmatched citations are shown
//! verbatim.

use serde::Serialize;

use crate::store::DocumentStore;

/// A citation ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCitation {
    /// The string the AI returned.
    pub raw: String,
    /// Id of the matching document, when one exists.
    pub document_id: Option<String>,
    /// Document title when resolved, otherwise the raw string.
    pub label: String,
}

pub fn resolve_citation(store: &DocumentStore, raw: &str) -> ResolvedCitation {
    match store.find_by_id(raw) {
        Some(doc) => ResolvedCitation {
            raw: raw.to_string(),
            document_id: Some(doc.id().to_string()),
            label: doc.title().to_string(),
        },
        None => ResolvedCitation {
            raw: raw.to_string(),
            document_id: None,
            label: raw.to_string(),
        },
    }
}

pub fn resolve_citations(store: &DocumentStore, citations: &[String]) -> Vec<ResolvedCitation> {
    citations
        .iter()
        .map(|c| resolve_citation(store, c))
        .collect()
}
