//! Dashboard statistics derived from the store.

use serde::Serialize;

use crate::models::{DocumentStatus, DocumentType};
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    pub doc_type: DocumentType,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_documents: usize,
    pub clinical_studies: usize,
    /// Documents whose metadata was produced and accepted (status `ready`).
    pub ai_processed: usize,
    /// Per-type counts, zero entries omitted.
    pub distribution: Vec<TypeCount>,
}

pub fn dashboard_stats(store: &DocumentStore) -> DashboardStats {
    let docs = store.list();
    let count_type = |t: DocumentType| docs.iter().filter(|d| d.doc_type() == t).count();

    let distribution = DocumentType::ALL
        .iter()
        .map(|t| TypeCount {
            doc_type: *t,
            label: t.label(),
            count: count_type(*t),
        })
        .filter(|tc| tc.count > 0)
        .collect();

    DashboardStats {
        total_documents: docs.len(),
        clinical_studies: count_type(DocumentType::ClinicalStudy),
        ai_processed: docs
            .iter()
            .filter(|d| d.status() == DocumentStatus::Ready)
            .count(),
        distribution,
    }
}
