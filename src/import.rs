//! Adding a local file to the library.
//!
//! The document appears as `processing` before the model is called, so the
//! library shows it while extraction runs. The session lock is not held
//! across the model call.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use prospan_core::models::{DocumentStatus, DocumentType};
use prospan_core::session::Session;

use crate::chat::lock_session;
use crate::config::AssistantConfig;
use crate::extract::read_source_text;
use crate::extractor::extract_metadata;
use crate::genai::GenerativeModel;

/// Outcome of a completed import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub id: String,
    pub status: DocumentStatus,
    pub title: String,
}

/// Read `path`, register it, and run metadata extraction.
///
/// A configuration error marks the document as `error` and is returned.
pub async fn import_file(
    session: &Mutex<Session>,
    model: &dyn GenerativeModel,
    settings: &AssistantConfig,
    path: &Path,
    doc_type: DocumentType,
) -> Result<ImportReport> {
    let content = read_source_text(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    import_text(session, model, settings, &file_name, doc_type, content).await
}

/// Register already-read text under `file_name` and extract its metadata.
pub async fn import_text(
    session: &Mutex<Session>,
    model: &dyn GenerativeModel,
    settings: &AssistantConfig,
    file_name: &str,
    doc_type: DocumentType,
    content: String,
) -> Result<ImportReport> {
    let id = lock_session(session).begin_import(file_name, doc_type, content.clone())?;
    tracing::info!(id = %id, file = file_name, "importing document");

    match extract_metadata(model, &content, settings).await {
        Ok(metadata) => {
            let mut s = lock_session(session);
            s.finish_import(&id, metadata)?;
            let doc = s
                .store()
                .find_by_id(&id)
                .with_context(|| format!("document disappeared during import: {}", id))?;
            Ok(ImportReport {
                id: id.clone(),
                status: doc.status(),
                title: doc.title().to_string(),
            })
        }
        Err(e) => {
            // The document may have been deleted while extraction ran.
            let mut s = lock_session(session);
            if s.store().contains(&id) {
                s.fail_import(&id)?;
            }
            Err(anyhow::Error::new(e).context(format!("Failed to import {}", file_name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::ScriptedModel;
    use crate::genai::AiError;
    use prospan_core::store::DocumentStore;
    use tempfile::TempDir;

    fn empty_session() -> Mutex<Session> {
        Mutex::new(Session::new(DocumentStore::new()))
    }

    #[tokio::test]
    async fn successful_import_is_ready() {
        let s = empty_session();
        let model = ScriptedModel::new().reply(r#"{"title":"Study B","summary":"About B."}"#);
        let report = import_text(
            &s,
            &model,
            &AssistantConfig::default(),
            "b.txt",
            DocumentType::ClinicalStudy,
            "raw text".into(),
        )
        .await
        .unwrap();
        assert_eq!(report.status, DocumentStatus::Ready);
        assert_eq!(report.title, "Study B");
        assert!(report.id.starts_with("doc_"));

        let s = lock_session(&s);
        let doc = s.store().find_by_id(&report.id).unwrap();
        assert_eq!(doc.file_name(), "b.txt");
        assert_eq!(doc.content(), "raw text");
    }

    #[tokio::test]
    async fn fallback_metadata_marks_error() {
        let s = empty_session();
        let model = ScriptedModel::new().reply("garbage");
        let report = import_text(
            &s,
            &model,
            &AssistantConfig::default(),
            "c.txt",
            DocumentType::Other,
            "raw".into(),
        )
        .await
        .unwrap();
        assert_eq!(report.status, DocumentStatus::Error);
        assert_eq!(report.title, "Unidentified document");
    }

    #[tokio::test]
    async fn missing_key_marks_error_and_fails() {
        let s = empty_session();
        let model = ScriptedModel::new().fail(AiError::MissingApiKey("API_KEY".into()));
        let err = import_text(
            &s,
            &model,
            &AssistantConfig::default(),
            "d.txt",
            DocumentType::Legal,
            "raw".into(),
        )
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("API_KEY environment variable"));

        let s = lock_session(&s);
        assert_eq!(s.documents().len(), 1);
        assert_eq!(s.documents()[0].status(), DocumentStatus::Error);
    }

    #[tokio::test]
    async fn import_file_uses_the_file_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("leaflet.md");
        std::fs::write(&path, "# Prospan leaflet").unwrap();

        let s = empty_session();
        let model = ScriptedModel::new().reply(r#"{"title":"Leaflet","summary":"S."}"#);
        let report = import_file(
            &s,
            &model,
            &AssistantConfig::default(),
            &path,
            DocumentType::Marketing,
        )
        .await
        .unwrap();

        let s = lock_session(&s);
        let doc = s.store().find_by_id(&report.id).unwrap();
        assert_eq!(doc.file_name(), "leaflet.md");
        assert_eq!(doc.doc_type(), DocumentType::Marketing);
    }
}
