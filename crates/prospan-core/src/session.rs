//! The view controller: a single-owner session with explicit transitions.
//!
//! [`Session`] owns the document store, the current [`View`], the chat
//! transcript and the in-flight query marker. Every user action or resolved
//! AI call maps to exactly one method here.
//!
//! ```text
//!              navigate(..)            open_document(id)
//!  Dashboard ◀──────────────▶ Library ──────────────────▶ DocumentDetail
//!      ▲                        ▲  ▲ ◀──────── back() ────────┘   │
//!      └──────── navigate ──────┘  └── delete of selected doc ────┘
//!                 Chat ◀── navigate
//! ```
//!
//! A chat submission is split in two so the AI call can run without holding
//! the session: [`Session::begin_query`] records the user message and returns
//! a [`PendingQuery`]; [`Session::complete_query`] appends the answer whenever
//! the call resolves, regardless of the view at that time.

use anyhow::{bail, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::citation::{resolve_citations, ResolvedCitation};
use crate::models::{ChatMessage, Document, DocumentType, ExtractedMetadata};
use crate::response::SearchAnswer;
use crate::seed;
use crate::store::DocumentStore;

/// Current screen. The detail view refers to its document by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Library,
    Chat,
    DocumentDetail { document_id: String },
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Library => "Library",
            View::Chat => "Smart Search",
            View::DocumentDetail { .. } => "Document",
        }
    }
}

/// Screens reachable from the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Dashboard,
    Library,
    Chat,
}

impl std::str::FromStr for Screen {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "home" => Ok(Screen::Dashboard),
            "library" | "documents" => Ok(Screen::Library),
            "chat" | "search" => Ok(Screen::Chat),
            other => bail!("Unknown screen: '{}'. Must be dashboard, library, or chat.", other),
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    NotFound,
}

/// Why a chat submission was refused. The transcript is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatRejection {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("a query is already awaiting a response")]
    AwaitingResponse,
}

/// An accepted chat submission whose answer has not arrived yet.
///
/// Not `Clone`: each submission resolves exactly once, through
/// [`Session::complete_query`] or [`Session::abandon_query`].
#[derive(Debug)]
pub struct PendingQuery {
    user_message_id: String,
    query: String,
    documents: Vec<Document>,
}

impl PendingQuery {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The library as it was when the query was submitted.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn user_message_id(&self) -> &str {
        &self.user_message_id
    }
}

/// A transcript entry with its citations resolved against the store.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub resolved_citations: Vec<ResolvedCitation>,
}

/// Serializable summary of the session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub view: View,
    pub selected_document_id: Option<String>,
    pub awaiting_response: bool,
    pub document_count: usize,
    pub message_count: usize,
}

/// All mutable application state.
#[derive(Debug)]
pub struct Session {
    store: DocumentStore,
    view: View,
    transcript: Vec<ChatMessage>,
    in_flight: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DocumentStore::new())
    }
}

impl Session {
    /// A session over the given store, starting on the dashboard.
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            view: View::Dashboard,
            transcript: Vec::new(),
            in_flight: None,
        }
    }

    /// A session seeded with the built-in sample library.
    pub fn seeded() -> Result<Self> {
        Ok(Self::new(DocumentStore::with_documents(
            seed::initial_documents(),
        )?))
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn documents(&self) -> &[Document] {
        self.store.list()
    }

    /// The document shown in the detail view, looked up on every call.
    pub fn selected_document(&self) -> Option<&Document> {
        match &self.view {
            View::DocumentDetail { document_id } => self.store.find_by_id(document_id),
            _ => None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Transcript with each message's citations resolved for display.
    pub fn resolved_transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .iter()
            .map(|m| TranscriptEntry {
                resolved_citations: resolve_citations(&self.store, m.citation_list()),
                message: m.clone(),
            })
            .collect()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            view: self.view.clone(),
            selected_document_id: self.selected_document().map(|d| d.id().to_string()),
            awaiting_response: self.is_awaiting_response(),
            document_count: self.store.len(),
            message_count: self.transcript.len(),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Menu navigation. Drops any detail selection.
    pub fn navigate(&mut self, screen: Screen) {
        self.view = match screen {
            Screen::Dashboard => View::Dashboard,
            Screen::Library => View::Library,
            Screen::Chat => View::Chat,
        };
    }

    /// Show a document's detail view.
    pub fn open_document(&mut self, id: &str) -> Result<()> {
        if !self.store.contains(id) {
            bail!("document not found: {}", id);
        }
        self.view = View::DocumentDetail {
            document_id: id.to_string(),
        };
        Ok(())
    }

    /// Detail -> Library. No-op on other screens.
    pub fn back(&mut self) {
        if matches!(self.view, View::DocumentDetail { .. }) {
            self.view = View::Library;
        }
    }

    // ── Documents ───────────────────────────────────────────────────

    /// Delete a document after asking `confirm`.
    ///
    /// `confirm` is only called for a known id. If the deleted document is
    /// the one being viewed, the session moves to the library.
    pub fn delete_document<F>(&mut self, id: &str, confirm: F) -> DeleteOutcome
    where
        F: FnOnce(&Document) -> bool,
    {
        let Some(doc) = self.store.find_by_id(id) else {
            return DeleteOutcome::NotFound;
        };
        if !confirm(doc) {
            return DeleteOutcome::Declined;
        }
        self.store.remove_by_id(id);
        if matches!(&self.view, View::DocumentDetail { document_id } if document_id == id) {
            self.view = View::Library;
        }
        DeleteOutcome::Deleted
    }

    /// Add a `processing` document for the given raw text. Returns its id.
    pub fn begin_import(
        &mut self,
        file_name: &str,
        doc_type: DocumentType,
        content: String,
    ) -> Result<String> {
        let id = format!("doc_{}", uuid::Uuid::new_v4().simple());
        let doc = Document::processing(id.clone(), file_name, doc_type, Utc::now(), content);
        self.store.add(doc)?;
        Ok(id)
    }

    /// Attach extracted metadata. The extraction fallback marks the
    /// document as `error`, anything else as `ready`.
    pub fn finish_import(&mut self, id: &str, metadata: ExtractedMetadata) -> Result<()> {
        let Some(doc) = self.store.find_by_id_mut(id) else {
            bail!("document not found: {}", id);
        };
        if metadata.is_extraction_fallback() {
            doc.mark_failed(Some(metadata))
        } else {
            doc.mark_ready(metadata)
        }
    }

    /// Mark an import as failed without metadata.
    pub fn fail_import(&mut self, id: &str) -> Result<()> {
        let Some(doc) = self.store.find_by_id_mut(id) else {
            bail!("document not found: {}", id);
        };
        doc.mark_failed(None)
    }

    // ── Chat ────────────────────────────────────────────────────────

    /// Accept a chat submission.
    pub fn begin_query(&mut self, query: &str) -> Result<PendingQuery, ChatRejection> {
        if query.trim().is_empty() {
            return Err(ChatRejection::EmptyQuery);
        }
        if self.in_flight.is_some() {
            return Err(ChatRejection::AwaitingResponse);
        }
        let message = ChatMessage::user(query);
        let pending = PendingQuery {
            user_message_id: message.id.clone(),
            query: message.content.clone(),
            documents: self.store.list().to_vec(),
        };
        self.in_flight = Some(message.id.clone());
        self.transcript.push(message);
        Ok(pending)
    }

    /// Append the assistant's answer and clear the awaiting flag.
    pub fn complete_query(&mut self, pending: PendingQuery, answer: SearchAnswer) -> &ChatMessage {
        self.release(&pending);
        self.transcript
            .push(ChatMessage::assistant(answer.answer, answer.citations));
        let last = self.transcript.len() - 1;
        &self.transcript[last]
    }

    /// Clear the awaiting flag without an answer.
    pub fn abandon_query(&mut self, pending: PendingQuery) {
        self.release(&pending);
    }

    fn release(&mut self, pending: &PendingQuery) {
        if self.in_flight.as_deref() == Some(pending.user_message_id.as_str()) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentStatus, Role};

    fn doc(id: &str, title: &str) -> Document {
        Document::ready(
            id,
            format!("{}.pdf", id),
            DocumentType::ClinicalStudy,
            Utc::now(),
            "text",
            ExtractedMetadata::new(title, "summary"),
        )
    }

    fn session() -> Session {
        Session::new(
            DocumentStore::with_documents(vec![doc("doc_1", "Study A"), doc("doc_2", "Study B")])
                .unwrap(),
        )
    }

    #[test]
    fn starts_on_dashboard() {
        let s = session();
        assert_eq!(s.view(), &View::Dashboard);
        assert!(s.selected_document().is_none());
        assert!(!s.is_awaiting_response());
    }

    #[test]
    fn open_and_back() {
        let mut s = session();
        s.navigate(Screen::Library);
        s.open_document("doc_2").unwrap();
        assert_eq!(s.selected_document().unwrap().title(), "Study B");
        s.back();
        assert_eq!(s.view(), &View::Library);
        assert!(s.selected_document().is_none());
    }

    #[test]
    fn open_unknown_document_leaves_state() {
        let mut s = session();
        s.navigate(Screen::Library);
        assert!(s.open_document("nope").is_err());
        assert_eq!(s.view(), &View::Library);
    }

    #[test]
    fn navigation_discards_selection() {
        let mut s = session();
        s.open_document("doc_1").unwrap();
        s.navigate(Screen::Chat);
        assert_eq!(s.view(), &View::Chat);
        assert!(s.selected_document().is_none());
    }

    #[test]
    fn back_outside_detail_is_noop() {
        let mut s = session();
        s.navigate(Screen::Chat);
        s.back();
        assert_eq!(s.view(), &View::Chat);
    }

    #[test]
    fn deleting_open_document_returns_to_library() {
        let mut s = session();
        s.open_document("doc_1").unwrap();
        assert_eq!(s.delete_document("doc_1", |_| true), DeleteOutcome::Deleted);
        assert_eq!(s.view(), &View::Library);
        assert!(s.selected_document().is_none());
        assert!(s.store().find_by_id("doc_1").is_none());
    }

    #[test]
    fn deleting_other_document_keeps_detail() {
        let mut s = session();
        s.open_document("doc_1").unwrap();
        assert_eq!(s.delete_document("doc_2", |_| true), DeleteOutcome::Deleted);
        assert_eq!(s.selected_document().unwrap().id(), "doc_1");
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut s = session();
        s.open_document("doc_1").unwrap();
        let mut asked = None;
        let outcome = s.delete_document("doc_1", |d| {
            asked = Some(d.title().to_string());
            false
        });
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(asked.as_deref(), Some("Study A"));
        assert_eq!(s.documents().len(), 2);
        assert_eq!(s.selected_document().unwrap().id(), "doc_1");
    }

    #[test]
    fn delete_unknown_does_not_ask() {
        let mut s = session();
        let outcome = s.delete_document("ghost", |_| panic!("must not ask"));
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[test]
    fn blank_query_rejected_without_message() {
        let mut s = session();
        assert_eq!(s.begin_query("   \n").unwrap_err(), ChatRejection::EmptyQuery);
        assert_eq!(s.begin_query("").unwrap_err(), ChatRejection::EmptyQuery);
        assert!(s.transcript().is_empty());
        assert!(!s.is_awaiting_response());
    }

    #[test]
    fn second_submission_rejected_while_awaiting() {
        let mut s = session();
        let pending = s.begin_query("first?").unwrap();
        assert!(s.is_awaiting_response());
        assert_eq!(
            s.begin_query("second?").unwrap_err(),
            ChatRejection::AwaitingResponse
        );
        assert_eq!(s.transcript().len(), 1);

        s.complete_query(pending, SearchAnswer::new("answer", vec![]));
        assert!(!s.is_awaiting_response());
        assert!(s.begin_query("second?").is_ok());
    }

    #[test]
    fn answer_pairs_with_user_message() {
        let mut s = session();
        s.navigate(Screen::Chat);
        let pending = s.begin_query("What is Study A about?").unwrap();
        assert_eq!(pending.documents().len(), 2);
        s.complete_query(
            pending,
            SearchAnswer::new("Study A concerns X.", vec!["doc_1".into()]),
        );

        let t = s.transcript();
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].role, Role::User);
        assert_eq!(t[0].content, "What is Study A about?");
        assert_eq!(t[1].role, Role::Assistant);
        assert_eq!(t[1].content, "Study A concerns X.");
        assert_eq!(t[1].citation_list(), ["doc_1".to_string()]);

        let resolved = s.resolved_transcript();
        assert_eq!(resolved[1].resolved_citations[0].label, "Study A");
    }

    #[test]
    fn answer_applies_after_navigating_away() {
        let mut s = session();
        s.navigate(Screen::Chat);
        let pending = s.begin_query("q").unwrap();
        s.open_document("doc_2").unwrap();
        s.complete_query(pending, SearchAnswer::new("late answer", vec![]));
        assert_eq!(s.transcript().len(), 2);
        assert_eq!(s.selected_document().unwrap().id(), "doc_2");
    }

    #[test]
    fn answer_survives_deletion_of_cited_document() {
        let mut s = session();
        let pending = s.begin_query("q").unwrap();
        s.delete_document("doc_1", |_| true);
        s.complete_query(pending, SearchAnswer::new("a", vec!["doc_1".into()]));
        let resolved = s.resolved_transcript();
        assert_eq!(resolved[1].resolved_citations[0].label, "doc_1");
        assert_eq!(s.documents().len(), 1);
    }

    #[test]
    fn abandon_clears_flag_without_answer() {
        let mut s = session();
        let pending = s.begin_query("q").unwrap();
        s.abandon_query(pending);
        assert!(!s.is_awaiting_response());
        assert_eq!(s.transcript().len(), 1);
    }

    #[test]
    fn import_lifecycle() {
        let mut s = session();
        let id = s
            .begin_import("new.txt", DocumentType::Guideline, "dosage text".into())
            .unwrap();
        assert!(id.starts_with("doc_"));
        assert_eq!(
            s.store().find_by_id(&id).unwrap().status(),
            DocumentStatus::Processing
        );
        s.finish_import(&id, ExtractedMetadata::new("Guide", "How to dose"))
            .unwrap();
        let doc = s.store().find_by_id(&id).unwrap();
        assert_eq!(doc.status(), DocumentStatus::Ready);
        assert_eq!(doc.title(), "Guide");
        assert!(s.fail_import(&id).is_err());
    }

    #[test]
    fn import_with_fallback_metadata_is_error() {
        let mut s = session();
        let id = s
            .begin_import("bad.txt", DocumentType::Other, "???".into())
            .unwrap();
        s.finish_import(&id, ExtractedMetadata::extraction_fallback())
            .unwrap();
        assert_eq!(
            s.store().find_by_id(&id).unwrap().status(),
            DocumentStatus::Error
        );
    }

    #[test]
    fn snapshot_reports_selection() {
        let mut s = session();
        s.open_document("doc_1").unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.selected_document_id.as_deref(), Some("doc_1"));
        assert_eq!(snap.document_count, 2);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["view"]["screen"], "document_detail");
        assert_eq!(json["view"]["document_id"], "doc_1");
    }

    #[test]
    fn seeded_session_has_sample() {
        let s = Session::seeded().unwrap();
        assert!(s.store().contains(seed::SAMPLE_DOCUMENT_ID));
    }
}
