//! Core data models used throughout Prospan Lib.
//!
//! These types represent the documents, their AI-extracted metadata, and the
//! chat transcript that flow between the store, the session, and the
//! presentation surfaces.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel title used when metadata extraction fails.
pub const EXTRACTION_FALLBACK_TITLE: &str = "Unidentified document";
/// Sentinel summary used when metadata extraction fails.
pub const EXTRACTION_FALLBACK_SUMMARY: &str = "Metadata could not be extracted by the AI service.";

/// Category of a library document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    ClinicalStudy,
    Marketing,
    Legal,
    Guideline,
    Other,
}

impl DocumentType {
    /// All variants, in display order.
    pub const ALL: [DocumentType; 5] = [
        DocumentType::ClinicalStudy,
        DocumentType::Marketing,
        DocumentType::Guideline,
        DocumentType::Legal,
        DocumentType::Other,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::ClinicalStudy => "Clinical study",
            DocumentType::Marketing => "Marketing material",
            DocumentType::Legal => "Legal/Regulatory",
            DocumentType::Guideline => "Usage guideline",
            DocumentType::Other => "Other",
        }
    }

    /// Machine identifier, as used on the CLI and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::ClinicalStudy => "clinical-study",
            DocumentType::Marketing => "marketing",
            DocumentType::Legal => "legal",
            DocumentType::Guideline => "guideline",
            DocumentType::Other => "other",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clinical-study" | "clinical" | "study" => Ok(DocumentType::ClinicalStudy),
            "marketing" => Ok(DocumentType::Marketing),
            "legal" => Ok(DocumentType::Legal),
            "guideline" => Ok(DocumentType::Guideline),
            "other" => Ok(DocumentType::Other),
            other => bail!(
                "Unknown document type: '{}'. Must be clinical-study, marketing, legal, guideline, or other.",
                other
            ),
        }
    }
}

/// Processing state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Error => "error",
        }
    }
}

/// Structured note attached to a document.
///
/// Only `title` and `summary` are required. Keys are camelCase because this
/// is also the shape the AI provider is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contraindications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ExtractedMetadata {
    /// Metadata with only the two required fields set.
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    /// The placeholder returned when extraction fails.
    pub fn extraction_fallback() -> Self {
        Self::new(EXTRACTION_FALLBACK_TITLE, EXTRACTION_FALLBACK_SUMMARY)
    }

    /// Whether this is the extraction-failed placeholder.
    pub fn is_extraction_fallback(&self) -> bool {
        self.title == EXTRACTION_FALLBACK_TITLE && self.summary == EXTRACTION_FALLBACK_SUMMARY
    }
}

/// A stored unit of source text plus its derived metadata.
///
/// `id` and `content` have no mutable accessors; `status` and `metadata`
/// change only through [`Document::mark_ready`] and [`Document::mark_failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    file_name: String,
    doc_type: DocumentType,
    upload_date: DateTime<Utc>,
    content: String,
    metadata: ExtractedMetadata,
    status: DocumentStatus,
}

impl Document {
    /// A document whose metadata is already known.
    pub fn ready(
        id: impl Into<String>,
        file_name: impl Into<String>,
        doc_type: DocumentType,
        upload_date: DateTime<Utc>,
        content: impl Into<String>,
        metadata: ExtractedMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            doc_type,
            upload_date,
            content: content.into(),
            metadata,
            status: DocumentStatus::Ready,
        }
    }

    /// A document awaiting metadata extraction. Its title is the file name
    /// until extraction finishes.
    pub fn processing(
        id: impl Into<String>,
        file_name: impl Into<String>,
        doc_type: DocumentType,
        upload_date: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            id: id.into(),
            metadata: ExtractedMetadata::new(file_name.clone(), String::new()),
            file_name,
            doc_type,
            upload_date,
            content: content.into(),
            status: DocumentStatus::Processing,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn upload_date(&self) -> DateTime<Utc> {
        self.upload_date
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &ExtractedMetadata {
        &self.metadata
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// processing -> ready, attaching the extracted metadata.
    pub fn mark_ready(&mut self, metadata: ExtractedMetadata) -> Result<()> {
        self.ensure_processing(DocumentStatus::Ready)?;
        self.metadata = metadata;
        self.status = DocumentStatus::Ready;
        Ok(())
    }

    /// processing -> error. Metadata becomes the extraction fallback unless
    /// one is supplied.
    pub fn mark_failed(&mut self, metadata: Option<ExtractedMetadata>) -> Result<()> {
        self.ensure_processing(DocumentStatus::Error)?;
        self.metadata = metadata.unwrap_or_else(ExtractedMetadata::extraction_fallback);
        self.status = DocumentStatus::Error;
        Ok(())
    }

    fn ensure_processing(&self, target: DocumentStatus) -> Result<()> {
        if self.status != DocumentStatus::Processing {
            bail!(
                "invalid status transition for document {}: {} -> {}",
                self.id,
                self.status.as_str(),
                target.as_str()
            );
        }
        Ok(())
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of the chat transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            citations: None,
        }
    }

    pub fn assistant(content: impl Into<String>, citations: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            citations: Some(citations),
        }
    }

    /// Citations attached to this message, empty when none.
    pub fn citation_list(&self) -> &[String] {
        self.citations.as_deref().unwrap_or(&[])
    }
}
