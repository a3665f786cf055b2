//! Parse-and-validate for AI response payloads.
//!
//! Provider output is untrusted text. These functions turn it into typed
//! results or a [`ParseError`]; callers decide what fallback to use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ExtractedMetadata;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty response payload")]
    Empty,
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("required field `{0}` is missing or blank")]
    MissingField(&'static str),
}

/// Answer to a library question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAnswer {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

impl SearchAnswer {
    pub fn new(answer: impl Into<String>, citations: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            citations,
        }
    }

    /// A fixed-text answer without citations.
    pub fn fallback(text: &str) -> Self {
        Self::new(text, Vec::new())
    }
}

/// Strip a surrounding Markdown code fence, if any.
fn unfence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn non_blank(payload: &str) -> Result<&str, ParseError> {
    let body = unfence(payload);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(body)
}

/// Parse extracted metadata, requiring a non-blank title and summary.
pub fn parse_metadata(payload: &str) -> Result<ExtractedMetadata, ParseError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Raw {
        title: Option<String>,
        summary: Option<String>,
        #[serde(flatten)]
        rest: serde_json::Map<String, serde_json::Value>,
    }

    let body = non_blank(payload)?;
    let raw: Raw =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(ParseError::MissingField("title"))?;
    let summary = raw
        .summary
        .filter(|s| !s.trim().is_empty())
        .ok_or(ParseError::MissingField("summary"))?;

    let mut full = raw.rest;
    full.insert("title".into(), title.into());
    full.insert("summary".into(), summary.into());
    serde_json::from_value(serde_json::Value::Object(full))
        .map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Parse a search answer, requiring a non-blank `answer`.
///
/// Blank citation entries are dropped; the rest are kept verbatim whether or
/// not they name a known document.
pub fn parse_search_answer(payload: &str) -> Result<SearchAnswer, ParseError> {
    #[derive(Deserialize)]
    struct Raw {
        answer: Option<String>,
        #[serde(default)]
        citations: Option<Vec<String>>,
    }

    let body = non_blank(payload)?;
    let raw: Raw =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let answer = raw
        .answer
        .filter(|a| !a.trim().is_empty())
        .ok_or(ParseError::MissingField("answer"))?;
    let citations = raw
        .citations
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    Ok(SearchAnswer { answer, citations })
}
