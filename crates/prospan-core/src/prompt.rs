//! Prompt construction for the two AI-backed operations.
//!
//! Both prompts are plain text. The extraction prompt carries a bounded
//! prefix of the raw document; the search prompt carries a context block built
//! from every document's title, summary and key results. Response-schema
//! hints use the provider's OpenAPI-style type names (`OBJECT`, `STRING`,
//! `ARRAY`).

use serde_json::{json, Value};

use crate::models::Document;

/// Default number of characters of raw text sent for extraction.
pub const DEFAULT_MAX_EXTRACT_CHARS: usize = 30_000;

/// Default working language of prompts and answers.
pub const DEFAULT_LANGUAGE: &str = "Vietnamese";

/// Answer used when the provider returns an empty payload.
pub const NO_ANSWER_TEXT: &str = "I could not generate an answer.";

/// Answer used when the search call fails.
pub const SEARCH_FAILED_TEXT: &str = "An error occurred while searching.";

/// The first `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Prompt for structured metadata extraction.
pub fn extraction_prompt(raw_text: &str, language: &str, max_chars: usize) -> String {
    let text = truncate_chars(raw_text, max_chars);
    format!(
        "Analyze the following medical/product text about Prospan. \
         Extract precise structured data based only on the provided text. \
         Do not invent information that is not present.\n\
         ALL OUTPUT VALUES MUST BE WRITTEN IN {}.\n\nTEXT:\n{}",
        language.to_uppercase(),
        text
    )
}

/// Response schema for metadata extraction.
pub fn extraction_schema() -> Value {
    let string = |description: &str| json!({ "type": "STRING", "description": description });
    let list = |description: &str| {
        json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
    };
    json!({
        "type": "OBJECT",
        "properties": {
            "title": string("Official title of the study or document."),
            "publicationDate": string("Publication or completion date (YYYY-MM-DD or year)."),
            "ingredients": list("Active ingredients mentioned (e.g. EA 575)."),
            "mechanism": string("Short description of the mechanism of action."),
            "indications": list("Medical conditions treated."),
            "contraindications": list("When the product must NOT be used."),
            "population": string("Target population (e.g. children 6-12 years, adults)."),
            "dosage": string("Recommended dosage information."),
            "results": list("Key clinical findings or statistical results."),
            "source": string("Journal, organisation or origin of the document."),
            "summary": string("Concise 2-3 sentence summary of the document.")
        },
        "required": ["title", "summary"]
    })
}

/// Context block listing every document, in store order.
pub fn search_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| {
            let meta = doc.metadata();
            let results = meta
                .results
                .as_ref()
                .map(|r| r.join("; "))
                .unwrap_or_default();
            format!(
                "ID: {}\nTitle: {}\nSummary: {}\nKey results: {}\n---\n",
                doc.id(),
                meta.title,
                meta.summary,
                results
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for answering a question from the context block.
pub fn search_prompt(query: &str, context: &str, language: &str) -> String {
    format!(
        r#"You are an expert AI assistant for "Prospan Lib", a medical library.
Answer the user's question based on the provided context documents.

User question: "{query}"

Context documents:
{context}

Instructions:
1. Answer clearly and professionally (medical tone) in {language}.
2. If the answer is found in a specific document, cite it by referring to its Title.
3. If the answer is not in the documents, say that the current library has no information about it.
4. Return the response as JSON with "answer" (string) and "citations" (array of document IDs found in the context).
"#
    )
}

/// Response schema for search answers.
pub fn search_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "answer": { "type": "STRING" },
            "citations": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}
