//! Question answering over the whole library.
//!
//! Every document's title, summary and key results go into one context
//! block; there is no retrieval step. The model answers in JSON with the ids
//! of the documents it used.

use anyhow::Result;
use prospan_core::citation::resolve_citations;
use prospan_core::models::Document;
use prospan_core::prompt::{
    search_context, search_prompt, search_schema, NO_ANSWER_TEXT, SEARCH_FAILED_TEXT,
};
use prospan_core::response::{parse_search_answer, SearchAnswer};
use prospan_core::session::Session;

use crate::config::{AssistantConfig, Config};
use crate::genai::{create_model, AiError, GenerateRequest, GenerativeModel};

/// Answer `query` from `documents`.
///
/// An empty payload answers with a fixed "no answer" text; any other
/// non-configuration failure answers with a fixed error text. Neither has
/// citations.
pub async fn ask(
    model: &dyn GenerativeModel,
    query: &str,
    documents: &[Document],
    settings: &AssistantConfig,
) -> Result<SearchAnswer, AiError> {
    let context = search_context(documents);
    let request = GenerateRequest::new(search_prompt(query, &context, &settings.language))
        .with_schema(search_schema())
        .with_temperature(settings.search_temperature);

    tracing::debug!(
        documents = documents.len(),
        context_chars = context.chars().count(),
        "asking library question"
    );

    match model.generate(&request).await {
        Ok(None) => {
            tracing::warn!("search returned no text");
            Ok(SearchAnswer::fallback(NO_ANSWER_TEXT))
        }
        Ok(Some(payload)) => match parse_search_answer(&payload) {
            Ok(answer) => Ok(answer),
            Err(e) => {
                tracing::warn!(error = %e, "discarding search payload");
                Ok(SearchAnswer::fallback(SEARCH_FAILED_TEXT))
            }
        },
        Err(e) if e.is_configuration() => {
            tracing::error!(error = %e, "search unavailable");
            Err(e)
        }
        Err(e) => {
            tracing::error!(error = %e, "search failed");
            Ok(SearchAnswer::fallback(SEARCH_FAILED_TEXT))
        }
    }
}

/// `prospan ask`: answer one question over the built-in library.
pub async fn run_ask(config: &Config, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }
    let session = Session::seeded()?;
    let model = create_model(&config.ai)?;
    let answer = ask(model.as_ref(), query, session.documents(), &config.assistant).await?;

    println!("{}", answer.answer);
    let sources = resolve_citations(session.store(), &answer.citations);
    if !sources.is_empty() {
        println!();
        println!("Sources:");
        for c in sources {
            match c.document_id {
                Some(id) => println!("  - {} [{}]", c.label, id),
                None => println!("  - {}", c.label),
            }
        }
    }
    Ok(())
}
