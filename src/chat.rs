//! Chat submission against a shared session.
//!
//! The session lock is held only for the two synchronous transitions,
//! never across the model call, so other requests keep working while an
//! answer is outstanding.

use std::sync::{Mutex, MutexGuard};

use prospan_core::models::ChatMessage;
use prospan_core::session::{ChatRejection, Session};
use thiserror::Error;

use crate::config::AssistantConfig;
use crate::genai::{AiError, GenerativeModel};
use crate::search;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Rejected(#[from] ChatRejection),
    #[error(transparent)]
    Unavailable(#[from] AiError),
}

/// Lock the session, recovering the state if a previous holder panicked.
pub fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Submit `query` and wait for the answer.
///
/// Returns the appended assistant message. On a configuration error the
/// user message stays in the transcript without an answer and the session
/// accepts new queries again.
pub async fn submit(
    session: &Mutex<Session>,
    model: &dyn GenerativeModel,
    settings: &AssistantConfig,
    query: &str,
) -> Result<ChatMessage, ChatError> {
    let pending = lock_session(session).begin_query(query)?;

    match search::ask(model, pending.query(), pending.documents(), settings).await {
        Ok(answer) => Ok(lock_session(session)
            .complete_query(pending, answer)
            .clone()),
        Err(e) => {
            lock_session(session).abandon_query(pending);
            Err(e.into())
        }
    }
}
