//! Scripted model for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AiError, GenerateRequest, GenerativeModel};

/// Returns queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Option<String>, AiError>>>,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, payload: &str) -> Self {
        self.push(Ok(Some(payload.to_string())))
    }

    pub fn empty(self) -> Self {
        self.push(Ok(None))
    }

    pub fn fail(self, err: AiError) -> Self {
        self.push(Err(err))
    }

    fn push(self, reply: Result<Option<String>, AiError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, AiError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Transport("no scripted reply left".into())))
    }
}
