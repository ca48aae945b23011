use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{ChatMessage, LlmError, TextGenerator};

/// A scripted generator for tests.
///
/// Replies are returned in the order they were queued. Once the script is
/// exhausted every call gets the default reply. Every message list received
/// is recorded.
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_reply: Result<String, String>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGenerator {
    /// A mock that answers every call with `reply`.
    pub fn always(reply: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every call fails with a transport error.
    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply ahead of the default.
    pub fn then_reply(self, reply: &str) -> Self {
        lock(&self.script).push_back(Ok(reply.to_string()));
        self
    }

    /// Queue a failure ahead of the default.
    pub fn then_fail(self, message: &str) -> Self {
        lock(&self.script).push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.requests).clone()
    }

    /// Content of the last message of the nth call.
    pub fn prompt(&self, call: usize) -> Option<String> {
        lock(&self.requests)
            .get(call)
            .and_then(|msgs| msgs.last())
            .map(|m| m.content.clone())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        lock(&self.requests).push(messages.to_vec());
        let next = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());
        next.map_err(LlmError::Transport)
    }
}
