//! Scripted chat model
//!
//! Replays a fixed queue of replies and records every request it receives.
//! When the queue runs dry it keeps returning the fallback reply, if any.

use async_trait::async_trait;
use netops_core::{Error, Result, ToolCall};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::provider::{ChatModel, ChatRequest, LlmResponse};

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<LlmResponse>>>,
    fallback: Option<LlmResponse>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_content(self, text: impl Into<String>) -> Self {
        self.then(Ok(LlmResponse::Content(text.into())))
    }

    pub fn then_tool_call(self, name: &str, arguments: Value) -> Self {
        self.then(Ok(LlmResponse::ToolCalls(vec![ToolCall::new(name, arguments)])))
    }

    pub fn then_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.then(Ok(LlmResponse::ToolCalls(calls)))
    }

    pub fn then_error(self, message: &str) -> Self {
        self.then(Err(Error::upstream(message)))
    }

    /// Reply used once the queue is empty
    pub fn repeat(mut self, reply: LlmResponse) -> Self {
        self.fallback = Some(reply);
        self
    }

    fn then(mut self, reply: Result<LlmResponse>) -> Self {
        self.replies.get_mut().push_back(reply);
        self
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse> {
        self.requests.lock().await.push(request.clone());
        match self.replies.lock().await.pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::upstream("scripted model has no more replies")),
        }
    }
}
