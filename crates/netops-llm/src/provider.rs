//! Chat model abstraction

use async_trait::async_trait;
use netops_core::{Result, ToolCall, ToolDeclaration, Turn};
use serde::{Deserialize, Serialize};

use crate::model::ModelId;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// One model round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: ModelId,
    /// System framing, sent first
    pub system: Option<String>,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolDeclaration>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(model: ModelId, turns: Vec<Turn>) -> Self {
        Self {
            model,
            system: None,
            turns,
            tools: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// LLM chat response - final text or tool calls
#[derive(Debug, Clone, PartialEq)]
pub enum LlmResponse {
    Content(String),
    ToolCalls(Vec<ToolCall>),
}

/// Chat-completion collaborator
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Run one model round. Transport or API failures are `UpstreamFailure`.
    async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse>;
}
