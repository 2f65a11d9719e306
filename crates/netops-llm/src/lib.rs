//! netops-llm: Chat model collaborators
//!
//! The dispatcher talks to a model only through [`ChatModel`]: an ordered
//! list of turns plus tool declarations in, final text or tool-call requests
//! out. [`OpenAiProvider`] speaks the OpenAI-compatible chat completions API;
//! [`ScriptedModel`] replays canned replies for tests and offline runs.

pub mod model;
pub mod openai;
pub mod provider;
pub mod scripted;

pub use model::ModelId;
pub use openai::OpenAiProvider;
pub use provider::{ChatModel, ChatRequest, LlmResponse};
pub use scripted::ScriptedModel;
