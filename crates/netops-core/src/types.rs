//! Common types used across netops

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Chat role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
            ChatRole::Tool => write!(f, "tool"),
        }
    }
}

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    /// Create a call with a fresh id
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: format!("call-{}", Uuid::new_v4()),
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Tool declaration handed to the chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ToolDeclaration {
    /// Convert to OpenAI function calling format
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }
}

/// One entry of a conversation.
///
/// The sequence is append-only and chronological; a `ToolObservation` always
/// follows the `ToolCall` carrying the same `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    User {
        text: String,
    },
    Assistant {
        text: String,
    },
    ToolCall {
        call: ToolCall,
    },
    ToolObservation {
        call_id: String,
        name: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Turn::Assistant { text: text.into() }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Turn::ToolCall { call }
    }

    pub fn observation(call: &ToolCall, content: impl Into<String>, is_error: bool) -> Self {
        Turn::ToolObservation {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error,
        }
    }

    pub fn role(&self) -> ChatRole {
        match self {
            Turn::User { .. } => ChatRole::User,
            Turn::Assistant { .. } | Turn::ToolCall { .. } => ChatRole::Assistant,
            Turn::ToolObservation { .. } => ChatRole::Tool,
        }
    }

    /// Text rendering used for display and token estimation
    pub fn text(&self) -> String {
        match self {
            Turn::User { text } | Turn::Assistant { text } => text.clone(),
            Turn::ToolCall { call } => format!("{}({})", call.name, call.arguments),
            Turn::ToolObservation { content, .. } => content.clone(),
        }
    }

    pub fn is_observation(&self) -> bool {
        matches!(self, Turn::ToolObservation { .. })
    }

    /// Rough token count: UTF-8 bytes / 4, never zero
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.text())
    }
}

/// Rough token count of a text: UTF-8 bytes / 4, never zero
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_roles() {
        let call = ToolCall::new("cmdb_tool", json!({"name": "asw1"}));
        assert_eq!(Turn::user("hi").role(), ChatRole::User);
        assert_eq!(Turn::tool_call(call.clone()).role(), ChatRole::Assistant);
        assert_eq!(Turn::observation(&call, "ok", false).role(), ChatRole::Tool);
    }

    #[test]
    fn test_observation_links_call() {
        let call = ToolCall::with_id("c1", "ping_tool", json!({"ip": "8.8.8.8"}));
        match Turn::observation(&call, "reachable", false) {
            Turn::ToolObservation { call_id, name, .. } => {
                assert_eq!(call_id, "c1");
                assert_eq!(name, "ping_tool");
            }
            other => panic!("unexpected turn {:?}", other),
        }
    }

    #[test]
    fn test_turn_serialization_is_tagged() {
        let value = serde_json::to_value(Turn::user("hello")).unwrap();
        assert_eq!(value, json!({"kind": "user", "text": "hello"}));
    }

    #[test]
    fn test_estimate_tokens_never_zero() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }
}
