//! Agent dispatcher
//!
//! One dispatch cycle per user message:
//!
//! ```text
//! AwaitingModel --final text--> Done
//!       |  ^
//! tool calls | observations
//!       v  |
//! ExecutingTool
//! ```
//!
//! Tool calls are checked against a strict shape before anything runs: the
//! name must be registered and the arguments must be a JSON object (or a
//! string holding one). An unknown name fails the cycle. Malformed or invalid
//! arguments and tool errors become error observations so the model can
//! correct itself. A model failure rolls the session back to the user turn.

use netops_core::{Error, ErrorKind, Result, ToolCall, Turn};
use netops_llm::{ChatModel, ChatRequest, LlmResponse, ModelId};
use netops_tools::{ToolError, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompt::{ITERATION_LIMIT_MESSAGE, UNKNOWN_TOOL_MESSAGE};
use crate::session::ChatSession;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum DispatchState {
    AwaitingModel,
    ExecutingTool,
    Done,
    Failed(ErrorKind),
}

/// Result of a dispatch cycle that reached `Done` or `Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Final answer, partial answer or generic failure message
    pub answer: String,
    pub state: DispatchState,
    /// Model rounds used
    pub iterations: usize,
    /// Tool calls executed
    pub tool_calls: usize,
}

impl DispatchOutcome {
    pub fn is_done(&self) -> bool {
        self.state == DispatchState::Done
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub model: ModelId,
    pub temperature: f32,
    pub max_iterations: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            temperature: netops_llm::provider::DEFAULT_TEMPERATURE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

pub struct Dispatcher {
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            registry,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run one dispatch cycle for `user_text`.
    ///
    /// `Err` only for a model failure, in which case the session keeps the
    /// user turn and nothing after it.
    pub async fn run(&self, session: &mut ChatSession, user_text: &str) -> Result<DispatchOutcome> {
        session.push(Turn::user(user_text));
        let checkpoint = session.len();

        let mut state = DispatchState::AwaitingModel;
        let mut pending: Vec<ToolCall> = Vec::new();
        let mut iterations = 0usize;
        let mut executed = 0usize;
        let mut last_observation: Option<String> = None;
        let mut answer = String::new();

        loop {
            match state {
                DispatchState::AwaitingModel => {
                    if iterations >= self.config.max_iterations {
                        warn!(
                            session = %session.id,
                            iterations,
                            "Iteration limit reached without a final answer"
                        );
                        answer = last_observation
                            .take()
                            .unwrap_or_else(|| ITERATION_LIMIT_MESSAGE.to_string());
                        state = DispatchState::Failed(ErrorKind::IterationLimitExceeded);
                        continue;
                    }
                    iterations += 1;

                    let response = match self.ask_model(session).await {
                        Ok(response) => response,
                        Err(e) => {
                            session.truncate(checkpoint);
                            warn!(session = %session.id, error = %e, "Model call failed, rolled back");
                            return Err(match e {
                                Error::UpstreamFailure(_) => e,
                                other => Error::upstream(other.to_string()),
                            });
                        }
                    };

                    match response {
                        LlmResponse::ToolCalls(calls) if calls.is_empty() => {
                            debug!(session = %session.id, "Empty tool batch treated as final answer");
                            answer = String::new();
                            state = DispatchState::Done;
                        }
                        LlmResponse::Content(text) => {
                            answer = text;
                            state = DispatchState::Done;
                        }
                        LlmResponse::ToolCalls(calls) => {
                            if let Some(unknown) = calls.iter().find(|c| !self.registry.contains(&c.name)) {
                                warn!(session = %session.id, tool = %unknown.name, "Model requested unknown tool");
                                answer = UNKNOWN_TOOL_MESSAGE.to_string();
                                state = DispatchState::Failed(ErrorKind::UnknownTool);
                            } else {
                                pending = calls;
                                state = DispatchState::ExecutingTool;
                            }
                        }
                    }
                }
                DispatchState::ExecutingTool => {
                    for call in pending.drain(..) {
                        let observation = self.execute(session, call).await;
                        executed += 1;
                        last_observation = Some(observation);
                    }
                    state = DispatchState::AwaitingModel;
                }
                DispatchState::Done | DispatchState::Failed(_) => break,
            }
        }

        session.push(Turn::assistant(answer.clone()));
        info!(
            session = %session.id,
            state = ?state,
            iterations,
            tool_calls = executed,
            "Dispatch cycle finished"
        );

        Ok(DispatchOutcome {
            answer,
            state,
            iterations,
            tool_calls: executed,
        })
    }

    async fn ask_model(&self, session: &ChatSession) -> Result<LlmResponse> {
        let request = ChatRequest::new(self.config.model, session.window().to_vec())
            .with_tools(self.registry.declarations())
            .with_temperature(self.config.temperature);
        let request = match &session.system {
            Some(system) => request.with_system(system.clone()),
            None => request,
        };
        debug!(
            session = %session.id,
            turns = request.turns.len(),
            stored = session.len(),
            "Querying model"
        );
        self.model.chat(&request).await
    }

    /// Record the call, run it and record the observation; returns the observation text
    async fn execute(&self, session: &mut ChatSession, call: ToolCall) -> String {
        session.push(Turn::tool_call(call.clone()));

        let result = match normalize_arguments(&call.arguments) {
            Ok(arguments) => self.registry.execute(&call.name, &arguments).await,
            Err(e) => Err(e),
        };

        let (content, is_error) = match result {
            Ok(text) => (text, false),
            Err(e) => (e.to_observation(), true),
        };
        debug!(tool = %call.name, is_error, "Tool observation recorded");
        session.push(Turn::observation(&call, content.clone(), is_error));
        content
    }
}

/// Coerce model-supplied arguments into a JSON object
pub fn normalize_arguments(arguments: &Value) -> std::result::Result<Value, ToolError> {
    match arguments {
        Value::Object(_) => Ok(arguments.clone()),
        Value::Null => Ok(Value::Object(Map::new())),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Value::Object(map)),
            _ => Err(ToolError::invalid_argument(
                "tool arguments must be a JSON object",
            )),
        },
        _ => Err(ToolError::invalid_argument(
            "tool arguments must be a JSON object",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_llm::ScriptedModel;
    use netops_tools::{ArgSchema, ArgType, SimpleTool};
    use serde_json::json;

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(SimpleTool::new(
                "cmdb_tool",
                "Lookup",
                ArgSchema::new().required("name", ArgType::String, "Device name"),
                |args| match args.get_str("name")? {
                    "asw1" => Ok("192.168.1.10".to_string()),
                    other => Err(ToolError::not_found(format!(
                        "Device with name {} not found.",
                        other
                    ))),
                },
            )))
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_normalize_arguments() {
        assert_eq!(normalize_arguments(&json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert_eq!(normalize_arguments(&Value::Null).unwrap(), json!({}));
        assert_eq!(
            normalize_arguments(&json!(r#"{"name":"asw1"}"#)).unwrap(),
            json!({"name": "asw1"})
        );
        assert!(normalize_arguments(&json!("asw1")).is_err());
        assert!(normalize_arguments(&json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_final_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new().then_content("Hello."));
        let dispatcher = Dispatcher::new(model.clone(), registry());
        let mut session = ChatSession::new().with_system("sys");

        let outcome = dispatcher.run(&mut session, "hi").await.unwrap();
        assert!(outcome.is_done());
        assert_eq!(outcome.answer, "Hello.");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(session.turns(), &[Turn::user("hi"), Turn::assistant("Hello.")]);

        let requests = model.requests().await;
        assert_eq!(requests[0].system.as_deref(), Some("sys"));
        assert_eq!(requests[0].tools.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_tool_batch_ends_cycle() {
        let model = Arc::new(ScriptedModel::new().then_tool_calls(vec![]));
        let dispatcher = Dispatcher::new(model.clone(), registry());
        let mut session = ChatSession::new();

        let outcome = dispatcher.run(&mut session, "hi").await.unwrap();
        assert!(outcome.is_done());
        assert_eq!(outcome.answer, "");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(model.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_error_is_fed_back() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("cmdb_tool", json!({"name": "asw9"}))
                .then_tool_call("cmdb_tool", json!({"name": "asw1"}))
                .then_content("asw1 has IP 192.168.1.10."),
        );
        let dispatcher = Dispatcher::new(model.clone(), registry());
        let mut session = ChatSession::new();

        let outcome = dispatcher.run(&mut session, "IP of asw1?").await.unwrap();
        assert!(outcome.is_done());
        assert_eq!(outcome.tool_calls, 2);
        assert_eq!(outcome.iterations, 3);

        match &session.turns()[2] {
            Turn::ToolObservation {
                content, is_error, ..
            } => {
                assert!(*is_error);
                assert_eq!(content, "error (not_found): Device with name asw9 not found.");
            }
            other => panic!("expected observation, got {:?}", other),
        }
        let last_request = model.requests().await.pop().unwrap();
        assert_eq!(last_request.turns.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_cycle() {
        let model = Arc::new(ScriptedModel::new().then_tool_calls(vec![
            ToolCall::new("cmdb_tool", json!({"name": "asw1"})),
            ToolCall::new("reboot_tool", json!({})),
        ]));
        let dispatcher = Dispatcher::new(model, registry());
        let mut session = ChatSession::new();

        let outcome = dispatcher.run(&mut session, "reboot asw1").await.unwrap();
        assert_eq!(outcome.state, DispatchState::Failed(ErrorKind::UnknownTool));
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[1], Turn::assistant(UNKNOWN_TOOL_MESSAGE));
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_observation() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("cmdb_tool", Value::String("name=asw1".into()))
                .then_content("Retry failed."),
        );
        let dispatcher = Dispatcher::new(model, registry());
        let mut session = ChatSession::new();

        let outcome = dispatcher.run(&mut session, "IP of asw1?").await.unwrap();
        assert!(outcome.is_done());
        match &session.turns()[2] {
            Turn::ToolObservation { content, .. } => {
                assert!(content.starts_with("error (invalid_argument)"))
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_iteration_limit_returns_partial_answer() {
        let call = ToolCall::new("cmdb_tool", json!({"name": "asw1"}));
        let model = Arc::new(ScriptedModel::new().repeat(LlmResponse::ToolCalls(vec![call])));
        let dispatcher = Dispatcher::new(model.clone(), registry()).with_config(DispatcherConfig {
            max_iterations: 3,
            ..Default::default()
        });
        let mut session = ChatSession::new();

        let outcome = dispatcher.run(&mut session, "loop").await.unwrap();
        assert_eq!(
            outcome.state,
            DispatchState::Failed(ErrorKind::IterationLimitExceeded)
        );
        assert_eq!(outcome.answer, "192.168.1.10");
        assert_eq!(outcome.iterations, 3);
        assert_eq!(model.calls().await, 3);
    }

    #[tokio::test]
    async fn test_upstream_failure_rolls_back() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_tool_call("cmdb_tool", json!({"name": "asw1"}))
                .then_error("connection reset"),
        );
        let dispatcher = Dispatcher::new(model, registry());
        let mut session = ChatSession::new();
        session.push(Turn::user("earlier"));
        session.push(Turn::assistant("earlier answer"));

        let err = dispatcher.run(&mut session, "IP of asw1?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(session.len(), 3);
        assert_eq!(session.turns()[2], Turn::user("IP of asw1?"));
    }
}
