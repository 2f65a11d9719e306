//! netops-chat: Conversations with the network assistant
//!
//! # Modules
//!
//! - `dispatcher`: the agent loop (model round, tool execution, observation)
//! - `history`: what part of a session is sent to the model
//! - `session`: per-user conversation state and the session manager
//! - `assistant`: facade wiring sessions, dispatcher, knowledge base and log
//! - `interaction_log`: append-only question/answer log
//! - `log_analysis`: severity assessment and explanation of device logs
//! - `router`: HTTP endpoints

pub mod assistant;
pub mod dispatcher;
pub mod history;
pub mod interaction_log;
pub mod log_analysis;
pub mod prompt;
pub mod router;
pub mod session;

pub use assistant::{Assistant, ChatReply};
pub use dispatcher::{DispatchOutcome, DispatchState, Dispatcher, DispatcherConfig};
pub use history::HistoryPolicy;
pub use interaction_log::InteractionLog;
pub use log_analysis::{LogAnalyzer, LogBook, LogEvent, LogItem, Severity, SortOrder};
pub use router::{create_router, ChatState};
pub use session::{ChatSession, SessionInfo, SessionManager};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assistant::Assistant;
    pub use super::dispatcher::{Dispatcher, DispatcherConfig};
    pub use super::history::HistoryPolicy;
    pub use super::session::SessionManager;
}
