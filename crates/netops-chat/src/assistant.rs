//! Assistant facade
//!
//! Ties sessions, the dispatcher, the shared knowledge base and the
//! interaction log together. Both the HTTP router and the terminal mode go
//! through this type.

use netops_core::{Error, Result};
use netops_rag::{IndexReport, KnowledgeBase};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::{DispatchState, Dispatcher};
use crate::interaction_log::InteractionLog;
use crate::session::{SessionInfo, SessionManager};

/// Answer to one user message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub answer: String,
    pub state: DispatchState,
    pub iterations: usize,
    pub tool_calls: usize,
}

pub struct Assistant {
    dispatcher: Dispatcher,
    sessions: Arc<SessionManager>,
    knowledge: Arc<KnowledgeBase>,
    docs_dir: PathBuf,
    log: Option<InteractionLog>,
}

impl Assistant {
    pub fn new(
        dispatcher: Dispatcher,
        sessions: Arc<SessionManager>,
        knowledge: Arc<KnowledgeBase>,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dispatcher,
            sessions,
            knowledge,
            docs_dir: docs_dir.into(),
            log: None,
        }
    }

    pub fn with_interaction_log(mut self, log: InteractionLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Run one dispatch cycle. Without a session id a new session is created.
    pub async fn ask(&self, session_id: Option<&str>, text: &str) -> Result<ChatReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_argument("message must not be empty"));
        }

        let (session_id, session) = match session_id {
            Some(id) => (id.to_string(), self.sessions.get_or_create(id).await),
            None => self.sessions.create().await,
        };

        let outcome = {
            let mut session = session.lock().await;
            self.dispatcher.run(&mut session, text).await?
        };

        if let Some(log) = &self.log {
            if let Err(e) = log.append(text, &outcome.answer).await {
                warn!(path = %log.path().display(), error = %e, "Failed to write interaction log");
            }
        }

        Ok(ChatReply {
            session_id,
            answer: outcome.answer,
            state: outcome.state,
            iterations: outcome.iterations,
            tool_calls: outcome.tool_calls,
        })
    }

    /// Rebuild the document index from the configured directory.
    ///
    /// Session histories are untouched; a failed rebuild keeps the old index.
    pub async fn reindex(&self) -> Result<IndexReport> {
        let report = self.knowledge.index_directory(&self.docs_dir).await?;
        info!(
            documents = report.documents,
            chunks = report.chunks,
            backend = %report.backend,
            "Knowledge base re-indexed"
        );
        Ok(report)
    }

    /// Clear one session's history
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.reset(session_id).await
    }

    pub async fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let session = self.sessions.get(session_id).await?;
        let info = session.lock().await.info();
        Some(info)
    }
}
