//! Chat session management

use chrono::{DateTime, Utc};
use netops_core::Turn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::history::HistoryPolicy;

/// A chat session containing the turn history
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    /// System framing, sent before every window and never trimmed
    pub system: Option<String>,
    turns: Vec<Turn>,
    pub policy: HistoryPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new chat session
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create with a specific ID
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            system: None,
            turns: Vec::new(),
            policy: HistoryPolicy::Unbounded,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns sent to the model under the session's policy
    pub fn window(&self) -> &[Turn] {
        self.policy.window(self.system.as_deref(), &self.turns)
    }

    /// Drop every turn after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.turns.truncate(len);
        self.updated_at = Utc::now();
    }

    /// Clear all turns; the system framing stays
    pub fn clear(&mut self) {
        self.turns.clear();
        self.updated_at = Utc::now();
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            turn_count: self.turns.len(),
            policy: self.policy,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Basic session info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub turn_count: usize,
    pub policy: HistoryPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

struct SessionSlot {
    session: Arc<Mutex<ChatSession>>,
    last_used: DateTime<Utc>,
}

/// Session manager for handling multiple chat sessions.
///
/// Each session sits behind its own mutex, so one dispatch cycle runs at a
/// time per session while different sessions proceed in parallel.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    max_sessions: usize,
    system: Option<String>,
    policy: HistoryPolicy,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new() -> Self {
        Self::with_max_sessions(100)
    }

    /// Create with custom max sessions
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            system: None,
            policy: HistoryPolicy::Unbounded,
        }
    }

    /// System framing given to every new session
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// History policy given to every new session
    pub fn with_policy(mut self, policy: HistoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn fresh(&self, id: String) -> ChatSession {
        let mut session = ChatSession::with_id(id).with_policy(self.policy);
        session.system = self.system.clone();
        session
    }

    fn insert(
        &self,
        sessions: &mut HashMap<String, SessionSlot>,
        session: ChatSession,
    ) -> Arc<Mutex<ChatSession>> {
        // Evict the least recently used idle session if at capacity. A session
        // handle held outside the map belongs to a running dispatch cycle.
        if sessions.len() >= self.max_sessions {
            let oldest_idle = sessions
                .iter()
                .filter(|(_, slot)| Arc::strong_count(&slot.session) == 1)
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| id.clone());
            match oldest_idle {
                Some(oldest_id) => {
                    sessions.remove(&oldest_id);
                    info!(session = %oldest_id, "Evicted least recently used session");
                }
                None => warn!(
                    sessions = sessions.len(),
                    "Every session is busy, exceeding the session limit"
                ),
            }
        }

        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            SessionSlot {
                session: shared.clone(),
                last_used: Utc::now(),
            },
        );
        shared
    }

    /// Create a new session
    pub async fn create(&self) -> (String, Arc<Mutex<ChatSession>>) {
        let session = self.fresh(Uuid::new_v4().to_string());
        let id = session.id.clone();
        let mut sessions = self.sessions.write().await;
        let shared = self.insert(&mut sessions, session);
        debug!(session = %id, "Created session");
        (id, shared)
    }

    /// Get a session by ID
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<ChatSession>>> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(|slot| {
            slot.last_used = Utc::now();
            slot.session.clone()
        })
    }

    /// Get or create a session
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<ChatSession>> {
        let mut sessions = self.sessions.write().await;
        if let Some(slot) = sessions.get_mut(id) {
            slot.last_used = Utc::now();
            return slot.session.clone();
        }
        debug!(session = %id, "Created session");
        self.insert(&mut sessions, self.fresh(id.to_string()))
    }

    /// Clear the history of a session; `false` if it does not exist
    pub async fn reset(&self, id: &str) -> bool {
        match self.get(id).await {
            Some(session) => {
                session.lock().await.clear();
                info!(session = %id, "Session history cleared");
                true
            }
            None => false,
        }
    }

    /// Delete a session
    pub async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// List all sessions with basic info
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let handles: Vec<Arc<Mutex<ChatSession>>> = self
            .sessions
            .read()
            .await
            .values()
            .map(|slot| slot.session.clone())
            .collect();

        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            infos.push(handle.lock().await.info());
        }
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        infos
    }

    /// Get session count
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_push_and_truncate() {
        let mut session = ChatSession::new().with_system("sys");
        session.push(Turn::user("hello"));
        session.push(Turn::assistant("hi"));
        assert_eq!(session.len(), 2);

        session.truncate(1);
        assert_eq!(session.turns(), &[Turn::user("hello")]);

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.system.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn test_manager_defaults_apply_to_new_sessions() {
        let manager = SessionManager::new()
            .with_system("framing")
            .with_policy(HistoryPolicy::TokenBudget { max_tokens: 50 });
        let (id, session) = manager.create().await;
        let session = session.lock().await;
        assert_eq!(session.id, id);
        assert_eq!(session.system.as_deref(), Some("framing"));
        assert_eq!(session.policy, HistoryPolicy::TokenBudget { max_tokens: 50 });
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let manager = SessionManager::new();
        let a = manager.get_or_create("s1").await;
        a.lock().await.push(Turn::user("q"));
        let b = manager.get_or_create("s1").await;
        assert_eq!(b.lock().await.len(), 1);
        assert_eq!(manager.count().await, 1);
    }

    #[tokio::test]
    async fn test_eviction_of_least_recently_used() {
        let manager = SessionManager::with_max_sessions(2);
        manager.get_or_create("a").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.get_or_create("b").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.get("a").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.get_or_create("c").await;

        assert_eq!(manager.count().await, 2);
        assert!(manager.get("a").await.is_some());
        assert!(manager.get("b").await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_skips_busy_sessions() {
        let manager = SessionManager::with_max_sessions(2);
        let busy = manager.get_or_create("a").await;
        let guard = busy.lock().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.get_or_create("b").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.get_or_create("c").await;

        assert!(manager.get("b").await.is_none());
        assert!(manager.get("c").await.is_some());
        drop(guard);
        assert!(Arc::ptr_eq(&manager.get("a").await.unwrap(), &busy));

        let held_c = manager.get("c").await.unwrap();
        manager.get_or_create("d").await;
        assert_eq!(manager.count().await, 3);
        drop(held_c);
    }

    #[tokio::test]
    async fn test_reset_and_delete() {
        let manager = SessionManager::new();
        let session = manager.get_or_create("s").await;
        session.lock().await.push(Turn::user("q"));

        assert!(manager.reset("s").await);
        assert!(session.lock().await.is_empty());
        assert!(!manager.reset("missing").await);

        assert!(manager.delete("s").await);
        assert!(!manager.delete("s").await);
    }
}
