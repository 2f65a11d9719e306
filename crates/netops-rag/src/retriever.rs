//! Retriever abstraction

use async_trait::async_trait;
use netops_core::Result;
use serde::{Deserialize, Serialize};

/// A ranked piece of a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub source: String,
    pub text: String,
    pub score: f32,
}

/// Query in, ranked passages out
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Short backend name for logs and reports
    fn name(&self) -> &str;

    /// Number of indexed chunks
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// At most `limit` passages, best first; empty when nothing matches
    async fn query(&self, text: &str, limit: usize) -> Result<Vec<Passage>>;
}
