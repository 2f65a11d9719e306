//! Shared knowledge base
//!
//! Holds the currently published retriever. A rebuild happens entirely
//! outside the lock and is published with a single pointer swap; lookups in
//! flight keep the `Arc` they started with. A failed rebuild leaves the
//! previous index in place.

use netops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::chunker::Chunker;
use crate::document::load_documents;
use crate::embedding::{Embedder, VectorIndex};
use crate::lexical::LexicalIndex;
use crate::retriever::{Passage, Retriever};

/// How a rebuilt index is constructed
#[derive(Clone, Default)]
pub enum IndexBackend {
    #[default]
    Lexical,
    Embedding(Arc<dyn Embedder>),
}

impl IndexBackend {
    pub fn name(&self) -> &'static str {
        match self {
            IndexBackend::Lexical => "lexical",
            IndexBackend::Embedding(_) => "embedding",
        }
    }
}

/// Summary of a completed indexing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub backend: String,
    pub elapsed_ms: u64,
}

pub struct KnowledgeBase {
    current: RwLock<Option<Arc<dyn Retriever>>>,
    backend: IndexBackend,
    chunker: Chunker,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(IndexBackend::Lexical)
    }
}

impl KnowledgeBase {
    /// An empty knowledge base; lookups fail `Unavailable` until an index is published
    pub fn new(backend: IndexBackend) -> Self {
        Self {
            current: RwLock::new(None),
            backend,
            chunker: Chunker::default(),
        }
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Replace the published retriever
    pub async fn publish(&self, retriever: Arc<dyn Retriever>) {
        let chunks = retriever.len();
        let backend = retriever.name().to_string();
        *self.current.write().await = Some(retriever);
        info!(chunks, backend = %backend, "Published knowledge index");
    }

    pub async fn current(&self) -> Option<Arc<dyn Retriever>> {
        self.current.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Top `limit` passages for `query`.
    ///
    /// `Unavailable` when no index is loaded, `NotFound` when nothing matches.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Passage>> {
        let retriever = self
            .current()
            .await
            .ok_or_else(|| Error::unavailable("Knowledge base is not loaded."))?;

        let passages = retriever.query(query, limit).await?;
        if passages.is_empty() {
            return Err(Error::not_found("Nothing found in the documentation."));
        }
        Ok(passages)
    }

    /// Load, chunk and index `dir`, then publish the result
    pub async fn index_directory(&self, dir: &Path) -> Result<IndexReport> {
        let start = Instant::now();
        let result = self.build(dir).await;
        match result {
            Ok((retriever, documents, chunks)) => {
                self.publish(retriever).await;
                Ok(IndexReport {
                    documents,
                    chunks,
                    backend: self.backend.name().to_string(),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Indexing failed, keeping previous index");
                Err(e)
            }
        }
    }

    async fn build(&self, dir: &Path) -> Result<(Arc<dyn Retriever>, usize, usize)> {
        let documents = load_documents(dir).await?;
        if documents.is_empty() {
            return Err(Error::not_found(format!(
                "{} is empty. Place .txt or .md files there.",
                dir.display()
            )));
        }

        let chunks = self.chunker.split_all(&documents);
        let chunk_count = chunks.len();
        let retriever: Arc<dyn Retriever> = match &self.backend {
            IndexBackend::Lexical => Arc::new(LexicalIndex::build(chunks)),
            IndexBackend::Embedding(embedder) => {
                Arc::new(VectorIndex::build(embedder.clone(), chunks).await?)
            }
        };
        Ok((retriever, documents.len(), chunk_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_core::ErrorKind;

    #[tokio::test]
    async fn test_search_before_index_is_unavailable() {
        let kb = KnowledgeBase::default();
        assert!(!kb.is_loaded().await);
        let err = kb.search("asw1", 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.to_string(), "Unavailable: Knowledge base is not loaded.");
    }

    #[tokio::test]
    async fn test_index_and_search() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bi.md"), "BI server is bi-srv01 at 10.20.0.5").unwrap();

        let kb = KnowledgeBase::default();
        let report = kb.index_directory(dir.path()).await.unwrap();
        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, 1);
        assert_eq!(report.backend, "lexical");

        let passages = kb.search("BI", 1).await.unwrap();
        assert_eq!(passages[0].source, "bi.md");

        let err = kb.search("kubernetes", 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_failed_reindex_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "asw1 access switch").unwrap();
        let kb = KnowledgeBase::default();
        kb.index_directory(dir.path()).await.unwrap();

        let empty = tempfile::tempdir().unwrap();
        assert!(kb.index_directory(empty.path()).await.is_err());
        assert!(kb.search("asw1", 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_in_flight_lookup_keeps_old_index() {
        let kb = KnowledgeBase::default();
        let old = Arc::new(LexicalIndex::build(Vec::new()));
        kb.publish(old.clone()).await;
        let held = kb.current().await.unwrap();

        kb.publish(Arc::new(LexicalIndex::build(Vec::new()))).await;
        assert_eq!(Arc::strong_count(&old), 2);
        drop(held);
        assert_eq!(Arc::strong_count(&old), 1);
    }
}
