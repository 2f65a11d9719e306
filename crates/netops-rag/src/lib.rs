//! netops-rag: Retrieval over internal documentation
//!
//! This crate provides:
//! - Loading `.txt`/`.md` documents from a directory
//! - Fixed-window chunking with overlap
//! - A lexical (BM25) index and an embedding index behind one [`Retriever`] trait
//! - [`KnowledgeBase`], the atomically swappable index shared by sessions

pub mod chunker;
pub mod document;
pub mod embedding;
pub mod knowledge;
pub mod lexical;
pub mod retriever;

pub use chunker::{Chunk, Chunker};
pub use document::{load_documents, Document};
pub use embedding::{Embedder, OpenAiEmbedder, VectorIndex};
pub use knowledge::{IndexBackend, IndexReport, KnowledgeBase};
pub use lexical::LexicalIndex;
pub use retriever::{Passage, Retriever};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::knowledge::{IndexBackend, KnowledgeBase};
    pub use super::retriever::{Passage, Retriever};
}
