//! Embedding index over an OpenAI-compatible `/embeddings` endpoint

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use netops_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::chunker::Chunk;
use crate::retriever::{Passage, Retriever};

/// Texts per embeddings request
const BATCH_SIZE: usize = 64;

/// Embedding requests in flight while building an index
const BUILD_CONCURRENCY: usize = 4;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Text to vector
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;

    /// One vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            debug!(model = %self.model, batch = batch.len(), "Requesting embeddings");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&json!({ "model": self.model, "input": batch }))
                .send()
                .await
                .map_err(|e| Error::upstream(format!("embeddings request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::upstream(format!(
                    "embeddings endpoint returned {}: {}",
                    status, body
                )));
            }

            let mut parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| Error::upstream(format!("invalid embeddings response: {}", e)))?;
            if parsed.data.len() != batch.len() {
                return Err(Error::upstream(format!(
                    "embeddings endpoint returned {} vectors for {} inputs",
                    parsed.data.len(),
                    batch.len()
                )));
            }
            parsed.data.sort_by_key(|d| d.index);
            vectors.extend(parsed.data.into_iter().map(|d| d.embedding));
        }

        Ok(vectors)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// In-memory vector index ranked by cosine similarity
pub struct VectorIndex {
    embedder: std::sync::Arc<dyn Embedder>,
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    pub async fn build(embedder: std::sync::Arc<dyn Embedder>, chunks: Vec<Chunk>) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let client = embedder.as_ref();
        let requests: Vec<_> = texts.chunks(BATCH_SIZE).map(|batch| client.embed(batch)).collect();
        let vectors: Vec<Vec<f32>> = stream::iter(requests)
            .buffered(BUILD_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .flatten()
            .collect();
        if vectors.len() != chunks.len() {
            return Err(Error::upstream("embedding count does not match chunk count"));
        }
        info!(model = embedder.model(), chunks = chunks.len(), "Built embedding index");
        Ok(Self {
            embedder,
            entries: chunks.into_iter().zip(vectors).collect(),
        })
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    fn name(&self) -> &str {
        "embedding"
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<Passage>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(&[text.to_string()]).await?;
        let query = query
            .first()
            .ok_or_else(|| Error::upstream("embeddings endpoint returned no vector"))?;

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (_, vector))| (cosine_similarity(query, vector), idx))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, idx)| {
                let chunk = &self.entries[idx].0;
                Passage {
                    source: chunk.source.clone(),
                    text: chunk.text.clone(),
                    score,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Bag-of-letters embedder, deterministic and offline
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        fn model(&self) -> &str {
            "letters"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 26];
                    for c in t.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                        v[(c - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    fn chunk(source: &str, text: &str) -> Chunk {
        Chunk {
            source: source.to_string(),
            index: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_vector_index_ranks_by_similarity() {
        let index = VectorIndex::build(
            Arc::new(LetterEmbedder),
            vec![chunk("x.txt", "xxxx"), chunk("ab.txt", "abab abab")],
        )
        .await
        .unwrap();

        let passages = index.query("abba", 1).await.unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].source, "ab.txt");
        assert_eq!(index.len(), 2);
    }
}
