//! BM25 lexical index
//!
//! Tokens are lowercased runs of alphanumerics plus `.`, `-`, `_` and `/`, so
//! addresses (`192.168.1.10`), hostnames (`vpn-gw`) and port names (`Gi0/1`)
//! survive as single terms.

use async_trait::async_trait;
use netops_core::Result;
use std::collections::HashMap;

use crate::chunker::Chunk;
use crate::retriever::{Passage, Retriever};

const K1: f32 = 1.2;
const B: f32 = 0.75;

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '/')))
        .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '-' | '_' | '/')))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

struct IndexedChunk {
    chunk: Chunk,
    term_freq: HashMap<String, u32>,
    length: usize,
}

pub struct LexicalIndex {
    chunks: Vec<IndexedChunk>,
    doc_freq: HashMap<String, u32>,
    avg_len: f32,
}

impl LexicalIndex {
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut indexed = Vec::with_capacity(chunks.len());
        let mut total_len = 0usize;

        for chunk in chunks {
            let tokens = tokenize(&chunk.text);
            let mut term_freq: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_default() += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_default() += 1;
            }
            total_len += tokens.len();
            indexed.push(IndexedChunk {
                chunk,
                term_freq,
                length: tokens.len(),
            });
        }

        let avg_len = if indexed.is_empty() {
            0.0
        } else {
            total_len as f32 / indexed.len() as f32
        };

        Self {
            chunks: indexed,
            doc_freq,
            avg_len,
        }
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.chunks.len() as f32;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, chunk: &IndexedChunk, terms: &[String]) -> f32 {
        let norm = if self.avg_len > 0.0 {
            chunk.length as f32 / self.avg_len
        } else {
            0.0
        };
        terms
            .iter()
            .filter_map(|term| chunk.term_freq.get(term).map(|tf| (term, *tf as f32)))
            .map(|(term, tf)| self.idf(term) * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * norm)))
            .sum()
    }

    /// Synchronous ranking used by the async trait method
    pub fn rank(&self, text: &str, limit: usize) -> Vec<Passage> {
        let mut terms = tokenize(text);
        terms.sort();
        terms.dedup();

        let mut scored: Vec<(f32, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| (self.score(chunk, &terms), idx))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        // Ties keep document order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        scored
            .into_iter()
            .take(limit)
            .map(|(score, idx)| {
                let chunk = &self.chunks[idx].chunk;
                Passage {
                    source: chunk.source.clone(),
                    text: chunk.text.clone(),
                    score,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for LexicalIndex {
    fn name(&self) -> &str {
        "lexical"
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }

    async fn query(&self, text: &str, limit: usize) -> Result<Vec<Passage>> {
        Ok(self.rank(text, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, text: &str) -> Chunk {
        Chunk {
            source: source.to_string(),
            index: 0,
            text: text.to_string(),
        }
    }

    fn index() -> LexicalIndex {
        LexicalIndex::build(vec![
            chunk("bi.md", "The BI server bi-srv01 has address 10.20.0.5."),
            chunk("switches.md", "asw1 is the access switch on floor one, IP 192.168.1.10."),
            chunk("office.txt", "How to get access to the office: ask the front desk."),
        ])
    }

    #[test]
    fn test_tokenize_keeps_network_identifiers() {
        assert_eq!(
            tokenize("Ping 192.168.1.10, then check Gi0/1 on vpn-gw."),
            vec!["ping", "192.168.1.10", "then", "check", "gi0/1", "on", "vpn-gw"]
        );
    }

    #[test]
    fn test_rank_best_match_first() {
        let passages = index().rank("asw1 access switch", 2);
        assert_eq!(passages[0].source, "switches.md");
        assert!(passages.len() <= 2);
        assert!(passages.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_by_address() {
        let passages = index().rank("10.20.0.5", 1);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].source, "bi.md");
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(index().rank("kubernetes", 3).is_empty());
        assert!(LexicalIndex::build(Vec::new()).rank("asw1", 3).is_empty());
    }
}
