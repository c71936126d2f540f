use super::VectorStore;
use crate::error::RetrievalError;
use crate::types::{RetrievedChunk, TextChunk};
use anyhow::Result;
use tokio::sync::RwLock;

struct StoredChunk {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// Vector store holding every chunk in memory with exhaustive cosine search
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn check_query_dimension(entries: &[StoredChunk], query: &[f32]) -> Result<(), RetrievalError> {
    match entries.first() {
        Some(first) if first.embedding.len() != query.len() => Err(RetrievalError::Store(format!(
            "query dimension {} does not match stored dimension {}",
            query.len(),
            first.embedding.len()
        ))),
        _ => Ok(()),
    }
}

/// Indices of the `n` entries most similar to `query`, best first, with scores
fn top_matches(entries: &[StoredChunk], query: &[f32], n: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, cosine_similarity(query, &e.embedding)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(n);
    scored
}

/// Greedy maximal marginal relevance over `candidates`
///
/// Returns positions into `candidates` in selection order.
fn maximal_marginal_relevance(
    candidates: &[&[f32]],
    query_scores: &[f32],
    k: usize,
    lambda_mult: f32,
) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));

    while selected.len() < k.min(candidates.len()) {
        let mut best: Option<(usize, f32)> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            if selected.contains(&i) {
                continue;
            }
            let redundancy = selected
                .iter()
                .map(|&j| cosine_similarity(candidate, candidates[j]))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
            let score = lambda_mult * query_scores[i] - (1.0 - lambda_mult) * redundancy;

            if best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, _)) => selected.push(i),
            None => break,
        }
    }

    selected
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_chunks(
        &self,
        chunks: Vec<TextChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(RetrievalError::LengthMismatch {
                embeddings: embeddings.len(),
                chunks: chunks.len(),
            }
            .into());
        }

        let mut entries = self.entries.write().await;
        if let (Some(first), Some(incoming)) = (entries.first(), embeddings.first())
            && first.embedding.len() != incoming.len()
        {
            return Err(RetrievalError::Store(format!(
                "embedding dimension {} does not match stored dimension {}",
                incoming.len(),
                first.embedding.len()
            ))
            .into());
        }

        let count = chunks.len();
        entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredChunk { chunk, embedding }),
        );
        tracing::debug!("Stored {} chunks ({} total)", count, entries.len());
        Ok(count)
    }

    async fn similarity_search(&self, query: Vec<f32>, k: usize) -> Result<Vec<RetrievedChunk>> {
        let entries = self.entries.read().await;
        check_query_dimension(&entries, &query)?;
        Ok(top_matches(&entries, &query, k)
            .into_iter()
            .map(|(i, score)| RetrievedChunk {
                chunk: entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    async fn mmr_search(
        &self,
        query: Vec<f32>,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        let entries = self.entries.read().await;
        check_query_dimension(&entries, &query)?;
        let candidates = top_matches(&entries, &query, fetch_k.max(k));

        let vectors: Vec<&[f32]> = candidates
            .iter()
            .map(|&(i, _)| entries[i].embedding.as_slice())
            .collect();
        let scores: Vec<f32> = candidates.iter().map(|&(_, s)| s).collect();

        let picked = maximal_marginal_relevance(&vectors, &scores, k, lambda_mult);
        tracing::debug!(
            "MMR picked {} of {} candidates (lambda {})",
            picked.len(),
            candidates.len(),
            lambda_mult
        );

        Ok(picked
            .into_iter()
            .map(|p| {
                let (i, score) = candidates[p];
                RetrievedChunk {
                    chunk: entries[i].chunk.clone(),
                    score,
                }
            })
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
