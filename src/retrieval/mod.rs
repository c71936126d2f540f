//! Retrieval over the embedded corpus
//!
//! The store and the language model are collaborators behind async traits;
//! [`InMemoryVectorStore`] is the only store shipped with the crate.

mod chain;
mod memory;
mod memory_store;

pub use chain::{ChainAnswer, ConversationalRetrievalChain};
pub use memory::SummaryMemory;
pub use memory_store::InMemoryVectorStore;

use crate::types::{RetrievedChunk, TextChunk};
use anyhow::Result;

/// Trait for vector store operations
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Store chunks with their embeddings, returning the number stored
    async fn add_chunks(&self, chunks: Vec<TextChunk>, embeddings: Vec<Vec<f32>>)
    -> Result<usize>;

    /// Top `k` chunks by cosine similarity
    async fn similarity_search(&self, query: Vec<f32>, k: usize) -> Result<Vec<RetrievedChunk>>;

    /// `k` chunks picked from the `fetch_k` most similar by maximal marginal relevance
    async fn mmr_search(
        &self,
        query: Vec<f32>,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Number of stored chunks
    async fn len(&self) -> Result<usize>;

    /// Remove every stored chunk
    async fn clear(&self) -> Result<()>;
}

/// Text-in, text-out language model
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
