mod cache_backed;
mod fastembed_manager;

pub use cache_backed::CacheBackedEmbeddings;
pub use fastembed_manager::FastEmbedManager;

use anyhow::Result;

/// Trait for embedding generation
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of text
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding of a single query
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(vec![text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Provider returned no embedding for query"))
    }

    /// Get the dimension of the embeddings
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}
