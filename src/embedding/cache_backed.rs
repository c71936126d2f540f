use super::EmbeddingProvider;
use crate::error::EmbeddingError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Embedding provider that stores document vectors as files in a directory
///
/// Each vector lives in its own JSON file named after the model namespace and
/// the SHA-256 of the text, so unchanged chunks are never embedded twice.
/// Queries bypass the store.
pub struct CacheBackedEmbeddings {
    inner: Arc<dyn EmbeddingProvider>,
    store_dir: PathBuf,
    namespace: String,
}

impl CacheBackedEmbeddings {
    /// Wrap `inner`, namespacing keys by its model name
    pub fn new(inner: Arc<dyn EmbeddingProvider>, store_dir: impl Into<PathBuf>) -> Self {
        let namespace = inner.model_name().to_string();
        Self::with_namespace(inner, store_dir, namespace)
    }

    pub fn with_namespace(
        inner: Arc<dyn EmbeddingProvider>,
        store_dir: impl Into<PathBuf>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            store_dir: store_dir.into(),
            namespace: namespace.into(),
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// File name holding the vector for `text`
    pub fn key_for(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let prefix: String = self
            .namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{:x}", prefix, hasher.finalize())
    }

    fn read_cached(&self, key: &str) -> Option<Vec<f32>> {
        let path = self.store_dir.join(key);
        let bytes = fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!("Ignoring unreadable embedding at {:?}: {}", path, e);
                None
            }
        }
    }

    fn write_cached(&self, key: &str, vector: &[f32]) -> Result<(), EmbeddingError> {
        let path = self.store_dir.join(key);
        let encoded = serde_json::to_vec(vector).map_err(|e| EmbeddingError::StoreFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, encoded).map_err(|e| EmbeddingError::StoreFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl EmbeddingProvider for CacheBackedEmbeddings {
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        fs::create_dir_all(&self.store_dir).map_err(|e| EmbeddingError::StoreFailed {
            path: self.store_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let keys: Vec<String> = texts.iter().map(|t| self.key_for(t)).collect();
        let mut vectors: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.read_cached(k)).collect();

        let missing: Vec<usize> = vectors
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(
            "Embedding cache: {} hits, {} misses",
            texts.len() - missing.len(),
            missing.len()
        );

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let computed = self
                .inner
                .embed_batch(batch)
                .context("Failed to embed cache misses")?;

            if computed.len() != missing.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: missing.len(),
                    actual: computed.len(),
                }
                .into());
            }

            for (&i, vector) in missing.iter().zip(computed) {
                self.write_cached(&keys[i], &vector)?;
                vectors[i] = Some(vector);
            }
        }

        vectors
            .into_iter()
            .map(|v| v.ok_or_else(|| anyhow::anyhow!("Embedding missing after cache fill")))
            .collect()
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed_query(text)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
