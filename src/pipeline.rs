//! End-to-end corpus pipeline
//!
//! compile → load → split → embed (file-cached) → index → conversational chain

use crate::compiler::{CompileReport, CorpusCompiler};
use crate::config::Config;
use crate::embedding::{CacheBackedEmbeddings, EmbeddingProvider};
use crate::error::{CorpusError, Result, RetrievalError};
use crate::retrieval::{ConversationalRetrievalChain, LanguageModel, VectorStore};
use crate::splitter::TextSplitter;
use crate::types::{CommitRecord, CorpusDocument, RetrievedChunk};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of indexing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub chunks: usize,
    pub embeddings: usize,
    pub duration_ms: u64,
}

/// Owns the compiler and the injected downstream collaborators
pub struct CorpusPipeline {
    config: Config,
    compiler: CorpusCompiler,
    splitter: TextSplitter,
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl CorpusPipeline {
    /// Build a pipeline; `provider` is wrapped so vectors are cached in the cache directory
    pub fn new(
        config: Config,
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let compiler = CorpusCompiler::from_config(&config);
        let splitter = TextSplitter::from_config(&config.chunking);
        let embeddings: Arc<dyn EmbeddingProvider> = Arc::new(CacheBackedEmbeddings::new(
            provider,
            config.cache.cache_path.clone(),
        ));

        Self {
            config,
            compiler,
            splitter,
            embeddings,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compiler(&self) -> &CorpusCompiler {
        &self.compiler
    }

    /// Rebuild the cache file from `records` and the project tree
    pub fn compile(&self, records: &[CommitRecord]) -> Result<CompileReport> {
        self.compiler.compile_with_report(records)
    }

    /// Load the current cache file
    pub fn load_document(&self) -> Result<CorpusDocument> {
        Ok(self.compiler.cache().load()?)
    }

    /// Split, embed and store `document`
    pub async fn index(&self, document: &CorpusDocument) -> Result<IndexReport> {
        let start = Instant::now();
        let chunks = self.splitter.split_document(document);
        if chunks.is_empty() {
            tracing::warn!("Document {:?} produced no chunks", document.path);
            return Ok(IndexReport {
                chunks: 0,
                embeddings: 0,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let batch_size = self.config.embedding.batch_size.max(1);
        let total_batches = chunks.len().div_ceil(batch_size);
        let mut all_embeddings = Vec::with_capacity(chunks.len());

        for (batch_idx, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let provider = self.embeddings.clone();
            let embeddings = tokio::task::spawn_blocking(move || provider.embed_batch(texts))
                .await
                .map_err(|e| CorpusError::other(format!("Embedding task panicked: {}", e)))??;
            all_embeddings.extend(embeddings);

            tracing::debug!("Embedded batch {}/{}", batch_idx + 1, total_batches);
        }

        let chunk_count = chunks.len();
        let embedding_count = all_embeddings.len();
        let stored = self
            .store
            .add_chunks(chunks, all_embeddings)
            .await
            .map_err(|e| RetrievalError::Store(format!("{:#}", e)))?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Indexed {} chunks from {:?} in {}ms",
            stored,
            document.path,
            duration_ms
        );

        Ok(IndexReport {
            chunks: chunk_count,
            embeddings: embedding_count,
            duration_ms,
        })
    }

    /// Index the cache file as it currently stands
    pub async fn index_cache(&self) -> Result<IndexReport> {
        let document = self.load_document()?;
        self.index(&document).await
    }

    /// MMR search over indexed chunks, overriding `k` when given
    pub async fn search(&self, query: &str, k: Option<usize>) -> Result<Vec<RetrievedChunk>> {
        let provider = self.embeddings.clone();
        let text = query.to_string();
        let query_vector = tokio::task::spawn_blocking(move || provider.embed_query(&text))
            .await
            .map_err(|e| CorpusError::other(format!("Embedding task panicked: {}", e)))??;

        let retrieval = &self.config.retrieval;
        let k = k.unwrap_or(retrieval.k);
        self.store
            .mmr_search(query_vector, k, retrieval.fetch_k.max(k), retrieval.lambda_mult)
            .await
            .map_err(|e| RetrievalError::Store(format!("{:#}", e)).into())
    }

    /// Conversational chain over whatever has been indexed
    pub fn chain(&self, llm: Arc<dyn LanguageModel>) -> ConversationalRetrievalChain {
        ConversationalRetrievalChain::new(
            self.store.clone(),
            self.embeddings.clone(),
            llm,
            self.config.retrieval.clone(),
        )
    }

    /// Compile, index and return a chain ready for questions
    pub async fn process(
        &self,
        records: &[CommitRecord],
        llm: Arc<dyn LanguageModel>,
    ) -> Result<ConversationalRetrievalChain> {
        let report = self.compile(records)?;
        self.index(&report.document).await?;
        Ok(self.chain(llm))
    }
}
