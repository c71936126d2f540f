/// Integration tests for the compile → index → ask pipeline
use anyhow::Result;
use code_change_corpus::config::Config;
use code_change_corpus::embedding::EmbeddingProvider;
use code_change_corpus::pipeline::CorpusPipeline;
use code_change_corpus::retrieval::{InMemoryVectorStore, LanguageModel, VectorStore};
use code_change_corpus::types::{CommitChange, CommitRecord, FileChange};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Bag-of-words embedding: each word is hashed into one of 64 buckets
struct HashingProvider {
    calls: AtomicUsize,
}

impl EmbeddingProvider for HashingProvider {
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 64];
                for word in text.split_whitespace() {
                    let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
                    if word.is_empty() {
                        continue;
                    }
                    let digest = Sha256::digest(word.as_bytes());
                    vector[digest[0] as usize % 64] += 1.0;
                }
                vector
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        64
    }

    fn model_name(&self) -> &str {
        "hashing-64"
    }
}

struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "no reply".to_string()))
    }
}

fn records() -> Vec<CommitRecord> {
    vec![CommitRecord::new(
        "9f2c",
        vec![FileChange {
            file_path: "src/tokenizer.rs".to_string(),
            old_file_path: None,
            change_type: "Modified".to_string(),
            commit_message: "Tokenizer handles unicode escapes".to_string(),
            old_lines: vec![CommitChange::new(12, "fn escape(c: char)")],
            new_lines: vec![CommitChange::new(12, "fn escape(c: char, unicode: bool)")],
        }],
    )]
}

fn setup(temp_dir: &TempDir) -> Result<(Config, Arc<HashingProvider>)> {
    let project = temp_dir.path().join("project");
    fs::create_dir_all(&project)?;
    fs::write(
        project.join("README.md"),
        "Deployment uses docker compose.\n\nThe database is postgres with nightly backups.\n",
    )?;

    let mut config = Config::default();
    config.cache.cache_path = temp_dir.path().join("cache");
    config.walker.project_root = project;
    config.chunking.chunk_size = 120;
    config.retrieval.k = 2;

    Ok((
        config,
        Arc::new(HashingProvider {
            calls: AtomicUsize::new(0),
        }),
    ))
}

#[tokio::test]
async fn test_process_answers_from_corpus() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (config, provider) = setup(&temp_dir)?;
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = CorpusPipeline::new(config, provider, store.clone());

    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(
            ["It adds a unicode flag.", "Asked about the tokenizer."]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        prompts: Mutex::new(Vec::new()),
    });
    let chain = pipeline.process(&records(), model.clone()).await?;
    assert!(store.len().await? > 0);

    let answer = chain.ask("tokenizer handles unicode escapes").await?;

    assert_eq!(answer.answer, "It adds a unicode flag.");
    assert!(answer.sources.len() <= 2);
    assert!(
        answer
            .sources
            .iter()
            .any(|s| s.chunk.content.contains("Tokenizer handles unicode escapes"))
    );
    assert_eq!(chain.summary().await, "Asked about the tokenizer.");

    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("Tokenizer handles unicode escapes"));

    Ok(())
}

#[tokio::test]
async fn test_reindexing_reuses_cached_embeddings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (config, provider) = setup(&temp_dir)?;

    let first = CorpusPipeline::new(
        config.clone(),
        provider.clone(),
        Arc::new(InMemoryVectorStore::new()),
    );
    first.compile(&records())?;
    let report = first.index_cache().await?;
    let calls_after_first = provider.calls.load(Ordering::SeqCst);
    assert_eq!(calls_after_first, report.chunks);

    let second = CorpusPipeline::new(config, provider.clone(), Arc::new(InMemoryVectorStore::new()));
    second.compile(&records())?;
    second.index_cache().await?;

    assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);

    Ok(())
}

#[tokio::test]
async fn test_search_finds_project_file_content() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (config, provider) = setup(&temp_dir)?;
    let pipeline = CorpusPipeline::new(config, provider, Arc::new(InMemoryVectorStore::new()));

    pipeline.compile(&records())?;
    pipeline.index_cache().await?;
    let results = pipeline.search("postgres database backups", Some(1)).await?;

    assert_eq!(results.len(), 1);
    assert!(results[0].chunk.content.contains("postgres"));

    Ok(())
}
