mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use code_change_corpus::cache::CorpusCache;
use code_change_corpus::compiler::CorpusCompiler;
use code_change_corpus::config::Config;
use code_change_corpus::embedding::FastEmbedManager;
use code_change_corpus::git::{ChangeExtractor, ExtractOptions};
use code_change_corpus::pipeline::CorpusPipeline;
use code_change_corpus::retrieval::InMemoryVectorStore;
use code_change_corpus::types::CommitRecord;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(&args)?;

    match args.command {
        Command::Compile {
            repo,
            commits_json,
            max_commits,
            branch,
            project_root,
            ignore_file,
            no_ignore,
        } => {
            if let Some(root) = project_root {
                config.walker.project_root = root;
            }
            if no_ignore {
                config.walker.ignore_file = None;
            } else if let Some(name) = ignore_file {
                config.walker.ignore_file = Some(name);
            }

            let records = match commits_json {
                Some(path) => read_records(&path)?,
                None => {
                    let repo = repo.unwrap_or_else(|| config.walker.project_root.clone());
                    let extractor = ChangeExtractor::discover(&repo)?;
                    extractor.extract(&ExtractOptions {
                        branch,
                        max_commits,
                    })?
                }
            };

            let compiler = CorpusCompiler::from_config(&config);
            let report = compiler.compile_with_report(&records)?;

            println!("Corpus written to {}", report.document.path.display());
            println!(
                "  {} change blocks, {} project files, {} bytes ({}ms)",
                report.change_blocks,
                report.project_files,
                report.document.content.len(),
                report.duration_ms
            );
            for skipped in &report.skipped {
                println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
            }
        }
        Command::Search { query, k } => {
            let provider = FastEmbedManager::from_name(
                &config.embedding.model_name,
                config.embedding.batch_size,
            )?;
            let pipeline = CorpusPipeline::new(
                config,
                Arc::new(provider),
                Arc::new(InMemoryVectorStore::new()),
            );

            pipeline.index_cache().await?;
            let results = pipeline.search(&query, k).await?;

            for (rank, result) in results.iter().enumerate() {
                println!(
                    "{}. [{:.3}] chunk {} @ {}",
                    rank + 1,
                    result.score,
                    result.chunk.index,
                    result.chunk.start_offset
                );
                println!("{}\n", result.chunk.content);
            }
        }
        Command::Clean => {
            let cache = CorpusCache::from_config(&config.cache);
            let report = cache.delete()?;
            println!(
                "Removed {} files from {}",
                report.removed.len(),
                cache.dir().display()
            );
            for failure in &report.failures {
                println!("  failed {}: {}", failure.path.display(), failure.reason);
            }
        }
    }

    Ok(())
}

/// Defaults < config file < environment < command-line flags
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::new()?,
    };

    if let Some(path) = &args.cache_path {
        config.cache.cache_path = path.clone();
    }
    if let Some(file) = &args.cache_file {
        config.cache.cache_file = file.clone();
    }

    config.validate()?;
    Ok(config)
}

fn read_records(path: &Path) -> Result<Vec<CommitRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read change records from {}", path.display()))?;
    let records: Vec<CommitRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Malformed change records in {}", path.display()))?;
    tracing::info!("Loaded {} change records from {}", records.len(), path.display());
    Ok(records)
}
