//! Corpus compilation
//!
//! Sequences the producers into the cache: change blocks first (overwriting
//! whatever the cache held), then the project walk appended after them. The
//! order is fixed so project content never interleaves with change content.

use crate::cache::CorpusCache;
use crate::config::Config;
use crate::error::Result;
use crate::formatter::format_changes;
use crate::types::{CommitRecord, CorpusDocument, SkippedFile};
use crate::walker::ProjectWalker;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Inputs of a compilation besides the change records
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Directory walked for project files
    pub project_root: PathBuf,
    /// Ignore-rules file name relative to the project root
    pub ignore_file: Option<String>,
    /// Temporary walk output name, created inside the cache directory
    pub walk_output_file: String,
}

impl CompilerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            project_root: config.walker.project_root.clone(),
            ignore_file: config.walker.ignore_file.clone(),
            walk_output_file: config.walker.walk_output_file.clone(),
        }
    }
}

/// Summary of a finished compilation
#[derive(Debug)]
pub struct CompileReport {
    pub document: CorpusDocument,
    pub change_blocks: usize,
    pub project_files: usize,
    /// Project files dropped because they were not valid UTF-8
    pub skipped: Vec<SkippedFile>,
    pub duration_ms: u64,
}

/// Builds the corpus cache from change records and a project tree
///
/// Not safe to run concurrently against one cache location: the overwrite and
/// append steps are separate writes. Keep one compiler per cache path.
pub struct CorpusCompiler {
    config: CompilerConfig,
    cache: CorpusCache,
}

impl CorpusCompiler {
    pub fn new(config: CompilerConfig, cache: CorpusCache) -> Self {
        Self { config, cache }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CompilerConfig::from_config(config),
            CorpusCache::from_config(&config.cache),
        )
    }

    pub fn cache(&self) -> &CorpusCache {
        &self.cache
    }

    /// Compile the corpus and return a handle to the cache file
    pub fn compile(&self, records: &[CommitRecord]) -> Result<CorpusDocument> {
        Ok(self.compile_with_report(records)?.document)
    }

    /// Compile the corpus, reporting what went into it
    ///
    /// Any I/O failure aborts the compilation and may leave the cache partly
    /// written. Undecodable project files are skipped.
    pub fn compile_with_report(&self, records: &[CommitRecord]) -> Result<CompileReport> {
        let start = Instant::now();

        let blocks = format_changes(records);
        self.cache.overwrite(&blocks)?;
        tracing::info!(
            "Cached {} change blocks from {} commits",
            blocks.len(),
            records.len()
        );

        let walk_output = self.cache.dir().join(&self.config.walk_output_file);
        let walker = ProjectWalker::new(&self.config.project_root)
            .with_ignore_file(self.config.ignore_file.clone())
            .with_excluded_paths(vec![self.cache.dir().to_path_buf()]);
        let walk = walker.write_to(&walk_output)?;

        self.cache.append_from(&walk_output)?;
        fs::remove_file(&walk_output)?;

        let document = self.cache.load()?;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Compiled corpus at {:?}: {} change blocks, {} project files, {} bytes in {}ms",
            document.path,
            blocks.len(),
            walk.written,
            document.content.len(),
            duration_ms
        );

        Ok(CompileReport {
            document,
            change_blocks: blocks.len(),
            project_files: walk.written,
            skipped: walk.skipped,
            duration_ms,
        })
    }
}
