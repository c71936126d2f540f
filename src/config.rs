/// Configuration system for code-change-corpus
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
///
/// Working-directory defaults are resolved once, when the configuration is
/// built; the rest of the crate only ever sees explicit paths.
use crate::error::{ConfigError, CorpusError};
use crate::paths::{self, CorpusPaths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Corpus cache location
    #[serde(default)]
    pub cache: CacheConfig,

    /// Project walk settings
    #[serde(default)]
    pub walker: WalkerConfig,

    /// Downstream chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding model settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Corpus cache location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Cache file name inside the cache directory
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

/// Project walk settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Directory whose files are appended to the corpus
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Ignore-rules file name relative to the project root; `None` disables rules
    #[serde(default = "default_ignore_file")]
    pub ignore_file: Option<String>,

    /// Name of the temporary walk output written inside the cache directory
    #[serde(default = "default_walk_output_file")]
    pub walk_output_file: String,
}

/// Text chunking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default)]
    pub chunk_overlap: usize,
}

/// Embedding model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2", "BAAI/bge-small-en-v1.5")
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks returned per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Candidates considered before diversity re-ranking
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Relevance/diversity trade-off (1.0 = pure relevance)
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,
}

// Default value functions
fn default_cache_path() -> PathBuf {
    CorpusPaths::default_cache_dir()
}

fn default_cache_file() -> String {
    paths::CACHE_FILE_NAME.to_string()
}

fn default_project_root() -> PathBuf {
    CorpusPaths::working_dir()
}

fn default_ignore_file() -> Option<String> {
    Some(paths::IGNORE_FILE_NAME.to_string())
}

fn default_walk_output_file() -> String {
    paths::WALK_OUTPUT_FILE_NAME.to_string()
}

fn default_chunk_size() -> usize {
    500
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_k() -> usize {
    8
}

fn default_fetch_k() -> usize {
    20
}

fn default_lambda_mult() -> f32 {
    0.5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            cache_file: default_cache_file(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            ignore_file: default_ignore_file(),
            walk_output_file: default_walk_output_file(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: 0,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, CorpusError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location or fall back to defaults
    pub fn load_or_default() -> Result<Self, CorpusError> {
        let config_path = CorpusPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), CorpusError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.cache.cache_file.trim().is_empty() {
            return Err(invalid("cache.cache_file", "must not be empty".to_string()));
        }

        if self.walker.walk_output_file.trim().is_empty() {
            return Err(invalid(
                "walker.walk_output_file",
                "must not be empty".to_string(),
            ));
        }

        if self.walker.walk_output_file == self.cache.cache_file {
            return Err(invalid(
                "walker.walk_output_file",
                "must differ from cache.cache_file".to_string(),
            ));
        }

        if self.chunking.chunk_size == 0 {
            return Err(invalid(
                "chunking.chunk_size",
                "must be greater than 0".to_string(),
            ));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(invalid(
                "chunking.chunk_overlap",
                format!(
                    "must be smaller than chunk_size ({}), got {}",
                    self.chunking.chunk_size, self.chunking.chunk_overlap
                ),
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(invalid(
                "embedding.batch_size",
                "must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.k == 0 {
            return Err(invalid("retrieval.k", "must be greater than 0".to_string()));
        }

        if self.retrieval.fetch_k < self.retrieval.k {
            return Err(invalid(
                "retrieval.fetch_k",
                format!(
                    "must be at least k ({}), got {}",
                    self.retrieval.k, self.retrieval.fetch_k
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.lambda_mult) {
            return Err(invalid(
                "retrieval.lambda_mult",
                format!(
                    "must be between 0.0 and 1.0, got {}",
                    self.retrieval.lambda_mult
                ),
            ));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CORPUS_CACHE_PATH") {
            self.cache.cache_path = PathBuf::from(path);
        }

        if let Ok(file) = std::env::var("CORPUS_CACHE_FILE") {
            self.cache.cache_file = file;
        }

        if let Ok(root) = std::env::var("CORPUS_PROJECT_ROOT") {
            self.walker.project_root = PathBuf::from(root);
        }

        // An empty value disables ignore rules
        if let Ok(ignore_file) = std::env::var("CORPUS_IGNORE_FILE") {
            self.walker.ignore_file = if ignore_file.is_empty() {
                None
            } else {
                Some(ignore_file)
            };
        }

        if let Ok(chunk_size) = std::env::var("CORPUS_CHUNK_SIZE")
            && let Ok(size) = chunk_size.parse()
        {
            self.chunking.chunk_size = size;
        }

        if let Ok(chunk_overlap) = std::env::var("CORPUS_CHUNK_OVERLAP")
            && let Ok(overlap) = chunk_overlap.parse()
        {
            self.chunking.chunk_overlap = overlap;
        }

        if let Ok(model) = std::env::var("CORPUS_MODEL") {
            self.embedding.model_name = model;
        }
    }

    /// Create a new Config with defaults, file values and environment overrides
    pub fn new() -> Result<Self, CorpusError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: String) -> CorpusError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    }
    .into()
}
