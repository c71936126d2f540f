/// Centralized error types for code-change-corpus using thiserror
///
/// Fatal failures propagate through [`CorpusError`]. Non-fatal conditions
/// (undecodable files during a walk, per-file teardown failures) are collected
/// into reports instead and never surface here.
use thiserror::Error;

/// Main error type for corpus compilation and retrieval
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while walking a project tree
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Root directory does not exist: {0}")]
    RootNotFound(String),

    #[error("Root path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to read directory entry: {0}")]
    EntryFailed(String),

    #[error("Failed to read file '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to build ignore matcher from '{file}': {reason}")]
    IgnoreRules { file: String, reason: String },

    #[error("Failed to write walk output '{path}': {reason}")]
    OutputFailed { path: String, reason: String },
}

/// Errors related to the corpus cache store
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to create cache directory '{path}': {reason}")]
    DirectoryCreationFailed { path: String, reason: String },

    #[error("Failed to write cache file '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to read '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to encode cache entry: {0}")]
    EncodeFailed(String),

    #[error("Failed to list cache directory '{path}': {reason}")]
    ListFailed { path: String, reason: String },

    #[error("Failed to remove cache directory '{path}': {reason}")]
    DirectoryRemovalFailed { path: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to resolve working directory: {0}")]
    WorkingDirectory(String),
}

/// Errors related to extracting change records from git
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git repository not found at: {0}")]
    RepoNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Failed to iterate commits: {0}")]
    IterFailed(String),

    #[error("Failed to diff commit {commit}: {reason}")]
    DiffFailed { commit: String, reason: String },
}

/// Errors related to embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    InitializationFailed(String),

    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),

    #[error("Embedding store failure at '{path}': {reason}")]
    StoreFailed { path: String, reason: String },

    #[error("Provider returned {actual} embeddings for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },
}

/// Errors raised by the retrieval chain and its collaborators
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Embedding count {embeddings} does not match chunk count {chunks}")]
    LengthMismatch { embeddings: usize, chunks: usize },

    #[error("Question is empty")]
    EmptyQuestion,
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CorpusError>;

impl From<anyhow::Error> for CorpusError {
    fn from(err: anyhow::Error) -> Self {
        CorpusError::Other(format!("{:#}", err))
    }
}

impl CorpusError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        CorpusError::Other(msg.into())
    }

    /// Whether the failure came from caller input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CorpusError::Json(_)
                | CorpusError::Config(ConfigError::InvalidValue { .. })
                | CorpusError::Walk(WalkError::RootNotFound(_))
                | CorpusError::Walk(WalkError::NotADirectory(_))
        )
    }
}
