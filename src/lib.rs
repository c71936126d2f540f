//! # code-change-corpus
//!
//! Compiles git change records and a project's source files into a single
//! cached text corpus, then feeds that corpus to a chunking, embedding and
//! conversational retrieval stage.
//!
//! ## Overview
//!
//! The core is synchronous and file-based: change records are rendered into
//! labeled text blocks and written to the cache file, then every text file
//! under the project root that survives the ignore rules is appended. The
//! downstream stages only ever see the resulting [`types::CorpusDocument`].
//!
//! ```text
//! CommitRecords ──► formatter ──► CorpusCache (overwrite)
//!                                      │
//! project root ──► ProjectWalker ──────┘ (append)
//!                                      │
//!                                CorpusDocument
//!                                      │
//!              TextSplitter ──► CacheBackedEmbeddings ──► VectorStore
//!                                                             │
//!                                        ConversationalRetrievalChain
//! ```
//!
//! ## Modules
//!
//! - [`formatter`]: change records to text blocks
//! - [`walker`]: project walk with gitignore rules and MIME filtering
//! - [`cache`]: the corpus cache file (overwrite, append, delete)
//! - [`compiler`]: runs formatter, cache and walker in order
//! - [`git`]: change records from a repository's history
//! - [`splitter`]: recursive character text splitter
//! - [`embedding`]: embedding providers and the file-backed vector cache
//! - [`retrieval`]: vector store, summary memory and the retrieval chain
//! - [`pipeline`]: the whole sequence behind one type
//! - [`config`]: configuration with file and environment overrides
//!
//! ## Usage Example
//!
//! ```no_run
//! use code_change_corpus::compiler::CorpusCompiler;
//! use code_change_corpus::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::new()?;
//!     let compiler = CorpusCompiler::from_config(&config);
//!
//!     let document = compiler.compile(&[])?;
//!     println!("{} bytes at {}", document.content.len(), document.path.display());
//!     Ok(())
//! }
//! ```

/// The corpus cache file and its directory
pub mod cache;

/// Ordered compilation of change blocks and project files into the cache
pub mod compiler;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation and caching
pub mod embedding;

/// Error types and result aliases
pub mod error;

/// Rendering of change records as text blocks
pub mod formatter;

/// Change record extraction from git history
pub mod git;

/// Default locations and file names
pub mod paths;

/// Compile, index and query in one place
pub mod pipeline;

/// Vector search and conversational retrieval
pub mod retrieval;

/// Text chunking
pub mod splitter;

/// Core data types
pub mod types;

/// Project tree walking
pub mod walker;
