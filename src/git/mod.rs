//! Change records from git history
//!
//! Walks a repository's commits and turns each file delta into a
//! [`FileChange`](crate::types::FileChange) with its removed and added lines.

mod extractor;

pub use extractor::{ChangeExtractor, ExtractOptions};
