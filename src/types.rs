use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One line-level edit inside a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitChange {
    /// 1-based position in the old or new version of the file
    #[serde(rename = "line number")]
    pub line_number: usize,
    /// Raw line text without its trailing newline
    #[serde(rename = "line content")]
    pub line_content: String,
}

impl CommitChange {
    pub fn new(line_number: usize, line_content: impl Into<String>) -> Self {
        Self {
            line_number,
            line_content: line_content.into(),
        }
    }
}

/// One file's change within a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path of the changed file
    pub file_path: String,
    /// Previous path, present only for renames and moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_file_path: Option<String>,
    /// Opaque label such as "Added", "Modified", "Deleted" or "Renamed"
    pub change_type: String,
    /// Message of the commit this change belongs to
    pub commit_message: String,
    pub old_lines: Vec<CommitChange>,
    pub new_lines: Vec<CommitChange>,
}

/// Payload of a commit record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    pub changes: Vec<FileChange>,
}

/// `(commit hash, commit data)` pair; serialized as a two-element array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord(pub String, pub CommitData);

impl CommitRecord {
    pub fn new(commit_hash: impl Into<String>, changes: Vec<FileChange>) -> Self {
        Self(commit_hash.into(), CommitData { changes })
    }

    pub fn commit_hash(&self) -> &str {
        &self.0
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.1.changes
    }
}

/// A file the project walker decided to include in the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub file_name: String,
    pub file_path: PathBuf,
    /// Guessed content type, `None` when the extension is unknown
    pub mime_type: Option<String>,
    pub content: String,
}

/// A file the walker selected but could not include
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Loadable handle over the assembled corpus text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    /// Cache file the content was read from
    pub path: PathBuf,
    pub content: String,
}

/// A piece of a [`CorpusDocument`] ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    /// Path of the document this chunk came from
    pub source: PathBuf,
    /// Position of the chunk within its document
    pub index: usize,
    /// Byte offset of the chunk start within the document
    pub start_offset: usize,
}

/// A chunk returned by the retriever together with its relevance
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: TextChunk,
    /// Cosine similarity to the query (-1.0 to 1.0)
    pub score: f32,
}
