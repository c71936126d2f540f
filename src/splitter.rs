use crate::config::ChunkingConfig;
use crate::types::{CorpusDocument, TextChunk};

/// Separators tried in order, coarsest first
const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter
///
/// Splits on the coarsest separator present, merges the pieces back up to
/// `chunk_size` characters, and recurses with finer separators on any piece
/// that is still too large. Consecutive chunks share up to `chunk_overlap`
/// characters.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Replace the separator list
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Split a document into chunks carrying their source and offset
    pub fn split_document(&self, document: &CorpusDocument) -> Vec<TextChunk> {
        let mut search_from = 0;
        let chunks: Vec<TextChunk> = self
            .split_text(&document.content)
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                let start_offset = document.content[search_from..]
                    .find(&content)
                    .map(|pos| search_from + pos)
                    .unwrap_or(search_from);
                search_from = start_offset + content.chars().next().map_or(0, char::len_utf8);

                TextChunk {
                    content,
                    source: document.path.clone(),
                    index,
                    start_offset,
                }
            })
            .collect();

        tracing::info!(
            "Split {:?} into {} chunks (size {}, overlap {})",
            document.path,
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        chunks
    }

    /// Split raw text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; the empty separator always is
        let (separator, remaining) = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .map(|i| (separators[i].as_str(), &separators[i + 1..]))
            .unwrap_or(("", &separators[..0]));

        let mut chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in split_on(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                chunks.extend(self.merge_splits(&good_splits, separator));
                good_splits.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(&good_splits, separator));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        let joiner = |non_empty: bool| if non_empty { separator_len } else { 0 };

        for split in splits {
            let len = char_len(split);

            if total + len + joiner(!current.is_empty()) > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = join_doc(&current, separator) {
                        docs.push(doc);
                    }

                    // Keep a tail of the previous chunk as overlap
                    while total > self.chunk_overlap
                        || (total + len + joiner(!current.is_empty()) > self.chunk_size
                            && total > 0)
                    {
                        let removed = current.remove(0);
                        total -= char_len(removed) + joiner(!current.is_empty());
                    }
                }
            }

            current.push(split);
            total += len + joiner(current.len() > 1);
        }

        if let Some(doc) = join_doc(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

fn split_on(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

fn join_doc(pieces: &[&str], separator: &str) -> Option<String> {
    let doc = pieces.join(separator);
    let trimmed = doc.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
