//! Project corpus walking
//!
//! Visits every file under a root directory, keeps the ones whose name marks
//! them as text and which no ignore rule excludes, and renders each as a corpus
//! block:
//!
//! ```text
//! # <file name>:
//! File Path: <full path>
//! MIME Type: <guessed type or "unknown">
//! <file content>
//! ```
//!
//! followed by a blank separator line.

mod ignore_filter;
mod mime;

pub use ignore_filter::IgnoreFilter;
pub use mime::{guess_mime_type, is_corpus_text};

use crate::error::WalkError;
use crate::types::{CorpusEntry, SkippedFile};
use ignore::WalkBuilder;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Marker written when no MIME type could be guessed
pub const UNKNOWN_MIME: &str = "unknown";

/// Outcome of a walk
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Number of blocks emitted
    pub written: usize,
    /// Included files, retained only by [`ProjectWalker::walk`]
    pub entries: Vec<CorpusEntry>,
    /// Selected files dropped because they are not valid UTF-8
    pub skipped: Vec<SkippedFile>,
}

pub struct ProjectWalker {
    root: PathBuf,
    ignore_file: Option<String>,
    excluded_paths: Vec<PathBuf>,
}

impl ProjectWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignore_file: None,
            excluded_paths: vec![],
        }
    }

    /// Name of the ignore-rules file, resolved relative to the root
    pub fn with_ignore_file(mut self, ignore_file: Option<String>) -> Self {
        self.ignore_file = ignore_file;
        self
    }

    /// Paths (files or directories) never read by this walker
    pub fn with_excluded_paths(mut self, excluded_paths: Vec<PathBuf>) -> Self {
        self.excluded_paths = excluded_paths;
        self
    }

    /// Walk the tree and collect every included file
    pub fn walk(&self) -> Result<WalkReport, WalkError> {
        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        self.visit(
            |entry| {
                entries.push(entry);
                Ok(())
            },
            &mut skipped,
        )?;
        let report = WalkReport {
            written: entries.len(),
            entries,
            skipped,
        };

        tracing::info!(
            "Walked {:?}: {} files included, {} skipped",
            self.root,
            report.written,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Walk the tree and write one block per included file to `output`
    ///
    /// The output file is truncated first.
    pub fn write_to(&self, output: &Path) -> Result<WalkReport, WalkError> {
        let output_failed = |e: std::io::Error| WalkError::OutputFailed {
            path: output.display().to_string(),
            reason: e.to_string(),
        };

        let file = fs::File::create(output).map_err(output_failed)?;
        let mut writer = BufWriter::new(file);
        let mut skipped = Vec::new();
        let mut written = 0usize;

        self.visit(
            |entry| {
                writer
                    .write_all(render_entry(&entry).as_bytes())
                    .map_err(output_failed)?;
                written += 1;
                Ok(())
            },
            &mut skipped,
        )?;
        writer.flush().map_err(output_failed)?;
        let report = WalkReport {
            written,
            entries: vec![],
            skipped,
        };

        tracing::info!(
            "Wrote {} corpus blocks from {:?} to {:?} ({} skipped)",
            report.written,
            self.root,
            output,
            report.skipped.len()
        );
        Ok(report)
    }

    fn visit<F>(&self, mut emit: F, skipped: &mut Vec<SkippedFile>) -> Result<(), WalkError>
    where
        F: FnMut(CorpusEntry) -> Result<(), WalkError>,
    {
        if !self.root.exists() {
            return Err(WalkError::RootNotFound(self.root.display().to_string()));
        }
        if !self.root.is_dir() {
            return Err(WalkError::NotADirectory(self.root.display().to_string()));
        }

        let filter = IgnoreFilter::load(&self.root, self.ignore_file.as_deref())?;

        // Exclusions are matched root-relative against resolved paths, so a root
        // or excluded path spelled differently (relative, `..`) still matches.
        let resolved_root = resolve_path(&self.root);
        let excluded: Vec<PathBuf> = self
            .excluded_paths
            .iter()
            .filter_map(|p| {
                resolve_path(p)
                    .strip_prefix(&resolved_root)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();

        // Only the explicit rules file decides exclusion, so the crate's own
        // filters (hidden files, .gitignore discovery, parents) are switched off.
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| WalkError::EntryFailed(e.to_string()))?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            if path.components().any(|c| c.as_os_str() == ".git") {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if excluded.iter().any(|p| relative.starts_with(p)) {
                tracing::debug!("Skipping excluded path: {:?}", path);
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            let mime_type = guess_mime_type(path);

            if !is_corpus_text(&file_name, mime_type) {
                tracing::debug!("Skipping non-text file: {:?}", path);
                continue;
            }

            if filter.is_ignored(path) {
                tracing::debug!("Skipping ignored file: {:?}", path);
                continue;
            }

            let bytes = fs::read(path).map_err(|e| WalkError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping undecodable file {:?}: {}", path, e);
                    skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            emit(CorpusEntry {
                file_name,
                file_path: path.to_path_buf(),
                mime_type: mime_type.map(String::from),
                content,
            })?;
        }

        Ok(())
    }
}

/// Absolute, symlink-free form of `path`
///
/// Paths that do not exist yet are resolved through their nearest existing
/// ancestor.
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_path(parent).join(name)
        }
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Render a corpus entry as its text block
pub fn render_entry(entry: &CorpusEntry) -> String {
    format!(
        "# {}:\nFile Path: {}\nMIME Type: {}\n{}\n",
        entry.file_name,
        entry.file_path.display(),
        entry.mime_type.as_deref().unwrap_or(UNKNOWN_MIME),
        entry.content
    )
}

#[cfg(test)]
mod tests;
