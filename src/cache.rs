use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::types::CorpusDocument;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A file that could not be removed during [`CorpusCache::delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a cache teardown
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<DeleteFailure>,
}

/// Durable text cache holding the compiled corpus
///
/// The cache is a single flat text file inside a dedicated directory. Change
/// blocks are written with [`CorpusCache::overwrite`] as one JSON-encoded string
/// per line; walker output is appended raw.
///
/// Concurrent writers against the same directory are not coordinated; callers
/// must use one writer per cache location at a time.
#[derive(Debug, Clone)]
pub struct CorpusCache {
    dir: PathBuf,
    file_name: String,
}

impl CorpusCache {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.cache_path, &config.cache_file)
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the cache file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Whether the cache file has been written
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Replace the cache content with one encoded line per entry
    pub fn overwrite<S: AsRef<str>>(&self, entries: &[S]) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let path = self.path();

        let file = fs::File::create(&path).map_err(|e| write_failed(&path, e))?;
        let mut writer = BufWriter::new(file);
        for entry in entries {
            let line = serde_json::to_string(entry.as_ref())
                .map_err(|e| CacheError::EncodeFailed(e.to_string()))?;
            writeln!(writer, "{}", line).map_err(|e| write_failed(&path, e))?;
        }
        writer.flush().map_err(|e| write_failed(&path, e))?;

        tracing::debug!("Wrote {} entries to {:?}", entries.len(), path);
        Ok(())
    }

    /// Append the full raw content of `source` to the cache file
    pub fn append_from(&self, source: &Path) -> Result<(), CacheError> {
        let content = fs::read_to_string(source).map_err(|e| CacheError::ReadFailed {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        self.append_text(&content)
    }

    /// Append raw text to the cache file, creating it if needed
    pub fn append_text(&self, text: &str) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let path = self.path();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_failed(&path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| write_failed(&path, e))?;

        tracing::debug!("Appended {} bytes to {:?}", text.len(), path);
        Ok(())
    }

    /// Decode the leading line-encoded entries of the cache file
    ///
    /// Decoding stops at the first line that is not a JSON string, which marks
    /// the start of the raw walker section.
    pub fn read_entries(&self) -> Result<Vec<String>, CacheError> {
        let path = self.path();
        let file = fs::File::open(&path).map_err(|e| read_failed(&path, e))?;

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| read_failed(&path, e))?;
            match serde_json::from_str::<String>(&line) {
                Ok(entry) => entries.push(entry),
                Err(_) => break,
            }
        }
        Ok(entries)
    }

    /// Load the whole cache file as a document
    pub fn load(&self) -> Result<CorpusDocument, CacheError> {
        let path = self.path();
        let content = fs::read_to_string(&path).map_err(|e| read_failed(&path, e))?;
        Ok(CorpusDocument { path, content })
    }

    /// Remove every file in the cache directory, then the directory itself
    ///
    /// Per-file failures are collected and the sweep continues. Removing the
    /// directory fails if it is missing or still holds anything.
    pub fn delete(&self) -> Result<DeleteReport, CacheError> {
        let mut report = DeleteReport::default();

        if self.dir.is_dir() {
            let entries = fs::read_dir(&self.dir).map_err(|e| CacheError::ListFailed {
                path: self.dir.display().to_string(),
                reason: e.to_string(),
            })?;

            for entry in entries {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        tracing::warn!("Failed to read cache entry in {:?}: {}", self.dir, e);
                        report.failures.push(DeleteFailure {
                            path: self.dir.clone(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                if !path.is_file() {
                    continue;
                }

                match fs::remove_file(&path) {
                    Ok(()) => report.removed.push(path),
                    Err(e) => {
                        tracing::warn!("Failed to remove cache file {:?}: {}", path, e);
                        report.failures.push(DeleteFailure {
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        fs::remove_dir(&self.dir).map_err(|e| CacheError::DirectoryRemovalFailed {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            "Deleted cache {:?} ({} files removed, {} failures)",
            self.dir,
            report.removed.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| CacheError::DirectoryCreationFailed {
                path: self.dir.display().to_string(),
                reason: e.to_string(),
            })?;
            tracing::debug!("Created cache directory {:?}", self.dir);
        }
        Ok(())
    }
}

fn write_failed(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::WriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn read_failed(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::ReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
