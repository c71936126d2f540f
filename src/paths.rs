/// Default location resolution for the corpus cache
///
/// The cache lives beside the project by default, so its location derives from
/// the working directory. Resolution happens once when a [`crate::config::Config`]
/// is built; nothing downstream reads the working directory again.
use std::path::{Path, PathBuf};

/// Default name of the cache directory
pub const CACHE_DIR_NAME: &str = "beatrica_code_change_processor_cache";

/// Default name of the cache file inside the cache directory
pub const CACHE_FILE_NAME: &str = "beatrica_code_change_processor_cache.txt";

/// Default name of the temporary walk output
pub const WALK_OUTPUT_FILE_NAME: &str = "file_info_and_content_listing.txt";

/// Default ignore-rules file looked up under the project root
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "code-change-corpus.toml";

/// Working-directory derived paths
pub struct CorpusPaths;

impl CorpusPaths {
    /// Current working directory, or "." if it cannot be determined
    pub fn working_dir() -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Default cache directory: `{cwd}/beatrica_code_change_processor_cache`
    pub fn default_cache_dir() -> PathBuf {
        Self::cache_dir_in(&Self::working_dir())
    }

    /// Cache directory for an explicit base directory
    pub fn cache_dir_in(base: &Path) -> PathBuf {
        base.join(CACHE_DIR_NAME)
    }

    /// Default configuration file: `{cwd}/code-change-corpus.toml`
    pub fn default_config_path() -> PathBuf {
        Self::working_dir().join(CONFIG_FILE_NAME)
    }
}
