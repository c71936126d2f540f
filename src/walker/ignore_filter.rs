use crate::error::WalkError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Path exclusion predicate built from a gitignore-style rules file
///
/// Built once per walk. A filter without rules excludes nothing.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    root: PathBuf,
    matcher: Option<Gitignore>,
}

impl IgnoreFilter {
    /// Filter that matches nothing
    pub fn empty(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            matcher: None,
        }
    }

    /// Load rules from `root/ignore_file`; no matcher when the file is absent
    pub fn load(root: impl AsRef<Path>, ignore_file: Option<&str>) -> Result<Self, WalkError> {
        let root = root.as_ref();
        let Some(name) = ignore_file else {
            return Ok(Self::empty(root));
        };

        let rules_path = root.join(name);
        if !rules_path.is_file() {
            tracing::debug!("No ignore rules at {:?}, including all text files", rules_path);
            return Ok(Self::empty(root));
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&rules_path) {
            return Err(WalkError::IgnoreRules {
                file: rules_path.display().to_string(),
                reason: err.to_string(),
            });
        }
        let matcher = builder.build().map_err(|e| WalkError::IgnoreRules {
            file: rules_path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            "Loaded {} ignore rules from {:?}",
            matcher.num_ignores() + matcher.num_whitelists(),
            rules_path
        );

        Ok(Self {
            root: root.to_path_buf(),
            matcher: Some(matcher),
        })
    }

    /// Whether any rules are active
    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }

    /// Whether `path` (a file) is excluded by the rules
    ///
    /// Directory rules such as `target/` exclude every file beneath them.
    /// Paths outside the root are never excluded.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        if !path.starts_with(&self.root) {
            return false;
        }
        matcher
            .matched_path_or_any_parents(path, false)
            .is_ignore()
    }
}
