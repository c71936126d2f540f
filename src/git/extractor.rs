use crate::error::GitError;
use crate::types::{CommitChange, CommitRecord, FileChange};
use anyhow::{Context, Result};
use git2::{Delta, DiffFindOptions, DiffOptions, Patch, Repository, Sort};
use std::path::{Path, PathBuf};

/// Which commits to extract
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Local branch to walk from; HEAD when `None`
    pub branch: Option<String>,
    /// Stop after this many commits
    pub max_commits: Option<usize>,
}

/// Builds change records from the history of a git repository
pub struct ChangeExtractor {
    repo: Repository,
    repo_path: PathBuf,
}

impl ChangeExtractor {
    /// Discover and open a git repository from any path within it
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path)
            .map_err(|e| GitError::RepoNotFound(format!("{}: {}", path.display(), e.message())))?;
        let repo_path = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        tracing::info!("Opened git repository at: {}", repo_path.display());

        Ok(Self { repo, repo_path })
    }

    /// Get the repository root path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Extract change records, newest commit first
    pub fn extract(&self, options: &ExtractOptions) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| GitError::IterFailed(e.message().to_string()))?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;

        if let Some(branch_name) = &options.branch {
            let reference = self
                .repo
                .find_branch(branch_name, git2::BranchType::Local)
                .map_err(|_| GitError::BranchNotFound(branch_name.clone()))?;
            let oid = reference
                .get()
                .target()
                .ok_or_else(|| GitError::BranchNotFound(branch_name.clone()))?;
            revwalk.push(oid)?;
        } else {
            revwalk
                .push_head()
                .map_err(|e| GitError::IterFailed(format!("no HEAD: {}", e.message())))?;
        }

        let max = options.max_commits.unwrap_or(usize::MAX);
        let mut records = Vec::new();

        for oid in revwalk {
            if records.len() >= max {
                break;
            }

            let oid = oid.map_err(|e| GitError::IterFailed(e.message().to_string()))?;
            let commit = self.repo.find_commit(oid)?;
            let changes = self.extract_changes(&commit)?;
            tracing::debug!("Commit {} touched {} files", oid, changes.len());
            records.push(CommitRecord::new(oid.to_string(), changes));
        }

        tracing::info!("Extracted {} commits", records.len());
        Ok(records)
    }

    /// Per-file line changes of `commit` against its first parent
    fn extract_changes(&self, commit: &git2::Commit) -> Result<Vec<FileChange>> {
        let hash = commit.id().to_string();
        let diff_failed = |e: git2::Error| GitError::DiffFailed {
            commit: hash.clone(),
            reason: e.message().to_string(),
        };

        let message = commit.message().unwrap_or("").trim_end().to_string();
        let tree = commit.tree().map_err(diff_failed)?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .and_then(|p| p.tree())
                    .map_err(diff_failed)?,
            )
        } else {
            None
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0).ignore_whitespace(false);

        let mut diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))
            .map_err(diff_failed)?;
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))
            .map_err(diff_failed)?;

        let mut changes = Vec::new();
        for (idx, delta) in diff.deltas().enumerate() {
            let old_path = delta.old_file().path().map(|p| p.display().to_string());
            let new_path = delta.new_file().path().map(|p| p.display().to_string());

            let file_path = match delta.status() {
                Delta::Deleted => old_path.clone(),
                _ => new_path.clone(),
            }
            .unwrap_or_default();

            let old_file_path = match delta.status() {
                Delta::Renamed | Delta::Copied => old_path.filter(|p| Some(p) != new_path.as_ref()),
                _ => None,
            };

            let (old_lines, new_lines) = match Patch::from_diff(&diff, idx).map_err(diff_failed)? {
                Some(patch) => collect_lines(&patch).map_err(diff_failed)?,
                None => (Vec::new(), Vec::new()),
            };

            changes.push(FileChange {
                file_path,
                old_file_path,
                change_type: change_type_label(delta.status()).to_string(),
                commit_message: message.clone(),
                old_lines,
                new_lines,
            });
        }

        Ok(changes)
    }
}

/// Removed and added lines of a patch, numbered against the old and new file
fn collect_lines(
    patch: &Patch,
) -> std::result::Result<(Vec<CommitChange>, Vec<CommitChange>), git2::Error> {
    let mut old_lines = Vec::new();
    let mut new_lines = Vec::new();

    for hunk in 0..patch.num_hunks() {
        for line_idx in 0..patch.num_lines_in_hunk(hunk)? {
            let line = patch.line_in_hunk(hunk, line_idx)?;
            let content = String::from_utf8_lossy(line.content())
                .trim_end_matches(['\n', '\r'])
                .to_string();

            match line.origin() {
                '-' => {
                    if let Some(n) = line.old_lineno() {
                        old_lines.push(CommitChange::new(n as usize, content));
                    }
                }
                '+' => {
                    if let Some(n) = line.new_lineno() {
                        new_lines.push(CommitChange::new(n as usize, content));
                    }
                }
                _ => {}
            }
        }
    }

    Ok((old_lines, new_lines))
}

fn change_type_label(status: Delta) -> &'static str {
    match status {
        Delta::Added => "Added",
        Delta::Deleted => "Deleted",
        Delta::Modified => "Modified",
        Delta::Renamed => "Renamed",
        Delta::Copied => "Copied",
        Delta::Typechange => "TypeChanged",
        Delta::Untracked => "Untracked",
        Delta::Ignored => "Ignored",
        Delta::Conflicted => "Conflicted",
        Delta::Unreadable => "Unreadable",
        Delta::Unmodified => "Unmodified",
    }
}
