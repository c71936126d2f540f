//! Change record formatting
//!
//! Renders each file change of each commit as a labelled text block. Blocks
//! come out in nested-iteration order (commits outer, file changes inner) and
//! line lists keep their input order.

use crate::types::{CommitChange, CommitRecord, FileChange};

/// Format every file change of every commit into a change block
pub fn format_changes(records: &[CommitRecord]) -> Vec<String> {
    let blocks: Vec<String> = records
        .iter()
        .flat_map(|record| {
            record
                .changes()
                .iter()
                .map(move |change| format_file_change(record.commit_hash(), change))
        })
        .collect();

    tracing::debug!(
        "Formatted {} change blocks from {} commits",
        blocks.len(),
        records.len()
    );
    blocks
}

/// Format a single file change belonging to `commit_hash`
pub fn format_file_change(commit_hash: &str, change: &FileChange) -> String {
    let mut block = String::new();

    block.push_str("Commit: ");
    block.push_str(commit_hash);
    block.push_str("\nMessage: ");
    block.push_str(&change.commit_message);
    block.push_str("\nFile: ");
    block.push_str(&change.file_path);
    block.push_str("\nType: ");
    block.push_str(&change.change_type);
    block.push('\n');

    if let Some(old_path) = change.old_file_path.as_deref()
        && !old_path.is_empty()
    {
        block.push_str("Old File Path: ");
        block.push_str(old_path);
        block.push('\n');
    }

    block.push_str("Old Lines:\n");
    block.push_str(&join_lines(&change.old_lines));
    block.push_str("\nNew Lines:\n");
    block.push_str(&join_lines(&change.new_lines));
    block.push('\n');

    block
}

fn join_lines(lines: &[CommitChange]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {}", line.line_number, line.line_content))
        .collect::<Vec<_>>()
        .join("\n")
}
