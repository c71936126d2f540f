//! Tests for ProjectWalker

use super::*;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn included_names(report: &WalkReport) -> HashSet<String> {
    report
        .entries
        .iter()
        .map(|e| e.file_name.clone())
        .collect()
}

#[test]
fn test_new() {
    let walker = ProjectWalker::new("/tmp");
    assert_eq!(walker.root, PathBuf::from("/tmp"));
    assert!(walker.ignore_file.is_none());
    assert!(walker.excluded_paths.is_empty());
}

#[test]
fn test_builder_chaining() {
    let walker = ProjectWalker::new("/tmp")
        .with_ignore_file(Some(".gitignore".to_string()))
        .with_excluded_paths(vec![PathBuf::from("/tmp/cache")]);
    assert_eq!(walker.ignore_file.as_deref(), Some(".gitignore"));
    assert_eq!(walker.excluded_paths, vec![PathBuf::from("/tmp/cache")]);
}

#[test]
fn test_walk_nonexistent_directory() {
    let walker = ProjectWalker::new("/nonexistent/path/12345");
    let result = walker.walk();
    assert!(matches!(result, Err(WalkError::RootNotFound(_))));
}

#[test]
fn test_walk_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("notadir.txt");
    fs::write(&file_path, "test").unwrap();

    let result = ProjectWalker::new(&file_path).walk();
    assert!(matches!(result, Err(WalkError::NotADirectory(_))));
}

#[test]
fn test_walk_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    assert_eq!(report.written, 0);
    assert!(report.entries.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn test_inclusion_predicate() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.md"), "# Notes").unwrap();
    fs::write(temp_dir.path().join("readme.txt"), "read me").unwrap();
    fs::write(temp_dir.path().join("image.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(temp_dir.path().join("Makefile"), "all:").unwrap();
    fs::write(temp_dir.path().join("data.json"), "{}").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    let names = included_names(&report);

    assert!(names.contains("notes.md"));
    assert!(names.contains("readme.txt"));
    assert!(!names.contains("image.png"));
    assert!(!names.contains("Makefile"));
    assert!(!names.contains("data.json"));
    assert_eq!(report.written, 2);
}

#[test]
fn test_ignore_rules_exclude_regardless_of_type() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".gitignore"), "secret.txt\nlogs/\n").unwrap();
    fs::write(temp_dir.path().join("secret.txt"), "hidden").unwrap();
    fs::write(temp_dir.path().join("public.txt"), "shown").unwrap();
    fs::create_dir_all(temp_dir.path().join("logs")).unwrap();
    fs::write(temp_dir.path().join("logs/run.md"), "log").unwrap();

    let report = ProjectWalker::new(temp_dir.path())
        .with_ignore_file(Some(".gitignore".to_string()))
        .walk()
        .unwrap();
    let names = included_names(&report);

    assert!(names.contains("public.txt"));
    assert!(!names.contains("secret.txt"));
    assert!(!names.contains("run.md"));
}

#[test]
fn test_ignore_file_not_consulted_when_unset() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".gitignore"), "*.txt\n").unwrap();
    fs::write(temp_dir.path().join("kept.txt"), "kept").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    assert!(included_names(&report).contains("kept.txt"));
}

#[test]
fn test_walk_nested_directories() {
    let temp_dir = TempDir::new().unwrap();
    let deep = temp_dir.path().join("a/b/c/d");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("deep.py"), "print('deep')").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].file_path, deep.join("deep.py"));
    assert_eq!(report.entries[0].mime_type.as_deref(), Some("text/x-python"));
}

#[test]
fn test_hidden_files_are_walked() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join(".config")).unwrap();
    fs::write(temp_dir.path().join(".config/settings.txt"), "x").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    assert!(included_names(&report).contains("settings.txt"));
}

#[test]
fn test_git_directory_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join(".git/logs")).unwrap();
    fs::write(temp_dir.path().join(".git/logs/history.txt"), "x").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();
    assert!(report.entries.is_empty());
}

#[test]
fn test_excluded_paths_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("cache");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("corpus.txt"), "corpus").unwrap();
    fs::write(temp_dir.path().join("source.txt"), "source").unwrap();

    let report = ProjectWalker::new(temp_dir.path())
        .with_excluded_paths(vec![cache_dir])
        .walk()
        .unwrap();
    let names = included_names(&report);

    assert!(names.contains("source.txt"));
    assert!(!names.contains("corpus.txt"));
}

#[test]
fn test_excluded_path_matches_across_spellings() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    let cache_dir = project.join("cache");
    fs::create_dir_all(project.join("sub")).unwrap();
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("corpus.txt"), "corpus").unwrap();
    fs::write(project.join("source.txt"), "source").unwrap();

    // Root spelled through `..`, cache spelled directly
    let report = ProjectWalker::new(project.join("sub").join(".."))
        .with_excluded_paths(vec![cache_dir.clone()])
        .walk()
        .unwrap();
    let names = included_names(&report);
    assert!(names.contains("source.txt"));
    assert!(!names.contains("corpus.txt"));

    // Cache spelled through `.` and `..`, root spelled directly
    let report = ProjectWalker::new(&project)
        .with_excluded_paths(vec![project.join(".").join("sub").join("..").join("cache")])
        .walk()
        .unwrap();
    assert!(!included_names(&report).contains("corpus.txt"));
}

#[test]
fn test_excluded_path_not_yet_created() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("source.txt"), "source").unwrap();

    let report = ProjectWalker::new(temp_dir.path())
        .with_excluded_paths(vec![temp_dir.path().join("missing").join("cache")])
        .walk()
        .unwrap();
    assert!(included_names(&report).contains("source.txt"));
}

#[test]
fn test_resolve_relative_path_against_working_directory() {
    let relative = Path::new("no-such-dir-7f3a").join("cache");
    let expected = std::env::current_dir().unwrap().join(&relative);
    assert_eq!(resolve_path(&relative), expected);
}

#[test]
fn test_undecodable_file_is_skipped_and_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.txt"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
    fs::write(temp_dir.path().join("fine.txt"), "fine").unwrap();

    let report = ProjectWalker::new(temp_dir.path()).walk().unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].file_name, "fine.txt");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, temp_dir.path().join("broken.txt"));
}

#[test]
fn test_render_entry_layout() {
    let entry = CorpusEntry {
        file_name: "a.txt".to_string(),
        file_path: PathBuf::from("/p/a.txt"),
        mime_type: Some("text/plain".to_string()),
        content: "hello".to_string(),
    };
    assert_eq!(
        render_entry(&entry),
        "# a.txt:\nFile Path: /p/a.txt\nMIME Type: text/plain\nhello\n"
    );
}

#[test]
fn test_render_entry_unknown_mime() {
    let entry = CorpusEntry {
        file_name: "x.md".to_string(),
        file_path: PathBuf::from("/p/x.md"),
        mime_type: None,
        content: String::new(),
    };
    assert!(render_entry(&entry).contains("MIME Type: unknown\n"));
}

#[test]
fn test_write_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("one.txt"), "first").unwrap();
    fs::write(project.join("two.md"), "second").unwrap();
    fs::write(project.join("three.png"), "not text").unwrap();

    let output = temp_dir.path().join("listing.txt");
    let report = ProjectWalker::new(&project).write_to(&output).unwrap();
    let written = fs::read_to_string(&output).unwrap();

    assert_eq!(report.written, 2);
    assert!(report.entries.is_empty());
    assert!(written.contains(&format!(
        "# one.txt:\nFile Path: {}\nMIME Type: text/plain\nfirst\n",
        project.join("one.txt").display()
    )));
    assert!(written.contains("# two.md:\n"));
    assert!(written.contains("MIME Type: text/markdown\nsecond\n"));
    assert!(!written.contains("three.png"));
}

#[test]
fn test_write_to_truncates_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    fs::create_dir_all(&project).unwrap();
    let output = temp_dir.path().join("listing.txt");
    fs::write(&output, "stale content").unwrap();

    ProjectWalker::new(&project).write_to(&output).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}
