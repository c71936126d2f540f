//! Content-type guessing from file names
//!
//! Only the extension is consulted; file contents are never sniffed.

use std::path::Path;

/// Guess a MIME type from the file name's extension
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();

    let mime = match extension.as_str() {
        // Plain text and documentation
        "txt" | "text" | "log" | "conf" | "def" | "list" | "in" | "ini" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "rst" => "text/x-rst",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "rtx" => "text/richtext",
        "vcf" => "text/x-vcard",
        "ics" => "text/calendar",

        // Web technologies
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "text/javascript",
        "xml" | "xsl" => "text/xml",
        "vtt" => "text/vtt",

        // Source code
        "py" => "text/x-python",
        "c" => "text/x-c",
        "h" => "text/x-chdr",
        "cc" | "cpp" | "cxx" => "text/x-c++src",
        "hh" | "hpp" | "hxx" => "text/x-c++hdr",
        "java" => "text/x-java",
        "rs" => "text/rust",
        "go" => "text/x-go",
        "rb" => "text/x-ruby",
        "pl" | "pm" => "text/x-perl",
        "sql" => "text/x-sql",
        "swift" => "text/x-swift",
        "kt" | "kts" => "text/x-kotlin",
        "scala" => "text/x-scala",
        "ts" | "tsx" => "text/x-typescript",
        "jsx" => "text/jsx",
        "asm" | "s" => "text/x-asm",
        "diff" | "patch" => "text/x-diff",
        "bat" => "text/x-msdos-batch",
        "sgm" | "sgml" => "text/x-sgml",
        "etx" => "text/x-setext",

        // Structured data registered outside the text tree
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "sh" => "application/x-sh",
        "csh" => "application/x-csh",
        "tex" => "application/x-tex",
        "php" => "application/x-httpd-php",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        // Media
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        _ => return None,
    };

    Some(mime)
}

/// Whether a file belongs in the corpus based on its name alone
///
/// Text-family MIME types qualify, and so does anything named `*.md`
/// regardless of what the type table says about it.
pub fn is_corpus_text(file_name: &str, mime_type: Option<&str>) -> bool {
    mime_type.is_some_and(|mime| mime.starts_with("text")) || file_name.ends_with(".md")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_extensions() {
        assert_eq!(guess_mime_type(Path::new("a.txt")), Some("text/plain"));
        assert_eq!(guess_mime_type(Path::new("dir/b.py")), Some("text/x-python"));
        assert_eq!(guess_mime_type(Path::new("INDEX.HTML")), Some("text/html"));
        assert_eq!(guess_mime_type(Path::new("lib.rs")), Some("text/rust"));
    }

    #[test]
    fn test_non_text_extensions() {
        assert_eq!(guess_mime_type(Path::new("image.png")), Some("image/png"));
        assert_eq!(guess_mime_type(Path::new("data.json")), Some("application/json"));
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(guess_mime_type(Path::new("Makefile")), None);
        assert_eq!(guess_mime_type(Path::new("archive.xyz")), None);
        assert_eq!(guess_mime_type(Path::new(".gitignore")), None);
    }

    #[test]
    fn test_is_corpus_text() {
        assert!(is_corpus_text("a.txt", Some("text/plain")));
        assert!(is_corpus_text("notes.md", None));
        assert!(is_corpus_text("notes.md", Some("application/octet-stream")));
        assert!(!is_corpus_text("image.png", Some("image/png")));
        assert!(!is_corpus_text("Makefile", None));
    }
}
