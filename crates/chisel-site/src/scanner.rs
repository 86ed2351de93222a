//! Content discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// A markdown file found under the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentRef {
    pub path: PathBuf,
    /// Path relative to the content directory.
    pub rel_path: PathBuf,
}

/// Result of a scan: files to load and how many were passed over.
#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    pub files: Vec<ContentRef>,
    pub skipped: usize,
}

/// Walk `content_dir` for `.md` files, skipping hidden entries and files
/// larger than `max_file_size` bytes.
///
/// A missing directory yields nothing. Results are sorted by path.
pub(crate) fn scan_content(content_dir: &Path, max_file_size: u64) -> ScanResult {
    let mut result = ScanResult::default();
    if content_dir.is_dir() {
        scan_directory(content_dir, Path::new(""), max_file_size, &mut result);
    }
    result.files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    result
}

fn scan_directory(dir: &Path, rel_dir: &Path, max_file_size: u64, result: &mut ScanResult) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        let path = entry.path();
        let rel_path = rel_dir.join(&name);
        if metadata.is_dir() {
            scan_directory(&path, &rel_path, max_file_size, result);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            if metadata.len() > max_file_size {
                warn!(
                    path = %path.display(),
                    size = metadata.len(),
                    max_file_size,
                    "Skipping oversized content file"
                );
                result.skipped += 1;
                continue;
            }
            result.files.push(ContentRef { path, rel_path });
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rel_paths(result: &ScanResult) -> Vec<PathBuf> {
        result.files.iter().map(|f| f.rel_path.clone()).collect()
    }

    #[test]
    fn test_scan_finds_markdown_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog/2024")).unwrap();
        fs::write(dir.path().join("index.md"), "# Home").unwrap();
        fs::write(dir.path().join("blog/2024/post.md"), "# Post").unwrap();
        fs::write(dir.path().join("blog/cover.png"), "png").unwrap();

        let result = scan_content(dir.path(), 1024);

        assert_eq!(
            rel_paths(&result),
            vec![PathBuf::from("blog/2024/post.md"), PathBuf::from("index.md")]
        );
        assert_eq!(result.files[1].path, dir.path().join("index.md"));
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".drafts")).unwrap();
        fs::write(dir.path().join(".drafts/wip.md"), "wip").unwrap();
        fs::write(dir.path().join(".secret.md"), "shh").unwrap();
        fs::write(dir.path().join("public.md"), "hi").unwrap();

        let result = scan_content(dir.path(), 1024);

        assert_eq!(rel_paths(&result), vec![PathBuf::from("public.md")]);
    }

    #[test]
    fn test_scan_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.md"), "x".repeat(64)).unwrap();
        fs::write(dir.path().join("small.md"), "x").unwrap();

        let result = scan_content(dir.path(), 16);

        assert_eq!(rel_paths(&result), vec![PathBuf::from("small.md")]);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_content(&dir.path().join("missing"), 1024);
        assert!(result.files.is_empty());
    }
}
