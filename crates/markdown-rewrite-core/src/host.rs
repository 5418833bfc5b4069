//! Narrow boundary between the rewrite engine and whatever hosts the document.
//!
//! The engine reads the current text once, computes the result, and writes it
//! back once. Navigation is fire-and-forget: the engine never learns whether
//! the host managed to open the target.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RewriteError, RewriteResult};
use crate::fs::write_atomic;

/// The active document: its name and full text.
pub trait Document {
    /// File name of the document, e.g. `2024-02-28.md`.
    fn name(&self) -> String;

    fn text(&self) -> RewriteResult<String>;

    /// Replace the whole document with `text`.
    fn replace_text(&mut self, text: String) -> RewriteResult<()>;
}

/// Capability to open another document by file name.
pub trait Navigator {
    fn navigate_to(&mut self, file_name: &str);
}

/// Document held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    name: String,
    text: String,
    writes: usize,
}

impl MemoryDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            writes: 0,
        }
    }

    pub fn contents(&self) -> &str {
        &self.text
    }

    /// Number of times the text has been replaced.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Document for MemoryDocument {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn text(&self) -> RewriteResult<String> {
        Ok(self.text.clone())
    }

    fn replace_text(&mut self, text: String) -> RewriteResult<()> {
        self.text = text;
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Compute everything but never touch the file.
    pub dry_run: bool,
    /// Keep a `<name>.bak` copy of the previous contents.
    pub backup: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
        }
    }
}

/// Document backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    options: WriteOptions,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>, options: WriteOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Document for FileDocument {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn text(&self) -> RewriteResult<String> {
        fs::read_to_string(&self.path).map_err(|source| RewriteError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn replace_text(&mut self, text: String) -> RewriteResult<()> {
        if self.options.dry_run {
            tracing::debug!(path = %self.path.display(), "dry run; not writing");
            return Ok(());
        }

        // Unchanged content would only churn the backup.
        if fs::read_to_string(&self.path).is_ok_and(|current| current == text) {
            tracing::debug!(path = %self.path.display(), "content unchanged; not writing");
            return Ok(());
        }

        write_atomic(&self.path, &text, self.options.backup).map_err(|source| {
            RewriteError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::info!(path = %self.path.display(), "document updated");
        Ok(())
    }
}

/// Navigator that only remembers where it was asked to go.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&mut self, file_name: &str) {
        self.visited.push(file_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::backup_path;
    use tempfile::tempdir;

    #[test]
    fn memory_document_counts_writes() {
        let mut doc = MemoryDocument::new("a.md", "old");
        doc.replace_text("new".into()).unwrap();
        assert_eq!(doc.contents(), "new");
        assert_eq!(doc.writes(), 1);
        assert_eq!(doc.name(), "a.md");
    }

    #[test]
    fn file_document_reports_file_name_only() {
        let doc = FileDocument::new("journal/2024-02-28.md", WriteOptions::default());
        assert_eq!(doc.name(), "2024-02-28.md");
    }

    #[test]
    fn file_document_writes_with_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "before").unwrap();

        let mut doc = FileDocument::new(&path, WriteOptions::default());
        doc.replace_text("after".into()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "after");
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "before");
    }

    #[test]
    fn dry_run_never_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "before").unwrap();

        let mut doc = FileDocument::new(
            &path,
            WriteOptions {
                dry_run: true,
                backup: true,
            },
        );
        doc.replace_text("after".into()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "before");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn identical_content_skips_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "same").unwrap();

        let mut doc = FileDocument::new(&path, WriteOptions::default());
        doc.replace_text("same".into()).unwrap();

        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let doc = FileDocument::new(dir.path().join("absent.md"), WriteOptions::default());
        assert!(matches!(doc.text(), Err(RewriteError::Read { .. })));
    }
}
