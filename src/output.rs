//! Atomic Markdown artifact writer.
//!
//! Each artifact is written to a temporary file in the output directory and
//! renamed into place, so an interrupted run never leaves a truncated file
//! behind. Writing the same content twice produces byte-identical files.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes final task outputs into one directory.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create the writer, creating `dir` if absent (idempotent).
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
            dir: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomically write `content` to `<dir>/<file_name>`.
    ///
    /// The temporary file lives in the output directory itself so the final
    /// rename never crosses a filesystem boundary.
    pub fn write(&self, file_name: &str, content: &str) -> Result<PathBuf, WriteError> {
        let target = self.dir.join(file_name);
        let as_write_error = |source: std::io::Error| WriteError::Write {
            path: target.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(as_write_error)?;
        temp.write_all(content.as_bytes()).map_err(as_write_error)?;
        temp.flush().map_err(as_write_error)?;
        temp.persist(&target)
            .map_err(|e| as_write_error(e.error))?;

        info!(path = %target.display(), bytes = content.len(), "artifact written");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_is_idempotent() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("output");
        OutputWriter::create(&dir).unwrap();
        OutputWriter::create(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn writes_content_and_returns_path() {
        let root = TempDir::new().unwrap();
        let writer = OutputWriter::create(root.path().join("output")).unwrap();
        let path = writer.write("tailored_resume.md", "# Resume\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Resume\n");
    }

    #[test]
    fn repeated_writes_are_byte_identical() {
        let root = TempDir::new().unwrap();
        let writer = OutputWriter::create(root.path().join("output")).unwrap();
        let first = writer.write("interview_materials.md", "Q&A\n").unwrap();
        let a = std::fs::read(&first).unwrap();
        let second = writer.write("interview_materials.md", "Q&A\n").unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(first, second);
        assert_eq!(a, b);
    }

    #[test]
    fn no_temporary_files_remain_after_write() {
        let root = TempDir::new().unwrap();
        let writer = OutputWriter::create(root.path().join("output")).unwrap();
        writer.write("a.md", "a").unwrap();
        writer.write("b.md", "b").unwrap();

        let names: Vec<_> = std::fs::read_dir(writer.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, ["a.md", "b.md"]);
    }

    #[test]
    fn failed_rename_leaves_no_partial_target() {
        let root = TempDir::new().unwrap();
        let writer = OutputWriter::create(root.path().join("output")).unwrap();
        // A directory at the target path makes the final rename fail after
        // the temporary file was fully written.
        let target = writer.dir().join("blocked.md");
        std::fs::create_dir(&target).unwrap();

        let err = writer.write("blocked.md", "content").unwrap_err();
        assert!(matches!(err, WriteError::Write { .. }));
        // The target is still the directory, not a truncated file.
        assert!(target.is_dir());
    }

    #[test]
    fn unwritable_directory_fails_on_create() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("occupied");
        std::fs::write(&file, "plain file").unwrap();
        // A file where the directory should be.
        let err = OutputWriter::create(file.join("output")).unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));
    }
}
