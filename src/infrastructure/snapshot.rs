//! Workspace snapshot sources.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::domain::ports::SnapshotSource;

/// Reads the workspace snapshot from a file on every call.
///
/// A missing or unreadable file yields an empty snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for FileSnapshotSource {
    // Blocking read. Snapshot files are small, so it is fine on a runtime
    // worker while the engine lock is held.
    fn snapshot(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot unavailable");
                String::new()
            }
        }
    }
}

/// In-memory snapshot that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticSnapshot {
    text: RwLock<String>,
}

impl StaticSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(text.into()),
        }
    }

    /// Replace the snapshot text.
    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        match self.text.write() {
            Ok(mut guard) => *guard = text,
            Err(poisoned) => *poisoned.into_inner() = text,
        }
    }
}

impl SnapshotSource for StaticSnapshot {
    fn snapshot(&self) -> String {
        match self.text.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_empty_snapshot() {
        let source = FileSnapshotSource::new("/definitely/not/here.html");
        assert_eq!(source.snapshot(), "");
    }

    #[test]
    fn test_file_is_reread_each_call() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<img src=a.png>").unwrap();
        file.flush().unwrap();

        let source = FileSnapshotSource::new(file.path());
        assert_eq!(source.snapshot(), "<img src=a.png>");

        std::fs::write(file.path(), r#"<img alt="x">"#).unwrap();
        assert_eq!(source.snapshot(), r#"<img alt="x">"#);
    }

    #[test]
    fn test_static_snapshot_set() {
        let source = StaticSnapshot::new("");
        assert_eq!(source.snapshot(), "");
        source.set("https://");
        assert_eq!(source.snapshot(), "https://");
    }
}
