//! CLI command implementations.

pub mod check;
pub mod run;
pub mod simulate;

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ports::SnapshotSource;
use crate::infrastructure::{FileSnapshotSource, StaticSnapshot};
use crate::services::EventPayload;

/// One-line human rendering of an engine notification.
pub fn format_event(payload: &EventPayload) -> String {
    match payload {
        EventPayload::MessageAdded { id, source, text } => {
            format!("NEW       #{id} [{source}] {text}")
        }
        EventPayload::MessageRemoved { id } => format!("REMOVED   #{id}"),
        EventPayload::Urgent { id, text } => format!("URGENT    #{id} {text}"),
        EventPayload::Escalated { id, text } => format!("COURT     #{id} {text}"),
        EventPayload::Resolved { id, text } => format!("RESOLVED  #{id} {text}"),
        EventPayload::Enabled => "ENABLED".to_string(),
        EventPayload::Disabled => "DISABLED".to_string(),
        EventPayload::Reset => "RESET".to_string(),
    }
}

/// Snapshot source for a run: a file re-read on every check, fixed text, or empty.
pub(crate) fn snapshot_source(
    path: Option<PathBuf>,
    text: Option<String>,
) -> Arc<dyn SnapshotSource> {
    match (path, text) {
        (Some(path), _) => Arc::new(FileSnapshotSource::new(path)),
        (None, Some(text)) => Arc::new(StaticSnapshot::new(text)),
        (None, None) => Arc::new(StaticSnapshot::new("")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MessageSource;

    #[test]
    fn test_format_event() {
        let line = format_event(&EventPayload::Escalated {
            id: 4,
            text: "fix user login".to_string(),
        });
        assert_eq!(line, "COURT     #4 fix user login");

        let line = format_event(&EventPayload::MessageAdded {
            id: 1,
            source: MessageSource::System,
            text: "Welcome to the Court Room!".to_string(),
        });
        assert!(line.contains("[System]"));
    }

    #[test]
    fn test_snapshot_source_prefers_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<a href=\"https://db\">db</a>").unwrap();
        file.flush().unwrap();

        let source = snapshot_source(
            Some(file.path().to_path_buf()),
            Some("<img alt=\"x\">".to_string()),
        );
        assert_eq!(source.snapshot(), "<a href=\"https://db\">db</a>");
    }

    #[test]
    fn test_snapshot_source_text_or_empty() {
        let source = snapshot_source(None, Some("<img alt=\"x\">".to_string()));
        assert_eq!(source.snapshot(), "<img alt=\"x\">");

        let empty = snapshot_source(None, None);
        assert_eq!(empty.snapshot(), "");
    }
}
