use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::task::{PomodoroSession, Task, TaskList};

/// The materialized collections as exported by the hosted data SDK:
/// one JSON document holding the task, list, and pomodoro-session
/// arrays. Each key is optional. The SDK owns all writes; this side is
/// read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub lists: Vec<TaskList>,
    #[serde(default)]
    pub pomodoro_sessions: Vec<PomodoroSession>,
}

impl Snapshot {
    #[tracing::instrument(skip(path))]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!(file = %path.display(), "loading snapshot");
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing {}", path.display()))?;

        info!(
            tasks = snapshot.tasks.len(),
            lists = snapshot.lists.len(),
            sessions = snapshot.pomodoro_sessions.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::Snapshot;

    #[test]
    fn loads_document_with_missing_keys() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{"tasks": [{"id": "t1", "title": "x", "status": "pending", "created_date": "2026-03-02T09:00:00Z"}]}"#,
        )
        .expect("write snapshot");

        let snapshot = Snapshot::load(&path).expect("load snapshot");
        assert_eq!(snapshot.tasks.len(), 1);
        assert!(snapshot.lists.is_empty());
        assert!(snapshot.pomodoro_sessions.is_empty());
    }

    #[test]
    fn malformed_document_carries_path_context() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("snapshot.json");
        fs::write(&path, "not json").expect("write snapshot");

        let err = Snapshot::load(&path).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("snapshot.json"));
    }
}
