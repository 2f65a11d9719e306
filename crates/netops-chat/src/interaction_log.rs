//! Append-only question/answer log

use chrono::{SecondsFormat, Utc};
use netops_core::Result;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Appends every completed exchange to a local text file.
///
/// Entries from concurrent sessions are serialized so they never interleave.
pub struct InteractionLog {
    path: PathBuf,
    guard: Mutex<()>,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, question: &str, answer: &str) -> Result<()> {
        let entry = format_entry(
            &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            question,
            answer,
        );

        let _guard = self.guard.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), bytes = entry.len(), "Interaction logged");
        Ok(())
    }
}

fn format_entry(timestamp: &str, question: &str, answer: &str) -> String {
    format!(
        "\n--- {} ---\nUser: {}\nAssistant: {}\n",
        timestamp, question, answer
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_format() {
        assert_eq!(
            format_entry("2025-01-01T00:00:00Z", "IP of asw1?", "192.168.1.10"),
            "\n--- 2025-01-01T00:00:00Z ---\nUser: IP of asw1?\nAssistant: 192.168.1.10\n"
        );
    }

    #[tokio::test]
    async fn test_append_keeps_previous_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("history.log"));

        log.append("first", "one").await.unwrap();
        log.append("second", "two").await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert_eq!(content.matches("\n--- ").count(), 2);
        let first = content.find("User: first").unwrap();
        let second = content.find("User: second").unwrap();
        assert!(first < second);
        assert!(content.ends_with("Assistant: two\n"));
    }
}
