//! Document loading

use netops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

const EXTENSIONS: &[&str] = &["txt", "md"];

/// A source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name the text was read from
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Read every `.txt` and `.md` file directly under `dir`, sorted by file name.
///
/// Files that are not valid UTF-8 are skipped with a warning.
pub async fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        Error::not_found(format!(
            "Document directory {} cannot be read: {}",
            dir.display(),
            e
        ))
    })?;

    let mut documents = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            continue;
        }

        let source = entry.file_name().to_string_lossy().into_owned();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(source = %source, bytes = text.len(), "Loaded document");
                documents.push(Document::new(source, text));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
        }
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_supported_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "# B").unwrap();
        std::fs::write(dir.path().join("a.txt"), "A").unwrap();
        std::fs::write(dir.path().join("c.pdf"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();
        std::fs::write(dir.path().join("bad.txt"), [0xffu8, 0xfe]).unwrap();

        let docs = load_documents(dir.path()).await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.md"]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let err = load_documents(Path::new("/nonexistent/netops-docs"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), netops_core::ErrorKind::NotFound);
    }
}
