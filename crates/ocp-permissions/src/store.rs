//! Reads and writes the host configuration file.

use crate::document::ConfigDocument;
use ocp_types::ConfigFileError;
use std::path::{Path, PathBuf};

/// The project's `opencode.json`. Read fresh on every load; nothing is cached.
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    path: PathBuf,
}

impl ConfigFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and normalize the document.
    ///
    /// A missing or unreadable file counts as `{}`. Invalid JSON is an error.
    pub async fn load(&self) -> Result<ConfigDocument, ConfigFileError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => "{}".to_string(),
            Err(e) => {
                tracing::warn!("Failed to read {}, starting empty: {}", self.path.display(), e);
                "{}".to_string()
            }
        };

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ConfigFileError::Parse {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(ConfigDocument::normalize(value))
    }

    /// Overwrite the file with `doc` as 2-space pretty JSON (atomic write: .tmp → rename).
    ///
    /// A symlinked config is written through to its target, so the link survives.
    pub async fn save(&self, doc: &ConfigDocument) -> Result<(), ConfigFileError> {
        let json = serde_json::to_string_pretty(doc)?;
        let target = tokio::fs::canonicalize(&self.path)
            .await
            .unwrap_or_else(|_| self.path.clone());
        let tmp_path = temp_path(&target);
        let write_err = |source| ConfigFileError::Write {
            path: self.path.display().to_string(),
            source,
        };
        tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &target)
            .await
            .map_err(write_err)?;
        Ok(())
    }
}

/// Hidden sibling of `target`: `opencode.json` → `.opencode.json.tmp`.
fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.tmp"))
}
