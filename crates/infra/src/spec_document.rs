//! Static API description document, read from disk on every request.

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecDocumentError {
    #[error("spec document not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read spec document: {0}")]
    Read(#[from] std::io::Error),

    #[error("spec document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Handle to the externally supplied JSON document describing the API.
///
/// Nothing is cached: edits to the file show up on the next `load()`.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    path: PathBuf,
}

impl SpecDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<JsonValue, SpecDocumentError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SpecDocumentError::Missing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = SpecDocument::new(dir.path().join("spec.json"));

        let err = doc.load().await.unwrap_err();
        assert!(matches!(err, SpecDocumentError::Missing(_)));
    }

    #[tokio::test]
    async fn file_is_reread_on_every_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        let doc = SpecDocument::new(&path);

        std::fs::write(&path, r#"{"openapi":"3.0.0","info":{"title":"v1"}}"#).unwrap();
        assert_eq!(doc.load().await.unwrap()["info"]["title"], "v1");

        std::fs::write(&path, r#"{"openapi":"3.0.0","info":{"title":"v2"}}"#).unwrap();
        assert_eq!(doc.load().await.unwrap()["info"]["title"], "v2");
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SpecDocument::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SpecDocumentError::Malformed(_)));
    }
}
