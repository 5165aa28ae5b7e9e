//! Local file backend.
//!
//! Reads a JSON array or newline-delimited JSON export from disk. A
//! directory path is treated as a data root laid out as
//! `<root>/<database>/<collection>.jsonl` (or `.json`).

use super::{parse_documents, SourceError, SourceOptions, SurveySource};
use crate::models::SurveyRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Survey documents stored on the local filesystem.
pub struct FileSource {
    path: PathBuf,
    database: String,
    collection: String,
}

impl FileSource {
    pub fn new(path: PathBuf, options: &SourceOptions) -> Self {
        Self {
            path,
            database: options.database.clone(),
            collection: options.collection.clone(),
        }
    }

    /// Resolve the concrete file to read.
    fn resolve(&self) -> Result<PathBuf, SourceError> {
        if !self.path.is_dir() {
            return if self.path.exists() {
                Ok(self.path.clone())
            } else {
                Err(SourceError::NotFound(self.path.clone()))
            };
        }

        let base = self.path.join(&self.database);
        ["jsonl", "json"]
            .iter()
            .map(|ext| base.join(format!("{}.{}", self.collection, ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| SourceError::NotFound(base.join(&self.collection)))
    }
}

async fn read_body(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl SurveySource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<SurveyRecord>, SourceError> {
        let path = self.resolve()?;
        debug!("Reading survey documents from {}", path.display());

        let body = read_body(&path).await?;
        parse_documents(&body)
    }
}
