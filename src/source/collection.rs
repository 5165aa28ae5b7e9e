//! Loaded collection snapshot and result cursors.

use super::{SourceError, SurveySource};
use crate::models::SurveyRecord;
use crate::pipeline::Pipeline;
use tracing::{debug, info};

/// An immutable, fully loaded snapshot of a survey collection.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    records: Vec<SurveyRecord>,
}

impl Collection {
    /// Load every document from `source`.
    pub async fn open(source: &dyn SurveySource, name: &str) -> Result<Self, SourceError> {
        info!("Loading collection '{}' from {}", name, source.describe());
        let records = source.fetch().await?;
        info!("Loaded {} records", records.len());
        Ok(Self::from_records(name, records))
    }

    pub fn from_records(name: &str, records: Vec<SurveyRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records in the snapshot.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Run a pipeline and return a cursor over its result documents.
    pub fn aggregate<P: Pipeline>(&self, pipeline: &P) -> Cursor<P::Output> {
        let results = pipeline.execute(&self.records);
        debug!(
            "Pipeline '{}' produced {} documents from '{}'",
            pipeline.name(),
            results.len(),
            self.name
        );
        Cursor::new(results)
    }
}

/// Single-pass sequence of pipeline results.
///
/// Re-running the pipeline is the only way to read results again.
#[derive(Debug)]
pub struct Cursor<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Cursor<T> {
    fn new(results: Vec<T>) -> Self {
        Self {
            inner: results.into_iter(),
        }
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Cursor<T> {}
