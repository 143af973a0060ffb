//! Record providers.
//!
//! Reports never talk to a CRM backend directly. They pull records
//! through the [`RecordSource`] trait, so the same report code runs
//! against an in-memory set, a fixture file, or a real store. Access
//! control is the provider's problem; everything downstream assumes the
//! fetched records are already visible to the caller.

use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::Record;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Source of records for report building.
pub trait RecordSource {
    /// Returns the records matching `filter`.
    fn fetch(&self, filter: &Filter) -> ReportResult<Vec<Record>>;
}

/// Record source backed by a vector, used for fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Record>,
}

impl InMemorySource {
    /// Creates a source over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records held, before any filtering.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self, filter: &Filter) -> ReportResult<Vec<Record>> {
        filter.validate()?;
        let fetched: Vec<Record> = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        debug!(held = self.records.len(), fetched = fetched.len(), "fetched records");
        Ok(fetched)
    }
}

/// Loads records from a JSON array file.
///
/// This is the usual way to feed exported or seeded CRM data into the
/// report builders.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;

    debug!(count = records.len(), path = %path.display(), "loaded records");
    Ok(records)
}
