//! Source readers.
//!
//! Given a configured source name, [`Reader::read`] returns the raw table
//! for that source. Fetching is synchronous; retry and backoff, if
//! wanted, belong to whatever invokes the pipeline, not here.

pub mod api_json;
pub mod csv_table;

use std::path::Path;

use dq_model::{DqError, PipelineConfig, Result, SourceConfig, SourceKind, Table};

pub use api_json::{fetch_json_table, table_from_json};
pub use csv_table::read_csv_table;

pub struct Reader<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Reader<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Fetches the raw table for a configured source name.
    pub fn read(&self, name: &str) -> Result<Table> {
        let source = self
            .config
            .source(name)
            .ok_or_else(|| DqError::SourceNotFound(name.to_string()))?;
        self.read_source(source)
    }

    pub fn read_source(&self, source: &SourceConfig) -> Result<Table> {
        match source.kind {
            SourceKind::Csv => read_csv_table(&source.name, Path::new(&source.location)),
            SourceKind::ApiJson => fetch_json_table(&source.name, &source.location),
        }
    }
}
