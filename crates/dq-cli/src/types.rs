//! Result types shared by the pipeline and the summary printer.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// What happened to one configured source.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub name: String,
    pub target_table: String,
    pub loaded: usize,
    pub schema_rejected: usize,
    pub rule_rejected: usize,
    /// Set when the source failed; the counts above are zero in that case.
    pub error: Option<String>,
}

impl SourceOutcome {
    pub fn failed(name: &str, target_table: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            target_table: target_table.to_string(),
            loaded: 0,
            schema_rejected: 0,
            rule_rejected: 0,
            error: Some(error),
        }
    }
}

/// Outcome of one whole pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub sources: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.sources.iter().any(|s| s.error.is_some())
    }

    pub fn total_loaded(&self) -> usize {
        self.sources.iter().map(|s| s.loaded).sum()
    }
}
