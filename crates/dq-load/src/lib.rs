//! Persistence sinks.
//!
//! A loader durably replaces a named target with a table — replace, not
//! append. Each load is atomic for its own target, so a failed write
//! never corrupts targets written earlier in the run.

pub mod sqlite;

use std::collections::BTreeMap;

use dq_model::{Result, Table};

pub use sqlite::SqliteLoader;

pub trait Loader {
    fn load(&mut self, table: &Table, target: &str) -> Result<()>;
}

/// Keeps loaded tables in a map. Backs `--dry-run` and tests.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    pub tables: BTreeMap<String, Table>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Loader for MemoryLoader {
    fn load(&mut self, table: &Table, target: &str) -> Result<()> {
        self.tables.insert(target.to_string(), table.clone());
        Ok(())
    }
}
