//! CSV file ingestion.
//!
//! Every cell arrives as text (empty cells as null); typing is the
//! validation stage's job, not the reader's.

use std::path::Path;

use dq_model::{DqError, Result, Row, Table, Value};

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

pub fn read_csv_table(source: &str, path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| DqError::Fetch {
            src: source.to_string(),
            reason: format!("open {}: {error}", path.display()),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| DqError::Fetch {
            src: source.to_string(),
            reason: format!("read headers: {error}"),
        })?
        .iter()
        .map(|h| normalize_cell(h).to_string())
        .collect();

    let mut table = Table::new(headers.clone());
    for record in reader.records() {
        let record = record.map_err(|error| DqError::Fetch {
            src: source.to_string(),
            reason: format!("read record: {error}"),
        })?;
        let mut row = Row::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = normalize_cell(record.get(idx).unwrap_or(""));
            let cell = if value.is_empty() {
                Value::Null
            } else {
                Value::Text(value.to_string())
            };
            row.set(header.clone(), cell);
        }
        table.push_row(row);
    }

    tracing::debug!(source, rows = table.len(), "read csv table");
    Ok(table)
}
