//! JSON-over-HTTP ingestion.
//!
//! The body is either a top-level array of row objects or an object
//! carrying a `rows` array (the shape SQL-over-HTTP services such as
//! Carto return). Cells must be scalar; the table model has no nested
//! values.

use dq_model::{DqError, Result, Row, Table, Value};

fn fetch_error(source: &str, reason: impl ToString) -> DqError {
    DqError::Fetch {
        src: source.to_string(),
        reason: reason.to_string(),
    }
}

pub fn fetch_json_table(source: &str, url: &str) -> Result<Table> {
    let response = reqwest::blocking::get(url).map_err(|e| fetch_error(source, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(source, format!("status {status}")));
    }
    let body: serde_json::Value = response.json().map_err(|e| fetch_error(source, e))?;
    let table = table_from_json(source, &body)?;
    tracing::debug!(source, rows = table.len(), "fetched api table");
    Ok(table)
}

/// Builds a table from a decoded JSON body. Column order is first-seen
/// order across rows.
pub fn table_from_json(source: &str, body: &serde_json::Value) -> Result<Table> {
    let rows = match body {
        serde_json::Value::Array(rows) => rows.as_slice(),
        serde_json::Value::Object(map) => match map.get("rows") {
            Some(serde_json::Value::Array(rows)) => rows.as_slice(),
            _ => {
                return Err(fetch_error(
                    source,
                    "expected a JSON array of rows or an object with a `rows` array",
                ));
            }
        },
        _ => {
            return Err(fetch_error(
                source,
                "expected a JSON array of rows or an object with a `rows` array",
            ));
        }
    };

    let mut table = Table::new(Vec::new());
    for (idx, raw) in rows.iter().enumerate() {
        let object = raw.as_object().ok_or_else(|| {
            fetch_error(source, format!("row {idx} is not a JSON object"))
        })?;
        let mut row = Row::new();
        for (field, value) in object {
            table.ensure_column(field);
            row.set(field.clone(), scalar(source, field, value)?);
        }
        table.push_row(row);
    }
    Ok(table)
}

fn scalar(source: &str, field: &str, value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(v) => Ok(Value::Bool(*v)),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::Int(v))
            } else if let Some(v) = n.as_f64() {
                Ok(Value::Float(v))
            } else {
                Err(fetch_error(source, format!("field `{field}`: unrepresentable number {n}")))
            }
        }
        serde_json::Value::String(v) => Ok(Value::Text(v.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(fetch_error(
            source,
            format!("field `{field}` holds a nested value; only scalars are supported"),
        )),
    }
}
