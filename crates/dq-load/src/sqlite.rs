//! SQLite sink.
//!
//! Loading drops and recreates the target table inside one transaction.
//! Column affinities are inferred from the data since the sink never sees
//! the source schema.

use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

use dq_model::{DqError, Result, Table, Value};

use crate::Loader;

pub struct SqliteLoader {
    conn: Connection,
}

impl SqliteLoader {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(persist)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(persist)?;
        Ok(Self { conn })
    }
}

impl Loader for SqliteLoader {
    fn load(&mut self, table: &Table, target: &str) -> Result<()> {
        let tx = self.conn.transaction().map_err(persist)?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(target)))
            .map_err(persist)?;

        // A table with no columns cannot exist in SQLite; replacing a
        // target with one means the target is simply gone.
        if !table.columns.is_empty() {
            let column_defs: Vec<String> = table
                .columns
                .iter()
                .map(|c| format!("{} {}", quote_ident(c), affinity(table, c)))
                .collect();
            tx.execute_batch(&format!(
                "CREATE TABLE {} ({})",
                quote_ident(target),
                column_defs.join(", ")
            ))
            .map_err(persist)?;

            let column_names: Vec<String> =
                table.columns.iter().map(|c| quote_ident(c)).collect();
            let placeholders = vec!["?"; table.columns.len()].join(", ");
            let insert = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(target),
                column_names.join(", "),
                placeholders
            );
            let mut stmt = tx.prepare(&insert).map_err(persist)?;
            for row in &table.rows {
                let cells: Vec<SqlCell<'_>> =
                    table.columns.iter().map(|c| SqlCell(row.get(c))).collect();
                stmt.execute(rusqlite::params_from_iter(cells))
                    .map_err(persist)?;
            }
            drop(stmt);
        }

        tx.commit().map_err(persist)?;
        tracing::info!(target, rows = table.len(), "replaced target table");
        Ok(())
    }
}

fn persist(error: rusqlite::Error) -> DqError {
    DqError::Persistence(error.to_string())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// TEXT if any cell is text, REAL if any is a float, INTEGER for
/// integer/boolean columns, TEXT for all-null columns.
fn affinity(table: &Table, column: &str) -> &'static str {
    let mut any_int = false;
    let mut any_float = false;
    for row in &table.rows {
        match row.get(column) {
            Value::Text(_) => return "TEXT",
            Value::Float(_) => any_float = true,
            Value::Int(_) | Value::Bool(_) => any_int = true,
            Value::Null => {}
        }
    }
    if any_float {
        "REAL"
    } else if any_int {
        "INTEGER"
    } else {
        "TEXT"
    }
}

struct SqlCell<'a>(&'a Value);

impl ToSql for SqlCell<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*v))),
            Value::Int(v) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*v)),
            Value::Float(v) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}
