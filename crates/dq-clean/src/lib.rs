//! Table repair: deduplication followed by ordered imputation.
//!
//! Deduplication runs first so that fills cannot mask true duplicates or
//! manufacture false ones. Imputation is ordered and stateful on purpose:
//! a later formula observes values written by an earlier fill, which lets
//! recipes compose (fill a count with a default, then derive a percentage
//! from that count).

use std::collections::BTreeSet;

use dq_expr::Expr;
use dq_model::{ImputationRule, Result, Row, Table, Value};

/// Cleans `table` in place: removes exact-duplicate rows (when `dedup` is
/// set), then applies the imputation rules in declared order. This is the
/// one stage with a documented in-place mutation contract; everything the
/// caller held before the call is superseded by the cleaned table.
pub fn clean(table: &mut Table, dedup: bool, rules: &[ImputationRule]) -> Result<()> {
    if dedup {
        let before = table.len();
        drop_duplicates(table);
        let removed = before - table.len();
        if removed > 0 {
            tracing::debug!(removed, "dropped duplicate rows");
        }
    }

    for rule in rules {
        match rule {
            ImputationRule::Constant { field, value } => {
                table.ensure_column(field);
                for row in &mut table.rows {
                    if row.is_null(field) {
                        row.set(field.clone(), value.clone());
                    }
                }
            }
            ImputationRule::Formula { field, expression } => {
                let expr = Expr::parse(expression)?;
                expr.check_fields(&table.columns)?;
                table.ensure_column(field);
                for row in &mut table.rows {
                    // Only null cells change; an existing value is never
                    // overwritten by a formula.
                    if row.is_null(field) {
                        let value = expr.eval(row)?;
                        row.set(field.clone(), value);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Removes rows that are exact duplicates across all fields, keeping the
/// first occurrence in original order.
fn drop_duplicates(table: &mut Table) {
    let mut seen = BTreeSet::new();
    let columns = table.columns.clone();
    table.rows.retain(|row| {
        let key = row_key(row, &columns);
        seen.insert(key)
    });
}

// Canonical per-row key: cell values encoded in column order with a type
// tag, text length-prefixed so no cell content can fake a boundary.
// Floats compare by bit pattern, so 0.0 and -0.0 are distinct rows.
fn row_key(row: &Row, columns: &[String]) -> String {
    let mut key = String::new();
    for column in columns {
        match row.get(column) {
            Value::Null => key.push('n'),
            Value::Bool(v) => {
                key.push('b');
                key.push(if *v { '1' } else { '0' });
            }
            Value::Int(v) => {
                key.push('i');
                key.push_str(&v.to_string());
            }
            Value::Float(v) => {
                key.push('f');
                key.push_str(&v.to_bits().to_string());
            }
            Value::Text(v) => {
                key.push('t');
                key.push_str(&v.len().to_string());
                key.push(':');
                key.push_str(v);
            }
        }
        key.push('\u{1f}');
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn column(table: &Table, field: &str) -> Vec<Value> {
        table.rows.iter().map(|r| r.get(field).clone()).collect()
    }

    #[test]
    fn duplicates_removed_keeping_first_occurrence() {
        let mut table = Table::new(vec!["id".to_string(), "zip".to_string()]);
        let a = row(&[("id", Value::Int(1)), ("zip", Value::Int(19020))]);
        let b = row(&[("id", Value::Int(2)), ("zip", Value::Int(19100))]);
        table.push_row(a.clone());
        table.push_row(b.clone());
        table.push_row(a.clone());

        clean(&mut table, true, &[]).expect("clean");
        assert_eq!(table.rows, vec![a, b]);
    }

    #[test]
    fn dedup_can_be_disabled() {
        let mut table = Table::new(vec!["id".to_string()]);
        let a = row(&[("id", Value::Int(1))]);
        table.push_row(a.clone());
        table.push_row(a);

        clean(&mut table, false, &[]).expect("clean");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rows_differing_only_in_null_are_not_duplicates() {
        let mut table = Table::new(vec!["id".to_string(), "zip".to_string()]);
        table.push_row(row(&[("id", Value::Int(1)), ("zip", Value::Int(19020))]));
        table.push_row(row(&[("id", Value::Int(1)), ("zip", Value::Null)]));

        clean(&mut table, true, &[]).expect("clean");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn constant_fill_replaces_only_nulls() {
        let mut table = Table::new(vec!["count".to_string()]);
        table.push_row(row(&[("count", Value::Int(5))]));
        table.push_row(row(&[("count", Value::Null)]));

        let rules = vec![ImputationRule::Constant {
            field: "count".to_string(),
            value: Value::Int(2),
        }];
        clean(&mut table, true, &rules).expect("clean");
        assert_eq!(column(&table, "count"), vec![Value::Int(5), Value::Int(2)]);
    }

    #[test]
    fn formula_fill_never_overwrites_existing_values() {
        let mut table = Table::new(vec!["count".to_string(), "screen".to_string(), "pct".to_string()]);
        table.push_row(row(&[
            ("count", Value::Int(5)),
            ("screen", Value::Int(100)),
            ("pct", Value::Float(99.0)),
        ]));
        table.push_row(row(&[
            ("count", Value::Int(10)),
            ("screen", Value::Int(200)),
            ("pct", Value::Null),
        ]));

        let rules = vec![ImputationRule::Formula {
            field: "pct".to_string(),
            expression: "count / screen * 100".to_string(),
        }];
        clean(&mut table, true, &rules).expect("clean");
        assert_eq!(
            column(&table, "pct"),
            vec![Value::Float(99.0), Value::Float(5.0)]
        );
    }

    #[test]
    fn later_formula_sees_earlier_constant_fill() {
        // The end-to-end recipe from the lead-levels source: default the
        // count, then derive the percentage from the defaulted count.
        let mut table =
            Table::new(vec!["count".to_string(), "screen".to_string(), "pct".to_string()]);
        for (count, screen) in [(Some(5), 100), (None, 150), (Some(10), 200)] {
            table.push_row(row(&[
                ("count", count.map_or(Value::Null, Value::Int)),
                ("screen", Value::Int(screen)),
                ("pct", Value::Null),
            ]));
        }

        let rules = vec![
            ImputationRule::Constant {
                field: "count".to_string(),
                value: Value::Int(2),
            },
            ImputationRule::Formula {
                field: "pct".to_string(),
                expression: "count / screen * 100".to_string(),
            },
        ];
        clean(&mut table, true, &rules).expect("clean");
        assert_eq!(
            column(&table, "pct"),
            vec![
                Value::Float(5.0),
                Value::Float(2.0 / 150.0 * 100.0),
                Value::Float(5.0)
            ]
        );
    }

    #[test]
    fn formula_can_target_a_brand_new_column() {
        let mut table = Table::new(vec!["balance".to_string(), "props".to_string()]);
        table.push_row(row(&[
            ("balance", Value::Float(1500.0)),
            ("props", Value::Int(3)),
        ]));

        let rules = vec![ImputationRule::Formula {
            field: "avg_balance".to_string(),
            expression: "balance / props".to_string(),
        }];
        clean(&mut table, true, &rules).expect("clean");
        assert!(table.has_column("avg_balance"));
        assert_eq!(column(&table, "avg_balance"), vec![Value::Float(500.0)]);
    }

    #[test]
    fn formula_division_by_zero_leaves_cell_null() {
        let mut table = Table::new(vec!["balance".to_string(), "props".to_string()]);
        table.push_row(row(&[
            ("balance", Value::Float(1500.0)),
            ("props", Value::Int(0)),
        ]));

        let rules = vec![ImputationRule::Formula {
            field: "avg_balance".to_string(),
            expression: "balance / props".to_string(),
        }];
        clean(&mut table, true, &rules).expect("clean");
        assert_eq!(column(&table, "avg_balance"), vec![Value::Null]);
    }

    #[test]
    fn malformed_formula_is_an_error() {
        let mut table = Table::new(vec!["a".to_string()]);
        table.push_row(row(&[("a", Value::Null)]));

        let rules = vec![ImputationRule::Formula {
            field: "a".to_string(),
            expression: "1 +".to_string(),
        }];
        assert!(clean(&mut table, true, &rules).is_err());
    }

    #[test]
    fn dedup_runs_before_imputation() {
        // Two rows identical except one null: after a constant fill they
        // would collide, but dedup happens first so both survive.
        let mut table = Table::new(vec!["count".to_string()]);
        table.push_row(row(&[("count", Value::Int(2))]));
        table.push_row(row(&[("count", Value::Null)]));

        let rules = vec![ImputationRule::Constant {
            field: "count".to_string(),
            value: Value::Int(2),
        }];
        clean(&mut table, true, &rules).expect("clean");
        assert_eq!(column(&table, "count"), vec![Value::Int(2), Value::Int(2)]);
    }
}
