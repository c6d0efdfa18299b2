//! Business-rule filtering.
//!
//! Rules are an ordered list of boolean predicates applied as a
//! conjunction: a row stays valid only by satisfying every rule. A
//! malformed rule aborts validation for the whole source — a broken rule
//! cannot be partially trusted.

use dq_expr::Expr;
use dq_model::{DqError, Partition, Result, Table, Value};

/// Partitions `table` into rows satisfying every rule and rows failing at
/// least one. A row lands in `rejected` exactly once no matter how many
/// rules it violates.
pub fn validate_rules(table: Table, rules: &[String]) -> Result<Partition> {
    let compiled: Vec<(&String, Expr)> = rules
        .iter()
        .map(|raw| Expr::parse(raw).map(|expr| (raw, expr)))
        .collect::<Result<_>>()?;
    for (_, expr) in &compiled {
        expr.check_fields(&table.columns)?;
    }

    let mut mask = Vec::with_capacity(table.len());
    for row in &table.rows {
        let mut keep = true;
        for (raw, expr) in &compiled {
            match expr.eval(row)? {
                Value::Bool(true) => {}
                Value::Bool(false) | Value::Null => {
                    keep = false;
                    break;
                }
                other => {
                    return Err(DqError::Expression(format!(
                        "rule `{raw}` produced {}, expected a boolean",
                        other.type_name()
                    )));
                }
            }
        }
        mask.push(keep);
    }

    let rejected = mask.iter().filter(|keep| !**keep).count();
    if rejected > 0 {
        tracing::debug!(rejected, rules = rules.len(), "rows failed business rules");
    }
    Ok(Partition::split_by_mask(table, &mask))
}
