//! Schema conformance: type the declared columns, then enforce
//! primary-key completeness.

use std::collections::BTreeMap;

use dq_model::{DqError, Partition, Result, SemanticType, Table};

use crate::coerce::coerce_column;

/// Applies the declared schema to `table` and partitions it on primary-key
/// completeness.
///
/// Every field present in both the table and the schema is coerced in
/// place (best effort, no rows dropped). A row is then rejected iff any
/// primary-key field is null after coercion — for a composite key, all
/// parts are required.
pub fn validate_schema(
    mut table: Table,
    schema: &BTreeMap<String, SemanticType>,
    primary_key: &[String],
) -> Result<Partition> {
    for field in primary_key {
        if !schema.contains_key(field) {
            return Err(DqError::Config(format!(
                "primary key field `{field}` is not in the schema"
            )));
        }
    }

    let declared: Vec<(String, SemanticType)> = table
        .columns
        .iter()
        .filter_map(|c| schema.get(c).map(|t| (c.clone(), *t)))
        .collect();
    for (field, target) in declared {
        let already = coerce_column(&mut table, &field, target)?;
        if !already {
            tracing::debug!(field = %field, target = ?target, "coerced column");
        }
    }

    Ok(Partition::split(table, |row| {
        primary_key.iter().all(|field| !row.is_null(field))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_model::{Row, Value};

    fn schema(fields: &[(&str, SemanticType)]) -> BTreeMap<String, SemanticType> {
        fields
            .iter()
            .map(|(name, t)| ((*name).to_string(), *t))
            .collect()
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn null_primary_key_rejects_row_regardless_of_other_fields() {
        let mut table = Table::new(vec!["id".to_string(), "zip_code".to_string()]);
        table.push_row(row(&[("id", Value::Int(1)), ("zip_code", Value::Int(19020))]));
        table.push_row(row(&[("id", Value::Null), ("zip_code", Value::Int(19100))]));
        table.push_row(row(&[("id", Value::Int(3)), ("zip_code", Value::Null)]));

        let schema = schema(&[
            ("id", SemanticType::Integer),
            ("zip_code", SemanticType::Integer),
        ]);
        let partition =
            validate_schema(table, &schema, &["id".to_string()]).expect("validate");

        assert_eq!(partition.valid.len(), 2);
        assert_eq!(partition.rejected.len(), 1);
        assert!(partition.rejected.rows[0].is_null("id"));
    }

    #[test]
    fn composite_key_requires_every_part() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(row(&[("a", Value::Int(1)), ("b", Value::Int(1))]));
        table.push_row(row(&[("a", Value::Int(2)), ("b", Value::Null)]));
        table.push_row(row(&[("a", Value::Null), ("b", Value::Int(3))]));

        let schema = schema(&[("a", SemanticType::Integer), ("b", SemanticType::Integer)]);
        let partition =
            validate_schema(table, &schema, &["a".to_string(), "b".to_string()])
                .expect("validate");

        assert_eq!(partition.valid.len(), 1);
        assert_eq!(partition.rejected.len(), 2);
    }

    #[test]
    fn coercion_happens_before_the_key_check() {
        // A key arriving as unparseable text coerces to null and the row
        // is rejected; numeric text passes.
        let mut table = Table::new(vec!["id".to_string()]);
        table.push_row(row(&[("id", Value::Text("7".to_string()))]));
        table.push_row(row(&[("id", Value::Text("seven".to_string()))]));

        let schema = schema(&[("id", SemanticType::Integer)]);
        let partition = validate_schema(table, &schema, &["id".to_string()]).expect("validate");

        assert_eq!(partition.valid.len(), 1);
        assert_eq!(partition.valid.rows[0].get("id"), &Value::Int(7));
        assert_eq!(partition.rejected.len(), 1);
    }

    #[test]
    fn primary_key_outside_schema_is_a_config_error() {
        let table = Table::new(vec!["id".to_string()]);
        let schema = schema(&[("zip_code", SemanticType::Integer)]);
        let err = validate_schema(table, &schema, &["id".to_string()])
            .expect_err("pk not in schema");
        assert!(matches!(err, DqError::Config(_)), "got {err:?}");
    }

    #[test]
    fn undeclared_columns_pass_through_untouched() {
        let mut table = Table::new(vec!["id".to_string(), "note".to_string()]);
        table.push_row(row(&[
            ("id", Value::Int(1)),
            ("note", Value::Text("keep me".to_string())),
        ]));

        let schema = schema(&[("id", SemanticType::Integer)]);
        let partition = validate_schema(table, &schema, &["id".to_string()]).expect("validate");

        assert_eq!(
            partition.valid.rows[0].get("note"),
            &Value::Text("keep me".to_string())
        );
    }
}
