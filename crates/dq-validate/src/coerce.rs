//! Best-effort column typing.
//!
//! Conversion is per value: a cell that cannot be converted to a numeric
//! or boolean target becomes null instead of rejecting the row. The text
//! target is total. The replacement column is materialized in full before
//! it is committed to the table, so no failure can leave a column half
//! converted.

use dq_model::{Result, SemanticType, Table, Value, format_numeric};

/// Coerces one column to `target`, in place. Returns `Ok(true)` when the
/// column already satisfied the target and nothing was touched.
pub fn coerce_column(table: &mut Table, field: &str, target: SemanticType) -> Result<bool> {
    if column_matches(table, field, target) {
        return Ok(true);
    }
    let converted: Vec<Value> = table
        .rows
        .iter()
        .map(|row| convert(row.get(field), target))
        .collect();
    for (row, value) in table.rows.iter_mut().zip(converted) {
        row.set(field, value);
    }
    Ok(false)
}

/// True when every cell in the column is null or already of the target type.
fn column_matches(table: &Table, field: &str, target: SemanticType) -> bool {
    table
        .rows
        .iter()
        .all(|row| matches_type(row.get(field), target))
}

fn matches_type(value: &Value, target: SemanticType) -> bool {
    match (value, target) {
        (Value::Null, _) => true,
        (Value::Int(_), SemanticType::Integer) => true,
        (Value::Float(_), SemanticType::Float) => true,
        (Value::Bool(_), SemanticType::Boolean) => true,
        (Value::Text(_), SemanticType::Text) => true,
        _ => false,
    }
}

fn convert(value: &Value, target: SemanticType) -> Value {
    match target {
        SemanticType::Integer => to_integer(value),
        SemanticType::Float => to_float(value),
        SemanticType::Boolean => to_boolean(value),
        SemanticType::Text => to_text(value),
    }
}

fn to_integer(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Int(v) => Value::Int(*v),
        Value::Float(v) => float_to_int(*v),
        Value::Bool(v) => Value::Int(i64::from(*v)),
        Value::Text(raw) => {
            let trimmed = raw.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                Value::Int(v)
            } else if let Ok(v) = trimmed.parse::<f64>() {
                float_to_int(v)
            } else {
                Value::Null
            }
        }
    }
}

// Whole-valued floats (and numeric text like "3.0") become integers;
// anything fractional becomes null rather than silently truncating.
fn float_to_int(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Value::Int(v as i64)
    } else {
        Value::Null
    }
}

fn to_float(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Float(v) => Value::Float(*v),
        Value::Int(v) => Value::Float(*v as f64),
        Value::Bool(v) => Value::Float(if *v { 1.0 } else { 0.0 }),
        Value::Text(raw) => match raw.trim().parse::<f64>() {
            Ok(v) => Value::Float(v),
            Err(_) => Value::Null,
        },
    }
}

fn to_boolean(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(v) => Value::Bool(*v),
        Value::Int(0) => Value::Bool(false),
        Value::Int(1) => Value::Bool(true),
        Value::Int(_) => Value::Null,
        Value::Float(v) if *v == 0.0 => Value::Bool(false),
        Value::Float(v) if *v == 1.0 => Value::Bool(true),
        Value::Float(_) => Value::Null,
        Value::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "1" => Value::Bool(true),
            "false" | "f" | "no" | "0" => Value::Bool(false),
            _ => Value::Null,
        },
    }
}

fn to_text(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(v) => Value::Text(v.clone()),
        Value::Bool(v) => Value::Text(v.to_string()),
        Value::Int(v) => Value::Text(v.to_string()),
        Value::Float(v) => Value::Text(format_numeric(*v)),
    }
}
