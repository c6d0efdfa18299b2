//! Row-context evaluation.
//!
//! Null handling: arithmetic involving null yields null, as does division
//! by zero. Ordering comparisons against null are false; `==`/`!=` treat
//! null as equal only to null. Logical operators require booleans and
//! count null as false. Text may be compared to text but never to a
//! number; mixing kinds under any comparison is an error.

use dq_model::{DqError, Result, Row, Value};

use crate::parser::{BinaryOp, Expr, UnaryOp};

impl Expr {
    /// Evaluates against one row. A field absent from the row reads as
    /// null; use [`Expr::check_fields`] beforehand to reject references to
    /// columns the table does not have.
    pub fn eval(&self, row: &Row) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Field(name) => Ok(row.get(name).clone()),
            Expr::Unary { op, operand } => {
                let value = operand.eval(row)?;
                apply_unary(*op, value)
            }
            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    if !truthy(op, lhs.eval(row)?)? {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(truthy(op, rhs.eval(row)?)?))
                }
                BinaryOp::Or => {
                    if truthy(op, lhs.eval(row)?)? {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(truthy(op, rhs.eval(row)?)?))
                }
                _ => {
                    let left = lhs.eval(row)?;
                    let right = rhs.eval(row)?;
                    apply_binary(*op, left, right)
                }
            },
        }
    }
}

fn apply_unary(op: UnaryOp, value: Value) -> Result<Value> {
    match op {
        UnaryOp::Neg => match value {
            Value::Null => Ok(Value::Null),
            Value::Int(v) => Ok(Value::Int(-v)),
            Value::Float(v) => Ok(Value::Float(-v)),
            other => Err(DqError::Expression(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        },
        UnaryOp::Not => match value {
            Value::Null => Ok(Value::Bool(true)),
            Value::Bool(v) => Ok(Value::Bool(!v)),
            other => Err(DqError::Expression(format!(
                "`not` requires a boolean, got {}",
                other.type_name()
            ))),
        },
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, left, right)
        }
        BinaryOp::Eq => equality(left, right).map(Value::Bool),
        BinaryOp::Ne => equality(left, right).map(|eq| Value::Bool(!eq)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => ordering(op, left, right),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled with short-circuit in eval"),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let type_error = || {
        DqError::Expression(format!(
            "cannot apply `{}` to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))
    };
    // Division always happens in floating point; zero divisor yields null.
    if op == BinaryOp::Div {
        let (l, r) = match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(type_error()),
        };
        if r == 0.0 {
            return Ok(Value::Null);
        }
        return Ok(Value::Float(l / r));
    }
    if let (Value::Int(l), Value::Int(r)) = (&left, &right) {
        let result = match op {
            BinaryOp::Add => l.checked_add(*r),
            BinaryOp::Sub => l.checked_sub(*r),
            BinaryOp::Mul => l.checked_mul(*r),
            _ => unreachable!(),
        };
        return Ok(result.map_or(Value::Null, Value::Int));
    }
    let (l, r) = match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(type_error()),
    };
    let result = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        _ => unreachable!(),
    };
    Ok(Value::Float(result))
}

fn equality(left: Value, right: Value) -> Result<bool> {
    match (&left, &right) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::Bool(l), Value::Bool(r)) => Ok(l == r),
        (Value::Text(l), Value::Text(r)) => Ok(l == r),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => Ok(l == r),
            _ => Err(DqError::Expression(format!(
                "cannot compare {} to {}",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn ordering(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Bool(false));
    }
    let cmp = match (&left, &right) {
        (Value::Text(l), Value::Text(r)) => l.cmp(r),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => {
                let result = match op {
                    BinaryOp::Lt => l < r,
                    BinaryOp::Le => l <= r,
                    BinaryOp::Gt => l > r,
                    BinaryOp::Ge => l >= r,
                    _ => unreachable!(),
                };
                return Ok(Value::Bool(result));
            }
            _ => {
                return Err(DqError::Expression(format!(
                    "cannot compare {} to {}",
                    left.type_name(),
                    right.type_name()
                )));
            }
        },
    };
    let result = match op {
        BinaryOp::Lt => cmp.is_lt(),
        BinaryOp::Le => cmp.is_le(),
        BinaryOp::Gt => cmp.is_gt(),
        BinaryOp::Ge => cmp.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn truthy(op: &BinaryOp, value: Value) -> Result<bool> {
    match value {
        Value::Bool(v) => Ok(v),
        Value::Null => Ok(false),
        other => Err(DqError::Expression(format!(
            "`{}` requires boolean operands, got {}",
            op.symbol(),
            other.type_name()
        ))),
    }
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

    fn eval(input: &str, row: &Row) -> Result<Value> {
        Expr::parse(input)?.eval(row)
    }

    #[test]
    fn zip_code_range_rule() {
        let inside = row(&[("zip_code", Value::Int(19020))]);
        let outside = row(&[("zip_code", Value::Int(18000))]);
        let rule = "zip_code >= 19019 and zip_code <= 19160";
        assert_eq!(eval(rule, &inside).unwrap(), Value::Bool(true));
        assert_eq!(eval(rule, &outside).unwrap(), Value::Bool(false));
    }

    #[test]
    fn division_is_floating_point() {
        let r = row(&[
            ("num_bll_5plus", Value::Int(2)),
            ("num_screen", Value::Int(150)),
        ]);
        let result = eval("num_bll_5plus / num_screen * 100", &r).unwrap();
        assert_eq!(result, Value::Float(2.0 / 150.0 * 100.0));
    }

    #[test]
    fn division_by_zero_yields_null() {
        let r = row(&[("a", Value::Int(1)), ("b", Value::Int(0))]);
        assert_eq!(eval("a / b", &r).unwrap(), Value::Null);
        assert_eq!(eval("a / 0.0", &r).unwrap(), Value::Null);
    }

    #[test]
    fn null_propagates_through_arithmetic() {
        let r = row(&[("a", Value::Null)]);
        assert_eq!(eval("a + 1", &r).unwrap(), Value::Null);
        assert_eq!(eval("a * 2 - 3", &r).unwrap(), Value::Null);
        assert_eq!(eval("-a", &r).unwrap(), Value::Null);
    }

    #[test]
    fn ordering_against_null_is_false() {
        let r = row(&[("zip_code", Value::Null)]);
        assert_eq!(eval("zip_code >= 19019", &r).unwrap(), Value::Bool(false));
        assert_eq!(eval("zip_code < 19019", &r).unwrap(), Value::Bool(false));
    }

    #[test]
    fn null_equality() {
        let r = row(&[("a", Value::Null), ("b", Value::Int(1))]);
        assert_eq!(eval("a == a", &r).unwrap(), Value::Bool(true));
        assert_eq!(eval("a == b", &r).unwrap(), Value::Bool(false));
        assert_eq!(eval("a != b", &r).unwrap(), Value::Bool(true));
    }

    #[test]
    fn int_and_float_compare_numerically() {
        let r = row(&[("a", Value::Int(5)), ("b", Value::Float(5.0))]);
        assert_eq!(eval("a == b", &r).unwrap(), Value::Bool(true));
        assert_eq!(eval("a + b", &r).unwrap(), Value::Float(10.0));
    }

    #[test]
    fn text_to_number_comparison_is_an_error() {
        let r = row(&[("name", Value::Text("west".to_string()))]);
        assert!(eval("name > 5", &r).is_err());
        assert!(eval("name == 5", &r).is_err());
        assert!(eval("name + 1", &r).is_err());
    }

    #[test]
    fn text_to_text_comparison_works() {
        let r = row(&[("name", Value::Text("west".to_string()))]);
        assert_eq!(eval("name == 'west'", &r).unwrap(), Value::Bool(true));
        assert_eq!(eval("name < 'zed'", &r).unwrap(), Value::Bool(true));
    }

    #[test]
    fn logic_requires_booleans_and_short_circuits() {
        let r = row(&[("flag", Value::Bool(true)), ("n", Value::Int(1))]);
        assert!(eval("n and flag", &r).is_err());
        // Short-circuit: rhs never evaluated.
        assert_eq!(eval("flag or n > 0", &r).unwrap(), Value::Bool(true));
        assert_eq!(eval("not flag", &r).unwrap(), Value::Bool(false));
    }

    #[test]
    fn null_is_false_in_logical_context() {
        let r = row(&[("flag", Value::Null)]);
        assert_eq!(eval("flag or true", &r).unwrap(), Value::Bool(true));
        assert_eq!(eval("flag and true", &r).unwrap(), Value::Bool(false));
        assert_eq!(eval("not flag", &r).unwrap(), Value::Bool(true));
    }
}
