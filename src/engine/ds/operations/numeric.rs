//! Arithmetic, bitwise and boolean coercions over the two numeric kinds.
//!
//! Integer/integer operations stay integral; as soon as either operand is a
//! float the operation widens to `f64`.

use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::value::Value;

pub fn number_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(d) => Some(*d),
        _ => None,
    }
}

fn apply_numeric_op<F, G>(
    op_name: &str,
    left: &Value,
    right: &Value,
    int_op: F,
    float_op: G,
) -> ValueResult
where
    F: Fn(i64, i64) -> Option<i64>,
    G: Fn(f64, f64) -> f64,
{
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| {
                EvaluationError::ArgumentError(format!(
                    "Integer overflow or division by zero in '{}' of {} and {}.",
                    op_name, a, b
                ))
            }),
        (a, b) => {
            let a = number_to_f64(a);
            let b = number_to_f64(b);
            match (a, b) {
                (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
                _ => Err(EvaluationError::TypeMismatch(format!(
                    "Cannot apply '{}' to instances of '{}' and '{}'.",
                    op_name,
                    left.type_name(),
                    right.type_name()
                ))),
            }
        }
    }
}

pub fn add(left: &Value, right: &Value) -> ValueResult {
    apply_numeric_op("+", left, right, |a, b| a.checked_add(b), |a, b| a + b)
}

pub fn subtract(left: &Value, right: &Value) -> ValueResult {
    apply_numeric_op("-", left, right, |a, b| a.checked_sub(b), |a, b| a - b)
}

pub fn multiply(left: &Value, right: &Value) -> ValueResult {
    apply_numeric_op("*", left, right, |a, b| a.checked_mul(b), |a, b| a * b)
}

pub fn divide(left: &Value, right: &Value) -> ValueResult {
    apply_numeric_op("/", left, right, |a, b| a.checked_div(b), |a, b| a / b)
}

pub fn modulus(left: &Value, right: &Value) -> ValueResult {
    apply_numeric_op("%", left, right, |a, b| a.checked_rem(b), |a, b| a % b)
}

pub fn negate(value: &Value) -> ValueResult {
    match value {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Float(d) => Ok(Value::Float(-d)),
        other => Err(EvaluationError::TypeMismatch(format!(
            "Cannot negate an instance of '{}'.",
            other.type_name()
        ))),
    }
}

fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        _ => None,
    }
}

fn apply_bitwise_op<F>(op_name: &str, left: &Value, right: &Value, op: F) -> ValueResult
where
    F: Fn(i64, i64) -> i64,
{
    match (integral(left), integral(right)) {
        (Some(a), Some(b)) => Ok(Value::Int(op(a, b))),
        _ => Err(EvaluationError::TypeMismatch(format!(
            "Cannot apply bitwise '{}' to instances of '{}' and '{}'.",
            op_name,
            left.type_name(),
            right.type_name()
        ))),
    }
}

pub fn bitwise_or(left: &Value, right: &Value) -> ValueResult {
    apply_bitwise_op("or", left, right, |a, b| a | b)
}

pub fn bitwise_and(left: &Value, right: &Value) -> ValueResult {
    apply_bitwise_op("and", left, right, |a, b| a & b)
}

pub fn bitwise_xor(left: &Value, right: &Value) -> ValueResult {
    apply_bitwise_op("xor", left, right, |a, b| a ^ b)
}

/// Coerces a value to boolean.
pub fn to_boolean(value: &Value) -> Result<bool, EvaluationError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(d) => Ok(*d != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(EvaluationError::TypeMismatch(format!(
                "Cannot convert string '{}' to a boolean.",
                s
            ))),
        },
        other => Err(EvaluationError::TypeMismatch(format!(
            "Cannot convert an instance of '{}' to a boolean.",
            other.type_name()
        ))),
    }
}
