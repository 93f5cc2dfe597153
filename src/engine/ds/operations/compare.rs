//! Cross-type ordering used by the comparison operators and by the
//! max/min/sort aggregates. Null orders below everything else.

use std::cmp::Ordering;

use crate::engine::ds::error::EvaluationError;
use crate::engine::ds::operations::numeric::number_to_f64;
use crate::engine::ds::value::Value;

pub fn compare(left: &Value, right: &Value) -> Result<Ordering, EvaluationError> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Null, _) => Ok(Ordering::Less),
        (_, Value::Null) => Ok(Ordering::Greater),
        (a, b) if a.is_number() && b.is_number() => {
            let a = number_to_f64(a).unwrap();
            let b = number_to_f64(b).unwrap();
            Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
        (Value::Duration(a), Value::Duration(b)) => Ok(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) if a.ty.name() == b.ty.name() => {
            Ok(a.value.cmp(&b.value))
        }
        (a, b) => Err(EvaluationError::TypeMismatch(format!(
            "Cannot compare instances of '{}' and '{}'.",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Equality with numeric coercion; falls back to `Value` equality.
pub fn are_equal(left: &Value, right: &Value) -> bool {
    if let Ok(ordering) = compare(left, right) {
        return ordering == Ordering::Equal;
    }
    left == right
}
