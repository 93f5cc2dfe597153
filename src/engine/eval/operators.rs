//! Binary and unary operator semantics with dynamic type coercion.
//!
//! Operands evaluate left then right; dispatch keys on the left operand's
//! runtime type first, falling back to the right. Combinations without a
//! rule fail with a type mismatch naming both operand types.

use std::cmp::Ordering;

use crate::engine::ds::context::EvaluationContext;
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::compare::{are_equal, compare};
use crate::engine::ds::operations::like::like_match;
use crate::engine::ds::operations::numeric;
use crate::engine::ds::operations::set_ops;
use crate::engine::ds::operations::type_conversion::to_duration;
use crate::engine::ds::value::Value;
use crate::engine::eval::node::{BinaryOpKind, ExprNode, UnaryOpKind};

pub(crate) fn get_binary(
    node: &ExprNode,
    op: BinaryOpKind,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    let lhs = node.children[0].get(context, eval_ctx)?;
    let rhs = node.children[1].get(context, eval_ctx)?;

    match op {
        BinaryOpKind::Add => add(&lhs, &rhs),
        BinaryOpKind::Subtract => subtract(&lhs, &rhs),
        BinaryOpKind::Multiply => multiply(&lhs, &rhs),
        BinaryOpKind::Divide => numeric_only(&lhs, &rhs, "divide", numeric::divide),
        BinaryOpKind::Modulus => numeric_only(&lhs, &rhs, "apply modulus to", numeric::modulus),
        BinaryOpKind::And => logical(&lhs, &rhs, numeric::bitwise_and, |a, b| a && b),
        BinaryOpKind::Or => logical(&lhs, &rhs, numeric::bitwise_or, |a, b| a || b),
        BinaryOpKind::Xor => xor(&lhs, &rhs),
        BinaryOpKind::Equal => Ok(Value::Bool(are_equal(&lhs, &rhs))),
        BinaryOpKind::NotEqual => Ok(Value::Bool(!are_equal(&lhs, &rhs))),
        BinaryOpKind::Less => ordering(&lhs, &rhs, |o| o == Ordering::Less),
        BinaryOpKind::LessOrEqual => ordering(&lhs, &rhs, |o| o != Ordering::Greater),
        BinaryOpKind::Greater => ordering(&lhs, &rhs, |o| o == Ordering::Greater),
        BinaryOpKind::GreaterOrEqual => ordering(&lhs, &rhs, |o| o != Ordering::Less),
        BinaryOpKind::Like => like(&lhs, &rhs),
    }
}

pub(crate) fn get_unary(
    node: &ExprNode,
    op: UnaryOpKind,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    let operand = node.children[0].get(context, eval_ctx)?;
    match op {
        UnaryOpKind::Not => Ok(Value::Bool(!numeric::to_boolean(&operand)?)),
        UnaryOpKind::Minus => numeric::negate(&operand),
        UnaryOpKind::Plus => {
            if operand.is_number() {
                Ok(operand)
            } else {
                Err(EvaluationError::TypeMismatch(format!(
                    "Cannot apply unary '+' to an instance of '{}'.",
                    operand.type_name()
                )))
            }
        }
    }
}

fn mismatch(verb: &str, lhs: &Value, rhs: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch(format!(
        "Cannot {} instances of '{}' and '{}'.",
        verb,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn add(lhs: &Value, rhs: &Value) -> ValueResult {
    if lhs.is_number() && rhs.is_number() {
        return numeric::add(lhs, rhs);
    }
    if let Value::Date(date) = lhs {
        if matches!(rhs, Value::Duration(_) | Value::String(_)) || rhs.is_number() {
            return Ok(Value::Date(*date + to_duration(rhs)?));
        }
    }
    if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
        return Ok(Value::String(format!("{}{}", lhs, rhs)));
    }
    if let (Value::List(_), Value::List(_)) = (lhs, rhs) {
        let left = set_ops::as_element_set(lhs).unwrap();
        let right = set_ops::as_element_set(rhs).unwrap();
        return Ok(Value::new_list(set_ops::union(&left, &right)));
    }
    if let (Value::Map(_), Value::Map(_)) = (lhs, rhs) {
        return set_ops::map_union(lhs, rhs);
    }
    Err(mismatch("add", lhs, rhs))
}

fn subtract(lhs: &Value, rhs: &Value) -> ValueResult {
    if lhs.is_number() && rhs.is_number() {
        return numeric::subtract(lhs, rhs);
    }
    if let Value::Date(date) = lhs {
        if let Value::Date(other) = rhs {
            return Ok(Value::Duration(*date - *other));
        }
        if matches!(rhs, Value::Duration(_) | Value::String(_)) || rhs.is_number() {
            return Ok(Value::Date(*date - to_duration(rhs)?));
        }
    }
    if lhs.is_list() {
        let left = set_ops::as_element_set(lhs).unwrap();
        let right = set_ops::as_element_set(rhs).ok_or_else(|| mismatch("subtract", lhs, rhs))?;
        return Ok(Value::new_list(set_ops::difference(&left, &right)));
    }
    if matches!(lhs, Value::Map(_)) {
        let left = set_ops::as_element_set(lhs).unwrap();
        let right = set_ops::as_element_set(rhs).ok_or_else(|| mismatch("subtract", lhs, rhs))?;
        let keys = set_ops::difference(&left, &right);
        return set_ops::map_with_keys(lhs, &keys);
    }
    Err(mismatch("subtract", lhs, rhs))
}

fn multiply(lhs: &Value, rhs: &Value) -> ValueResult {
    if lhs.is_number() && rhs.is_number() {
        return numeric::multiply(lhs, rhs);
    }
    if lhs.is_list() {
        let left = set_ops::as_element_set(lhs).unwrap();
        let right = set_ops::as_element_set(rhs).ok_or_else(|| mismatch("multiply", lhs, rhs))?;
        return Ok(Value::new_list(set_ops::intersect(&left, &right)));
    }
    if matches!(lhs, Value::Map(_)) {
        let left = set_ops::as_element_set(lhs).unwrap();
        let right = set_ops::as_element_set(rhs).ok_or_else(|| mismatch("multiply", lhs, rhs))?;
        let keys = set_ops::intersect(&left, &right);
        return set_ops::map_with_keys(lhs, &keys);
    }
    Err(mismatch("multiply", lhs, rhs))
}

fn numeric_only(
    lhs: &Value,
    rhs: &Value,
    verb: &str,
    op: fn(&Value, &Value) -> ValueResult,
) -> ValueResult {
    if lhs.is_number() && rhs.is_number() {
        op(lhs, rhs)
    } else {
        Err(mismatch(verb, lhs, rhs))
    }
}

/// Bitwise for integers and same-typed enums, boolean otherwise. Both sides
/// are already evaluated; there is no short-circuit.
fn logical(
    lhs: &Value,
    rhs: &Value,
    bitwise: fn(&Value, &Value) -> ValueResult,
    boolean: fn(bool, bool) -> bool,
) -> ValueResult {
    if lhs.is_integer() && rhs.is_integer() {
        return bitwise(lhs, rhs);
    }
    if let (Value::Enum(l), Value::Enum(r)) = (lhs, rhs) {
        if l.ty.name() == r.ty.name() {
            let combined = bitwise(&Value::Int(l.value), &Value::Int(r.value))?;
            if let Value::Int(bits) = combined {
                return Ok(Value::Enum(l.ty.enum_from_value(bits)));
            }
        }
    }
    Ok(Value::Bool(boolean(
        numeric::to_boolean(lhs)?,
        numeric::to_boolean(rhs)?,
    )))
}

fn xor(lhs: &Value, rhs: &Value) -> ValueResult {
    if lhs.is_integer() && rhs.is_integer() {
        return numeric::bitwise_xor(lhs, rhs);
    }
    if let (Value::Enum(l), Value::Enum(r)) = (lhs, rhs) {
        if l.ty.name() == r.ty.name() {
            return Ok(Value::Enum(l.ty.enum_from_value(l.value ^ r.value)));
        }
    }
    Ok(Value::Bool(
        numeric::to_boolean(lhs)? ^ numeric::to_boolean(rhs)?,
    ))
}

fn ordering(lhs: &Value, rhs: &Value, test: fn(Ordering) -> bool) -> ValueResult {
    Ok(Value::Bool(test(compare(lhs, rhs)?)))
}

fn like(lhs: &Value, rhs: &Value) -> ValueResult {
    match (lhs, rhs) {
        (Value::String(text), Value::String(pattern)) => {
            Ok(Value::Bool(like_match(text, pattern)))
        }
        _ => Err(mismatch("apply 'like' to", lhs, rhs)),
    }
}
