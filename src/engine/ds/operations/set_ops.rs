//! Set algebra over list and map values: union, intersection and
//! left-minus-right difference, preserving first-occurrence order.

use indexmap::IndexMap;

use crate::engine::ds::error::EvaluationError;
use crate::engine::ds::value::Value;

fn push_unique(items: &mut Vec<Value>, candidate: Value) {
    if !items.iter().any(|existing| *existing == candidate) {
        items.push(candidate);
    }
}

fn contains(items: &[Value], candidate: &Value) -> bool {
    items.iter().any(|existing| existing == candidate)
}

/// Items of a list, or the keys of a map viewed as a set of strings.
/// The right-hand side of the set operators accepts either.
pub fn as_element_set(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(l) => Some(l.lock().unwrap().items.clone()),
        Value::Map(m) => Some(
            m.lock()
                .unwrap()
                .keys()
                .map(|k| Value::String(k.clone()))
                .collect(),
        ),
        _ => None,
    }
}

pub fn union(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    for item in left.iter().chain(right.iter()) {
        push_unique(&mut result, item.clone());
    }
    result
}

pub fn intersect(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut result = Vec::new();
    for item in left {
        if contains(right, item) {
            push_unique(&mut result, item.clone());
        }
    }
    result
}

pub fn difference(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut result = Vec::new();
    for item in left {
        if !contains(right, item) {
            push_unique(&mut result, item.clone());
        }
    }
    result
}

/// Key-set union of two maps; on a shared key the left map's value wins.
pub fn map_union(left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    match (left, right) {
        (Value::Map(l), Value::Map(r)) => {
            let l = l.lock().unwrap();
            let r = r.lock().unwrap();
            let mut result: IndexMap<String, Value> = IndexMap::new();
            for (k, v) in l.iter() {
                result.insert(k.clone(), v.clone());
            }
            for (k, v) in r.iter() {
                result.entry(k.clone()).or_insert_with(|| v.clone());
            }
            Ok(Value::Map(std::sync::Arc::new(std::sync::Mutex::new(
                result,
            ))))
        }
        _ => Err(EvaluationError::TypeMismatch(format!(
            "Cannot merge instances of '{}' and '{}'.",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Projects the surviving `keys` of a map back into a map with the left
/// map's values. Used by map difference and map intersection.
pub fn map_with_keys(map: &Value, keys: &[Value]) -> Result<Value, EvaluationError> {
    match map {
        Value::Map(m) => {
            let m = m.lock().unwrap();
            let mut result: IndexMap<String, Value> = IndexMap::new();
            for key in keys {
                if let Value::String(k) = key {
                    if let Some(v) = m.get(k) {
                        result.insert(k.clone(), v.clone());
                    }
                }
            }
            Ok(Value::Map(std::sync::Arc::new(std::sync::Mutex::new(
                result,
            ))))
        }
        _ => Err(EvaluationError::TypeMismatch(format!(
            "Expected a dictionary, got an instance of '{}'.",
            map.type_name()
        ))),
    }
}
