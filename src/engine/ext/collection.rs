//! Collection-shaping extensions: sorting, ordering by a key, filtering and
//! element conversion.

use std::cmp::Ordering;

use crate::engine::ds::context::EvaluationContext;
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::compare::compare;
use crate::engine::ds::operations::type_conversion::convert_value_if_necessary;
use crate::engine::ds::type_registry::element_param_type;
use crate::engine::ds::value::Value;
use crate::engine::ext::CollectionExtension;

fn items_of(source: Option<&[Value]>) -> Vec<Value> {
    source.map(|s| s.to_vec()).unwrap_or_default()
}

/// Sorts comparable items ascending; `sort(false)` sorts descending.
pub struct SortExtension;

impl CollectionExtension for SortExtension {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult {
        let descending = match args.first() {
            Some(Value::Bool(ascending)) => !*ascending,
            _ => false,
        };
        let mut items = items_of(source);
        let mut failure = None;
        items.sort_by(|a, b| match compare(a, b) {
            Ok(ordering) => {
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            Err(e) => {
                failure.get_or_insert(e);
                Ordering::Equal
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(Value::new_list(items)),
        }
    }
}

/// Orders items by the key produced by a lambda argument:
/// `orderBy((item) => item.Price)`.
pub struct OrderByExtension;

impl CollectionExtension for OrderByExtension {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult {
        let selector = match args.first() {
            Some(Value::Lambda(node)) => node.clone(),
            other => {
                return Err(EvaluationError::ArgumentError(format!(
                    "orderBy expects a lambda key selector, got [{}].",
                    other.map(|v| v.type_name()).unwrap_or_else(|| "nothing".to_string())
                )))
            }
        };

        let items = items_of(source);
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let mut ctx = EvaluationContext::new(item.clone(), None);
            let key = selector.get_with_arguments(&item, &mut ctx, vec![item.clone()])?;
            keyed.push((key, item));
        }

        let mut failure = None;
        keyed.sort_by(|a, b| match compare(&a.0, &b.0) {
            Ok(ordering) => ordering,
            Err(e) => {
                failure.get_or_insert(e);
                Ordering::Equal
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(Value::new_list(keyed.into_iter().map(|(_, v)| v).collect())),
        }
    }
}

/// Removes duplicate items. `distinct(false)` also drops nulls.
pub struct DistinctExtension;

impl CollectionExtension for DistinctExtension {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult {
        let keep_nulls = match args.first() {
            Some(Value::Bool(b)) => *b,
            _ => true,
        };
        let mut result: Vec<Value> = Vec::new();
        for item in items_of(source) {
            if item.is_null() && !keep_nulls {
                continue;
            }
            if !result.iter().any(|existing| *existing == item) {
                result.push(item);
            }
        }
        Ok(Value::new_list(result))
    }
}

/// Removes null items.
pub struct NonNullExtension;

impl CollectionExtension for NonNullExtension {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        Ok(Value::new_list(
            items_of(source).into_iter().filter(|v| !v.is_null()).collect(),
        ))
    }
}

/// Reverses item order.
pub struct ReverseExtension;

impl CollectionExtension for ReverseExtension {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        let mut items = items_of(source);
        items.reverse();
        Ok(Value::new_list(items))
    }
}

/// Converts every item to the element type named by the argument:
/// `convert('int')` or `convert(T(double))`.
pub struct ConversionExtension;

impl CollectionExtension for ConversionExtension {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult {
        let element_type = match args.first() {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Type(handle)) => handle.name().to_string(),
            other => {
                return Err(EvaluationError::ArgumentError(format!(
                    "convert expects a target element type, got [{}].",
                    other.map(|v| v.type_name()).unwrap_or_else(|| "nothing".to_string())
                )))
            }
        };
        let elem = element_param_type(&element_type);
        let mut converted = Vec::new();
        for item in items_of(source) {
            converted.push(convert_value_if_necessary(&elem, item, "convert")?);
        }
        Ok(Value::new_typed_list(&element_type, converted))
    }
}
