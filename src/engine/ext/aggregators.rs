//! Numeric and ordering aggregates over collections.

use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::compare::compare;
use crate::engine::ds::operations::numeric;
use crate::engine::ds::value::Value;
use crate::engine::ext::CollectionExtension;

fn items_of(source: Option<&[Value]>) -> &[Value] {
    source.unwrap_or(&[])
}

/// Returns the number of items in the source collection.
pub struct CountAggregator;

impl CollectionExtension for CountAggregator {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        Ok(Value::Int(items_of(source).len() as i64))
    }
}

/// Returns the sum of the numeric items in the source collection.
pub struct SumAggregator;

impl CollectionExtension for SumAggregator {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        let mut total = Value::Int(0);
        for item in items_of(source) {
            if !item.is_number() {
                return Err(EvaluationError::TypeMismatch(format!(
                    "Cannot sum an instance of '{}'.",
                    item.type_name()
                )));
            }
            total = numeric::add(&total, item)?;
        }
        Ok(total)
    }
}

/// Returns the largest item in the source collection.
pub struct MaxAggregator;

impl CollectionExtension for MaxAggregator {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        let mut max_item = Value::Null;
        for item in items_of(source) {
            if compare(&max_item, item)? == std::cmp::Ordering::Less {
                max_item = item.clone();
            }
        }
        Ok(max_item)
    }
}

/// Returns the smallest non-null item in the source collection.
pub struct MinAggregator;

impl CollectionExtension for MinAggregator {
    fn execute(&self, source: Option<&[Value]>, _args: &[Value]) -> ValueResult {
        let mut min_item = Value::Null;
        for item in items_of(source) {
            if item.is_null() {
                continue;
            }
            if min_item.is_null() || compare(&min_item, item)? == std::cmp::Ordering::Greater {
                min_item = item.clone();
            }
        }
        Ok(min_item)
    }
}

/// Returns the arithmetic mean of the numeric items, as a float.
pub struct AverageAggregator;

impl CollectionExtension for AverageAggregator {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult {
        let items = items_of(source);
        if items.is_empty() {
            return Ok(Value::Null);
        }
        let total = SumAggregator.execute(source, args)?;
        let total = match total {
            Value::Int(i) => i as f64,
            Value::Float(d) => d,
            _ => unreachable!("sum of numerics is numeric"),
        };
        Ok(Value::Float(total / items.len() as f64))
    }
}
