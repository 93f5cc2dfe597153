//! Pluggable extensions consulted by method dispatch ahead of ordinary
//! member resolution.
//!
//! Two seams: collection aggregates (applied when the context is list-like
//! or absent) and method-call extensions (applied to any context). Both are
//! name-keyed process-wide registries populated with built-ins on first use;
//! runtime registration goes through the registry lock. User-supplied
//! implementations can also travel through the global variables map as
//! `Value::CollectionExtension` / `Value::MethodExtension`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::engine::ds::error::ValueResult;
use crate::engine::ds::value::Value;

pub mod aggregators;
pub mod collection;
pub mod date;

use self::aggregators::{AverageAggregator, CountAggregator, MaxAggregator, MinAggregator, SumAggregator};
use self::collection::{
    ConversionExtension, DistinctExtension, NonNullExtension, OrderByExtension, ReverseExtension,
    SortExtension,
};
use self::date::DateConversionExtension;

/// A named aggregate applied to a collection, e.g. `items.sum()`.
///
/// `source` is `None` when the method was invoked without a collection
/// context; implementations treat that as an empty collection.
pub trait CollectionExtension: Send + Sync {
    fn execute(&self, source: Option<&[Value]>, args: &[Value]) -> ValueResult;
}

/// A named extension invoked as a method call on an arbitrary context,
/// e.g. `date('2004-08-14')`.
pub trait MethodCallExtension: Send + Sync {
    fn execute(&self, context: &Value, args: &[Value]) -> ValueResult;
}

lazy_static! {
    static ref COLLECTION_EXTENSIONS: RwLock<HashMap<String, Arc<dyn CollectionExtension>>> =
        RwLock::new(builtin_collection_extensions());
    static ref METHOD_EXTENSIONS: RwLock<HashMap<String, Arc<dyn MethodCallExtension>>> =
        RwLock::new(builtin_method_extensions());
}

fn builtin_collection_extensions() -> HashMap<String, Arc<dyn CollectionExtension>> {
    let mut map: HashMap<String, Arc<dyn CollectionExtension>> = HashMap::new();
    map.insert("count".to_string(), Arc::new(CountAggregator));
    map.insert("sum".to_string(), Arc::new(SumAggregator));
    map.insert("max".to_string(), Arc::new(MaxAggregator));
    map.insert("min".to_string(), Arc::new(MinAggregator));
    map.insert("average".to_string(), Arc::new(AverageAggregator));
    map.insert("sort".to_string(), Arc::new(SortExtension));
    map.insert("orderBy".to_string(), Arc::new(OrderByExtension));
    map.insert("distinct".to_string(), Arc::new(DistinctExtension));
    map.insert("nonNull".to_string(), Arc::new(NonNullExtension));
    map.insert("reverse".to_string(), Arc::new(ReverseExtension));
    map.insert("convert".to_string(), Arc::new(ConversionExtension));
    map
}

fn builtin_method_extensions() -> HashMap<String, Arc<dyn MethodCallExtension>> {
    let mut map: HashMap<String, Arc<dyn MethodCallExtension>> = HashMap::new();
    map.insert("date".to_string(), Arc::new(DateConversionExtension));
    map
}

pub fn collection_extension(name: &str) -> Option<Arc<dyn CollectionExtension>> {
    COLLECTION_EXTENSIONS.read().unwrap().get(name).cloned()
}

pub fn method_extension(name: &str) -> Option<Arc<dyn MethodCallExtension>> {
    METHOD_EXTENSIONS.read().unwrap().get(name).cloned()
}

/// Registers (or replaces) a collection aggregate under `name`.
pub fn register_collection_extension(name: &str, ext: Arc<dyn CollectionExtension>) {
    COLLECTION_EXTENSIONS
        .write()
        .unwrap()
        .insert(name.to_string(), ext);
}

/// Registers (or replaces) a method-call extension under `name`.
pub fn register_method_extension(name: &str, ext: Arc<dyn MethodCallExtension>) {
    METHOD_EXTENSIONS
        .write()
        .unwrap()
        .insert(name.to_string(), ext);
}
