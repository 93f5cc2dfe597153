//! The dynamically-typed runtime value.
//!
//! Collections and object instances are held behind `Arc<Mutex<..>>` so that
//! values have reference semantics (reading a list-valued property aliases
//! the stored list) and so that values stay `Send + Sync` for concurrent
//! evaluation of a shared expression tree.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;

use crate::engine::ds::type_registry::TypeHandle;
use crate::engine::eval::node::ExprNode;
use crate::engine::ext::{CollectionExtension, MethodCallExtension};

pub type ListRef = Arc<Mutex<ListData>>;
pub type MapRef = Arc<Mutex<IndexMap<String, Value>>>;
pub type ObjectRef = Arc<Mutex<Instance>>;

/// Backing storage of a list value.
pub struct ListData {
    /// Declared element type name, set by the array constructor.
    /// `None` for plain untyped lists.
    pub element_type: Option<String>,
    pub items: Vec<Value>,
}

/// An instance of a registered type: slot storage keyed by member name.
pub struct Instance {
    pub ty: TypeHandle,
    pub slots: HashMap<String, Value>,
}

/// A named constant of a registered enum type.
#[derive(Clone)]
pub struct EnumValue {
    pub ty: TypeHandle,
    pub name: String,
    pub value: i64,
}

pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDateTime),
    Duration(Duration),
    List(ListRef),
    Map(MapRef),
    Object(ObjectRef),
    Type(TypeHandle),
    Enum(EnumValue),
    Lambda(Arc<ExprNode>),
    CollectionExtension(Arc<dyn CollectionExtension>),
    MethodExtension(Arc<dyn MethodCallExtension>),
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Float(d) => Value::Float(*d),
            Value::String(s) => Value::String(s.clone()),
            Value::Date(d) => Value::Date(*d),
            Value::Duration(d) => Value::Duration(*d),
            Value::List(l) => Value::List(l.clone()),
            Value::Map(m) => Value::Map(m.clone()),
            Value::Object(o) => Value::Object(o.clone()),
            Value::Type(t) => Value::Type(t.clone()),
            Value::Enum(e) => Value::Enum(e.clone()),
            Value::Lambda(l) => Value::Lambda(l.clone()),
            Value::CollectionExtension(e) => Value::CollectionExtension(e.clone()),
            Value::MethodExtension(e) => Value::MethodExtension(e.clone()),
        }
    }
}

impl Value {
    /// Builds an untyped list value.
    pub fn new_list(items: Vec<Value>) -> Value {
        Value::List(Arc::new(Mutex::new(ListData {
            element_type: None,
            items,
        })))
    }

    /// Builds a list value with a declared element type.
    pub fn new_typed_list(element_type: &str, items: Vec<Value>) -> Value {
        Value::List(Arc::new(Mutex::new(ListData {
            element_type: Some(element_type.to_string()),
            items,
        })))
    }

    /// Builds a map value from `(key, value)` pairs, preserving order.
    pub fn new_map(entries: Vec<(String, Value)>) -> Value {
        Value::Map(Arc::new(Mutex::new(entries.into_iter().collect())))
    }

    pub fn new_object(ty: TypeHandle, slots: HashMap<String, Value>) -> Value {
        Value::Object(Arc::new(Mutex::new(Instance { ty, slots })))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Copies out the items of a list value.
    pub fn list_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(l) => Some(l.lock().unwrap().items.clone()),
            _ => None,
        }
    }

    /// Runtime type name, as used in diagnostics and signature hashing.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Date(_) => "date".to_string(),
            Value::Duration(_) => "duration".to_string(),
            Value::List(l) => match &l.lock().unwrap().element_type {
                Some(elem) => format!("{}[]", elem),
                None => "list".to_string(),
            },
            Value::Map(_) => "dictionary".to_string(),
            Value::Object(o) => o.lock().unwrap().ty.name().to_string(),
            Value::Type(_) => "Type".to_string(),
            Value::Enum(e) => e.ty.name().to_string(),
            Value::Lambda(_) => "lambda".to_string(),
            Value::CollectionExtension(_) => "collection-extension".to_string(),
            Value::MethodExtension(_) => "method-extension".to_string(),
        }
    }

    /// Type name used for member resolution: a type value stands for the
    /// type it names, everything else for its own runtime type.
    pub fn effective_type_name(&self) -> String {
        match self {
            Value::Type(t) => t.name().to_string(),
            other => other.type_name(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Duration(d) => write!(f, "{}", d),
            Value::List(l) => {
                let data = l.lock().unwrap();
                write!(f, "[")?;
                for (i, item) in data.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                let map = m.lock().unwrap();
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(o) => write!(f, "{}", o.lock().unwrap().ty.name()),
            Value::Type(t) => write!(f, "{}", t.name()),
            Value::Enum(e) => write!(f, "{}.{}", e.ty.name(), e.name),
            Value::Lambda(_) => write!(f, "lambda"),
            Value::CollectionExtension(_) => write!(f, "collection-extension"),
            Value::MethodExtension(_) => write!(f, "method-extension"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Int(i) => write!(f, "Value::Int({})", i),
            Value::Float(d) => write!(f, "Value::Float({})", d),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Date(d) => write!(f, "Value::Date({})", d),
            Value::Duration(d) => write!(f, "Value::Duration({})", d),
            Value::List(_) => write!(f, "Value::List({})", self),
            Value::Map(_) => write!(f, "Value::Map({})", self),
            Value::Object(o) => write!(f, "Value::Object({})", o.lock().unwrap().ty.name()),
            Value::Type(t) => write!(f, "Value::Type({})", t.name()),
            Value::Enum(e) => write!(f, "Value::Enum({}.{})", e.ty.name(), e.name),
            Value::Lambda(_) => write!(f, "Value::Lambda(..)"),
            Value::CollectionExtension(_) => write!(f, "Value::CollectionExtension(..)"),
            Value::MethodExtension(_) => write!(f, "Value::MethodExtension(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            // numbers compare across kinds
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.lock().unwrap();
                let b = b.lock().unwrap();
                a.items == b.items
            }
            (Value::Map(a), Value::Map(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.lock().unwrap();
                let b = b.lock().unwrap();
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a.name() == b.name(),
            (Value::Enum(a), Value::Enum(b)) => {
                a.ty.name() == b.ty.name() && a.value == b.value
            }
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Float(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
