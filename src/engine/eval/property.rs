//! Property/field navigation: resolves a member name against the current
//! context into a bound accessor, caches it per declaring type on the node,
//! and re-resolves whenever the context's type changes.

use std::sync::Arc;

use crate::engine::ds::context::EvaluationContext;
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::type_conversion::convert_value_if_necessary;
use crate::engine::ds::type_registry::{
    meta_type, resolve_type, ParamMatch, ParamType, PropertyDef, TypeHandle,
};
use crate::engine::ds::value::Value;
use crate::engine::eval::node::{ExprNode, NodeCache};

/// A bound accessor plus the effective context type name it was resolved
/// against. Replaced, never mutated, when the type changes.
#[derive(Clone)]
pub struct CachedAccessor {
    declaring_type: Option<String>,
    accessor: ValueAccessor,
}

#[derive(Clone)]
pub(crate) enum ValueAccessor {
    /// Entry of a dynamic map ("expando") context. Read-only.
    MapEntry { member: String },
    /// Named constant of an enum type. Read-only.
    EnumConstant { value: crate::engine::ds::value::EnumValue },
    /// Property or field of a registered type.
    Member { def: Arc<PropertyDef>, is_field: bool },
    /// The member name resolved as a type reference. Never refreshed.
    TypeValue { handle: TypeHandle },
}

impl CachedAccessor {
    fn requires_refresh(&self, context: &Value) -> bool {
        match &self.accessor {
            ValueAccessor::TypeValue { .. } => false,
            ValueAccessor::MapEntry { .. } => !matches!(context, Value::Map(_)),
            _ => self.declaring_type.as_deref() != effective_type_name(context).as_deref(),
        }
    }

    fn requires_context(&self) -> bool {
        matches!(
            &self.accessor,
            ValueAccessor::MapEntry { .. } | ValueAccessor::Member { .. }
        )
    }
}

fn effective_type_name(context: &Value) -> Option<String> {
    match context {
        Value::Null => None,
        other => Some(other.effective_type_name()),
    }
}

/// The type descriptor to search for members, honoring the type-value
/// indirection: a `Value::Type` context stands for the type it names.
fn effective_type_handle(context: &Value) -> Option<TypeHandle> {
    match context {
        Value::Null => None,
        Value::Type(t) => Some(t.clone()),
        Value::Object(o) => Some(o.lock().unwrap().ty.clone()),
        Value::Enum(e) => Some(e.ty.clone()),
        other => resolve_type(&other.type_name()).ok(),
    }
}

/// Resolves the accessor for `member` against `context`, following the
/// priority order: expando entry, enum constant, property then field
/// (meta-type fallback for type values), type reference.
fn resolve_accessor(member: &str, context: &Value) -> Result<CachedAccessor, EvaluationError> {
    if let Value::Map(_) = context {
        return Ok(CachedAccessor {
            declaring_type: Some("dictionary".to_string()),
            accessor: ValueAccessor::MapEntry {
                member: member.to_string(),
            },
        });
    }

    let is_type_context = matches!(context, Value::Type(_));
    if let Some(handle) = effective_type_handle(context) {
        if handle.is_enum() {
            if let Some(value) = handle.find_enum_constant(member) {
                return Ok(CachedAccessor {
                    declaring_type: effective_type_name(context),
                    accessor: ValueAccessor::EnumConstant { value },
                });
            }
        }

        let found = if is_type_context {
            handle
                .find_property(member)
                .filter(|p| p.is_static)
                .map(|def| (def, false, handle.name().to_string()))
                .or_else(|| {
                    handle
                        .find_field(member)
                        .filter(|f| f.is_static)
                        .map(|def| (def, true, handle.name().to_string()))
                })
                // probe the meta-type for members of the type value itself;
                // the meta-type is the declaring type, so a later non-type
                // context forces re-resolution
                .or_else(|| {
                    meta_type()
                        .find_property(member)
                        .map(|def| (def, false, "Type".to_string()))
                })
        } else {
            handle
                .find_property(member)
                .map(|def| (def, false, handle.name().to_string()))
                .or_else(|| {
                    handle
                        .find_field(member)
                        .map(|def| (def, true, handle.name().to_string()))
                })
        };

        if let Some((def, is_field, declaring)) = found {
            return Ok(CachedAccessor {
                declaring_type: Some(declaring),
                accessor: ValueAccessor::Member { def, is_field },
            });
        }
    }

    if let Ok(handle) = resolve_type(member) {
        return Ok(CachedAccessor {
            declaring_type: None,
            accessor: ValueAccessor::TypeValue { handle },
        });
    }

    if context.is_null() {
        Err(EvaluationError::NullValueInPath(format!(
            "Cannot initialize property or field node '{}' because the specified context is null.",
            member
        )))
    } else {
        Err(EvaluationError::PropertyNotFound(format!(
            "'{}' node cannot be resolved for the specified context [{}].",
            member, context
        )))
    }
}

/// Fetches the cached accessor, re-resolving when absent or stale.
fn accessor_for(
    node: &ExprNode,
    context: &Value,
) -> Result<CachedAccessor, EvaluationError> {
    let mut cache = node.cache.lock().unwrap();
    if let NodeCache::Accessor(cached) = &*cache {
        if !cached.requires_refresh(context) {
            return Ok(cached.clone());
        }
    }
    let resolved = resolve_accessor(&node.text, context)?;
    *cache = NodeCache::Accessor(resolved.clone());
    Ok(resolved)
}

pub(crate) fn get(
    node: &ExprNode,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    // lambda parameters shadow members; they are per-evaluation state and
    // must never reach the shared accessor cache
    if let Some(value) = eval_ctx.local(&node.text) {
        return Ok(value.clone());
    }

    let cached = accessor_for(node, context)?;

    if context.is_null() && cached.requires_context() {
        return Err(EvaluationError::NullValueInPath(format!(
            "Cannot retrieve the value of a field or property '{}', because context for its resolution is null.",
            node.text
        )));
    }

    match &cached.accessor {
        ValueAccessor::MapEntry { member } => {
            let entry = match context {
                Value::Map(m) => m.lock().unwrap().get(member).cloned(),
                _ => None,
            };
            entry.ok_or_else(|| {
                EvaluationError::PropertyNotFound(format!(
                    "'{}' node cannot be resolved for the specified context [{}].",
                    member, context
                ))
            })
        }
        ValueAccessor::EnumConstant { value } => Ok(Value::Enum(value.clone())),
        ValueAccessor::Member { def, is_field } => {
            if !is_field && !def.readable {
                return Err(EvaluationError::NotReadable(format!(
                    "Cannot get a non-readable property [{}].",
                    def.name
                )));
            }
            def.get(context)
        }
        ValueAccessor::TypeValue { handle } => Ok(Value::Type(handle.clone())),
    }
}

pub(crate) fn set(
    node: &ExprNode,
    context: &Value,
    _eval_ctx: &mut EvaluationContext,
    new_value: Value,
) -> Result<(), EvaluationError> {
    let cached = accessor_for(node, context)?;

    if context.is_null() && cached.requires_context() {
        return Err(EvaluationError::NullValueInPath(format!(
            "Cannot set the value of a field or property '{}', because context for its resolution is null.",
            node.text
        )));
    }

    match &cached.accessor {
        ValueAccessor::MapEntry { .. } => Err(EvaluationError::Unsupported(
            "Cannot set the value of an expando object entry.".to_string(),
        )),
        ValueAccessor::EnumConstant { .. } => Err(EvaluationError::Unsupported(
            "Cannot set the value of an enum.".to_string(),
        )),
        ValueAccessor::TypeValue { .. } => Err(EvaluationError::Unsupported(
            "Cannot set the value of a type.".to_string(),
        )),
        ValueAccessor::Member { def, is_field } => {
            set_member(def, *is_field, context, new_value)
        }
    }
}

fn set_member(
    def: &PropertyDef,
    is_field: bool,
    context: &Value,
    new_value: Value,
) -> Result<(), EvaluationError> {
    let writable = def.writable;

    if !writable {
        if add_to_collections(def, is_field, context, &new_value) {
            return Ok(());
        }
        return Err(EvaluationError::NotWritable(format!(
            "Can't change the value of the read-only property or field '{}'.",
            def.name
        )));
    }

    let empty_string = matches!(&new_value, Value::String(s) if s.is_empty());
    if def.value_type.is_primitive() && (new_value.is_null() || empty_string) {
        return Err(EvaluationError::ArgumentError(format!(
            "Invalid value [{}] for property or field '{}' of primitive type.",
            new_value, def.name
        )));
    }

    if new_value.is_null() || def.value_type.matches(&new_value) != ParamMatch::None {
        return def.set(context, new_value);
    }

    if matches!(new_value, Value::List(_) | Value::Map(_)) {
        if add_to_collections(def, is_field, context, &new_value) {
            return Ok(());
        }
    }

    let converted = convert_value_if_necessary(&def.value_type, new_value, &def.name)?;
    def.set(context, converted)
}

/// Merge fallback for collection-typed members: when the stored value is a
/// growable list or map, append/merge the new value's elements in place.
fn add_to_collections(
    def: &PropertyDef,
    is_field: bool,
    context: &Value,
    new_value: &Value,
) -> bool {
    if !is_field && !def.readable {
        return false;
    }
    // a declared element type marks an array-like, fixed-size member
    if matches!(def.value_type, ParamType::List(Some(_))) {
        return false;
    }

    let current = match def.get(context) {
        Ok(value) => value,
        Err(_) => return false,
    };

    match (&current, new_value) {
        (Value::List(cur), Value::List(new)) => {
            if cur.lock().unwrap().element_type.is_some() {
                return false;
            }
            let new_items = new.lock().unwrap().items.clone();
            if Arc::ptr_eq(cur, new) {
                return true;
            }
            cur.lock().unwrap().items.extend(new_items);
            true
        }
        (Value::Map(cur), Value::Map(new)) => {
            if Arc::ptr_eq(cur, new) {
                return true;
            }
            let new_entries: Vec<(String, Value)> = new
                .lock()
                .unwrap()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let mut cur = cur.lock().unwrap();
            for (k, v) in new_entries {
                cur.insert(k, v);
            }
            true
        }
        _ => false,
    }
}
