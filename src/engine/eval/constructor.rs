//! Object construction: the constructor node (with named-argument property
//! setting and variadic packing), the array constructor and the type node.

use std::sync::Arc;

use crate::engine::ds::context::EvaluationContext;
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::type_conversion::convert_value_if_necessary;
use crate::engine::ds::type_registry::{
    default_value_of, resolve_type, ConstructorDef, ParamType,
};
use crate::engine::ds::value::Value;
use crate::engine::eval::method::{resolve_argument, score_invocable};
use crate::engine::eval::node::{ExprNode, NodeCache};
use crate::parser::api::parse_property;

/// A resolved constructor binding plus the named-argument property paths,
/// parsed once per name.
#[derive(Clone)]
pub struct CachedConstructor {
    ctor: Arc<ConstructorDef>,
    needs_packing: bool,
    named: Vec<(String, Arc<ExprNode>)>,
}

pub(crate) fn get_constructor(
    node: &ExprNode,
    _context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    // arguments resolve against the current "this"
    let receiver = eval_ctx.this().clone();
    let mut arg_values = Vec::with_capacity(node.children.len());
    for child in &node.children {
        arg_values.push(resolve_argument(child, &receiver, eval_ctx)?);
    }
    let mut named_values = Vec::with_capacity(node.named_args.len());
    for (name, value_node) in &node.named_args {
        named_values.push((name.clone(), resolve_argument(value_node, &receiver, eval_ctx)?));
    }

    let cached = {
        let mut cache = node.cache.lock().unwrap();
        match &*cache {
            NodeCache::Constructor(cached) => cached.clone(),
            _ => {
                let resolved = initialize(node, &arg_values)?;
                *cache = NodeCache::Constructor(resolved.clone());
                resolved
            }
        }
    };

    let packed = if cached.needs_packing {
        package_variadic(arg_values, &cached.ctor)
    } else {
        arg_values
    };
    let instance = cached.ctor.invoke(packed)?;

    for (name, value) in named_values {
        let property = cached
            .named
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, node)| node.clone())
            .expect("named argument parsed at initialization");
        property.set_value(&instance, None, value)?;
    }

    Ok(instance)
}

fn initialize(node: &ExprNode, args: &[Value]) -> Result<CachedConstructor, EvaluationError> {
    let type_name = node.text.trim();
    let handle = resolve_type(type_name)?;

    let candidates: Vec<Arc<ConstructorDef>> = handle
        .constructors()
        .iter()
        .filter(|c| {
            c.params.len() == args.len() || (c.variadic && c.fixed_arg_count() <= args.len())
        })
        .cloned()
        .collect();

    let no_match = || {
        EvaluationError::NoMatchingOverload(format!(
            "Constructor for the type [{}] with a specified number and types of arguments does not exist.",
            handle.name()
        ))
    };

    let (ctor, needs_packing) = if candidates.len() == 1 {
        let ctor = candidates.into_iter().next().unwrap();
        let needs_packing = score_invocable(
            &ctor.params,
            ctor.variadic,
            ctor.fixed_arg_count(),
            ctor.variadic_element_type(),
            args,
        )
        .map(|(_, packing)| packing)
        .unwrap_or(ctor.variadic && ctor.params.len() != args.len());
        (ctor, needs_packing)
    } else {
        let mut best: Option<(u32, Arc<ConstructorDef>, bool)> = None;
        for ctor in candidates {
            if let Some((score, needs_packing)) = score_invocable(
                &ctor.params,
                ctor.variadic,
                ctor.fixed_arg_count(),
                ctor.variadic_element_type(),
                args,
            ) {
                let better = match &best {
                    Some((best_score, _, _)) => score > *best_score,
                    None => true,
                };
                if better {
                    best = Some((score, ctor, needs_packing));
                }
            }
        }
        best.map(|(_, ctor, packing)| (ctor, packing)).ok_or_else(no_match)?
    };

    let mut named = Vec::with_capacity(node.named_args.len());
    for (name, _) in &node.named_args {
        let property = parse_property(name).map_err(|e| {
            EvaluationError::ArgumentError(format!(
                "Named argument '{}' is not a valid property path: {}",
                name, e
            ))
        })?;
        named.push((name.clone(), property));
    }

    Ok(CachedConstructor {
        ctor,
        needs_packing,
        named,
    })
}

fn package_variadic(mut args: Vec<Value>, ctor: &ConstructorDef) -> Vec<Value> {
    let fixed = ctor.fixed_arg_count();
    let tail: Vec<Value> = args.split_off(fixed);
    let packed = match ctor.variadic_element_type() {
        Some(elem) => Value::new_typed_list(&elem, tail),
        None => Value::new_list(tail),
    };
    args.push(packed);
    args
}

pub(crate) fn get_array(
    node: &ExprNode,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    let element_type = {
        let mut cache = node.cache.lock().unwrap();
        match &*cache {
            NodeCache::Type(handle) => handle.clone(),
            _ => {
                let handle = resolve_type(&node.text)?;
                *cache = NodeCache::Type(handle.clone());
                handle
            }
        }
    };
    let elem_name = element_type.name();

    let rank_root = &node.children[0];
    if !rank_root.children.is_empty() {
        let mut dimensions = Vec::with_capacity(rank_root.children.len());
        for rank_node in &rank_root.children {
            let value = rank_node.get(context, eval_ctx)?;
            let value = convert_value_if_necessary(&ParamType::Int, value, "rank")?;
            match value {
                Value::Int(n) if n >= 0 => dimensions.push(n as usize),
                other => {
                    return Err(EvaluationError::ArgumentError(format!(
                        "Invalid array dimension [{}].",
                        other
                    )))
                }
            }
        }
        return Ok(allocate(elem_name, &dimensions));
    }

    if let Some(values_root) = node.children.get(1) {
        let values = values_root.get(context, eval_ctx)?;
        return convert_value_if_necessary(
            &ParamType::List(Some(elem_name.to_string())),
            values,
            elem_name,
        );
    }

    Err(EvaluationError::ArgumentError(
        "You have to specify either rank or initializer for an array.".to_string(),
    ))
}

fn allocate(element_type: &str, dimensions: &[usize]) -> Value {
    if dimensions.len() == 1 {
        let items = vec![default_value_of(element_type); dimensions[0]];
        Value::new_typed_list(element_type, items)
    } else {
        let items = (0..dimensions[0])
            .map(|_| allocate(element_type, &dimensions[1..]))
            .collect();
        Value::new_list(items)
    }
}

pub(crate) fn get_type(node: &ExprNode) -> ValueResult {
    let mut cache = node.cache.lock().unwrap();
    if let NodeCache::Type(handle) = &*cache {
        return Ok(Value::Type(handle.clone()));
    }
    let handle = resolve_type(node.text.trim())?;
    *cache = NodeCache::Type(handle.clone());
    Ok(Value::Type(handle))
}
