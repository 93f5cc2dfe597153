//! Method dispatch: collection aggregates and method-call extensions first,
//! then registered lambdas, then ordinary overload resolution against the
//! context's type, with a signature-hash fast path for repeat calls.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::engine::ds::context::EvaluationContext;
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::type_registry::{
    element_param_type, meta_type, resolve_type, MethodDef, ParamMatch, ParamSpec, TypeHandle,
};
use crate::engine::ds::value::Value;
use crate::engine::eval::node::{ExprNode, NodeCache, NodeKind};
use crate::engine::ext;
use crate::engine::ext::{CollectionExtension, MethodCallExtension};

/// A resolved method binding. Reused on subsequent calls as long as the
/// recomputed signature hash matches the cached one; distinct argument-type
/// combinations that collide on the hash will incorrectly reuse a stale
/// binding, a trade-off inherited from the cached-dispatch design.
#[derive(Clone)]
pub struct CachedInvocable {
    method: Arc<MethodDef>,
    needs_packing: bool,
    signature_hash: u64,
}

// position-weighted multipliers for the signature hash
const PRIME_NUMBERS: [u64; 129] = [
    17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97, 101, 103, 107,
    109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193, 197, 199,
    211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307, 311,
    313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541,
    547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619, 631, 641, 643, 647,
    653, 659, 661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743, 751, 757, 761,
];

fn type_hash(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

fn calculate_method_hash(context_type: &str, args: &[Value]) -> u64 {
    let mut hash = type_hash(context_type);
    for (i, arg) in args.iter().enumerate() {
        if !arg.is_null() {
            let weight = PRIME_NUMBERS[i % PRIME_NUMBERS.len()];
            hash = hash.wrapping_add(weight.wrapping_mul(type_hash(&arg.type_name())));
        }
    }
    hash
}

/// Evaluates an argument sub-tree. A lambda argument is passed through as a
/// lambda value rather than being evaluated, so extensions and methods can
/// invoke it.
pub(crate) fn resolve_argument(
    child: &Arc<ExprNode>,
    receiver: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    if child.kind() == NodeKind::Lambda {
        return Ok(Value::Lambda(child.clone()));
    }
    child.get(receiver, eval_ctx)
}

enum Dispatch {
    Collection(Arc<dyn CollectionExtension>),
    MethodExt(Arc<dyn MethodCallExtension>),
    Lambda(Arc<ExprNode>),
    Invoke(CachedInvocable),
}

pub(crate) fn get(
    node: &ExprNode,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    let method_name = node.text.clone();

    // arguments are evaluated against the current "this", not against the
    // navigation target
    let receiver = eval_ctx.this().clone();
    let mut arg_values = Vec::with_capacity(node.children.len());
    for child in &node.children {
        arg_values.push(resolve_argument(child, &receiver, eval_ctx)?);
    }

    let dispatch = resolve_dispatch(node, &method_name, context, eval_ctx, &arg_values)?;

    match dispatch {
        Dispatch::Collection(extension) => {
            let source = context.list_items();
            extension.execute(source.as_deref(), &arg_values)
        }
        Dispatch::MethodExt(extension) => extension.execute(context, &arg_values),
        Dispatch::Lambda(lambda) => lambda.get_with_arguments(context, eval_ctx, arg_values),
        Dispatch::Invoke(cached) => {
            let args = if cached.needs_packing {
                package_variadic(arg_values, &cached.method)
            } else {
                arg_values
            };
            cached.method.invoke(context, args)
        }
    }
}

fn resolve_dispatch(
    node: &ExprNode,
    method_name: &str,
    context: &Value,
    eval_ctx: &EvaluationContext,
    arg_values: &[Value],
) -> Result<Dispatch, EvaluationError> {
    // check if the context is a collection and the name denotes a
    // collection processor; this bypasses member lookup entirely
    if context.is_null() || context.is_list() {
        if let Some(extension) = ext::collection_extension(method_name) {
            return Ok(Dispatch::Collection(extension));
        }
        if let Some(Value::CollectionExtension(extension)) = eval_ctx.variable(method_name) {
            return Ok(Dispatch::Collection(extension.clone()));
        }
    }

    if let Some(extension) = ext::method_extension(method_name) {
        return Ok(Dispatch::MethodExt(extension));
    }
    if let Some(Value::MethodExtension(extension)) = eval_ctx.variable(method_name) {
        return Ok(Dispatch::MethodExt(extension.clone()));
    }

    // a lambda registered under the method name in the globals
    if let Some(Value::Lambda(lambda)) = eval_ctx.variable(method_name) {
        return Ok(Dispatch::Lambda(lambda.clone()));
    }

    let no_match = || {
        EvaluationError::NoMatchingOverload(format!(
            "Method '{}' with the specified number and types of arguments does not exist.",
            method_name
        ))
    };

    if context.is_null() {
        return Err(no_match());
    }

    let is_type_context = matches!(context, Value::Type(_));
    let handle = effective_type_handle(context).ok_or_else(no_match)?;
    let context_type = context.effective_type_name();

    let mut cache = node.cache.lock().unwrap();
    let calculated_hash = calculate_method_hash(&context_type, arg_values);
    if let NodeCache::Invocable(cached) = &*cache {
        if cached.signature_hash == calculated_hash {
            return Ok(Dispatch::Invoke(cached.clone()));
        }
    }

    let (method, needs_packing) =
        resolve_method(&handle, method_name, arg_values, is_type_context).ok_or_else(no_match)?;
    let cached = CachedInvocable {
        method,
        needs_packing,
        signature_hash: calculated_hash,
    };
    *cache = NodeCache::Invocable(cached.clone());
    Ok(Dispatch::Invoke(cached))
}

fn effective_type_handle(context: &Value) -> Option<TypeHandle> {
    match context {
        Value::Null => None,
        Value::Type(t) => Some(t.clone()),
        Value::Object(o) => Some(o.lock().unwrap().ty.clone()),
        Value::Enum(e) => Some(e.ty.clone()),
        other => resolve_type(&other.type_name()).ok(),
    }
}

/// Picks the best method for the argument values: candidates are filtered by
/// name and arity (or variadic prefix), a lone candidate wins outright, and
/// collisions are scored by per-argument match quality with declaration
/// order breaking remaining ties.
fn resolve_method(
    handle: &TypeHandle,
    method_name: &str,
    args: &[Value],
    is_type_context: bool,
) -> Option<(Arc<MethodDef>, bool)> {
    let mut named = handle.methods_named(method_name);
    if is_type_context {
        named.retain(|m| m.is_static);
        if named.is_empty() {
            named = meta_type().methods_named(method_name);
        }
    }

    let candidates: Vec<Arc<MethodDef>> = named
        .into_iter()
        .filter(|m| {
            m.params.len() == args.len() || (m.variadic && m.fixed_arg_count() <= args.len())
        })
        .collect();

    if candidates.len() == 1 {
        let method = candidates.into_iter().next().unwrap();
        let (_, needs_packing) = score_invocable(
            &method.params,
            method.variadic,
            method.fixed_arg_count(),
            method.variadic_element_type(),
            args,
        )
        .unwrap_or((0, method.variadic && method.params.len() != args.len()));
        return Some((method, needs_packing));
    }

    let mut best: Option<(u32, Arc<MethodDef>, bool)> = None;
    for method in candidates {
        if let Some((score, needs_packing)) = score_invocable(
            &method.params,
            method.variadic,
            method.fixed_arg_count(),
            method.variadic_element_type(),
            args,
        ) {
            let better = match &best {
                Some((best_score, _, _)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((score, method, needs_packing));
            }
        }
    }
    best.map(|(_, method, needs_packing)| (method, needs_packing))
}

/// Scores one candidate against the argument values.
///
/// Per argument: exact type match (4) > assignable match (3) > variadic
/// catch-all match (2) > nullable parameter for a null argument (1). Returns
/// `None` when any argument is rejected, otherwise the total score plus
/// whether the trailing arguments must be packed into the variadic list.
pub(crate) fn score_invocable(
    params: &[ParamSpec],
    variadic: bool,
    fixed_arg_count: usize,
    variadic_element_type: Option<String>,
    args: &[Value],
) -> Option<(u32, bool)> {
    if !variadic || params.len() == args.len() {
        // try binding every parameter directly first
        if params.len() == args.len() {
            if let Some(score) = score_direct(params, args) {
                return Some((score, false));
            }
        }
        if !variadic {
            return None;
        }
    }

    // pack the tail into the trailing parameter
    let mut total = 0u32;
    for (param, arg) in params[..fixed_arg_count].iter().zip(args) {
        total += score_arg(param, arg)?;
    }
    let element = variadic_element_type
        .as_deref()
        .map(element_param_type)
        .unwrap_or(crate::engine::ds::type_registry::ParamType::Any);
    for arg in &args[fixed_arg_count..] {
        if arg.is_null() {
            total += 1;
        } else if element.matches(arg) != ParamMatch::None {
            total += 2;
        } else {
            return None;
        }
    }
    Some((total, true))
}

fn score_direct(params: &[ParamSpec], args: &[Value]) -> Option<u32> {
    let mut total = 0u32;
    for (param, arg) in params.iter().zip(args) {
        total += score_arg(param, arg)?;
    }
    Some(total)
}

fn score_arg(param: &ParamSpec, arg: &Value) -> Option<u32> {
    if arg.is_null() {
        return if param.nullable { Some(1) } else { None };
    }
    match param.ty.matches(arg) {
        ParamMatch::Exact => Some(4),
        ParamMatch::Assignable => Some(3),
        ParamMatch::None => None,
    }
}

/// Packs the trailing arguments into the variadic parameter's list type.
pub(crate) fn package_variadic(mut args: Vec<Value>, method: &MethodDef) -> Vec<Value> {
    let fixed = method.fixed_arg_count();
    let tail: Vec<Value> = args.split_off(fixed);
    let packed = match method.variadic_element_type() {
        Some(elem) => Value::new_typed_list(&elem, tail),
        None => Value::new_list(tail),
    };
    args.push(packed);
    args
}
