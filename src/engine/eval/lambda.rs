//! Lambda expressions: parameter/body split on first use, arity-checked
//! invocation with a swapped local-variable frame.

use crate::engine::ds::context::{EvaluationContext, LocalFrame};
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::value::Value;
use crate::engine::eval::node::{ExprNode, LambdaParts, NodeCache};

/// Splits the node into parameter names and a body sub-tree, caching the
/// result. A single child means a parameterless lambda whose child is the
/// body; otherwise the first child holds the parameter name tokens.
pub(crate) fn parts(node: &ExprNode) -> LambdaParts {
    let mut cache = node.cache.lock().unwrap();
    if let NodeCache::Lambda(parts) = &*cache {
        return parts.clone();
    }

    let parts = if node.children.len() == 1 {
        LambdaParts {
            params: Vec::new(),
            body: node.children[0].clone(),
        }
    } else {
        let params = node.children[0]
            .children
            .iter()
            .map(|arg| arg.text.clone())
            .collect();
        LambdaParts {
            params,
            body: node.children[1].clone(),
        }
    };
    *cache = NodeCache::Lambda(parts.clone());
    parts
}

pub(crate) fn get(
    node: &ExprNode,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
) -> ValueResult {
    parts(node).body.get(context, eval_ctx)
}

pub(crate) fn get_with_arguments(
    node: &ExprNode,
    context: &Value,
    eval_ctx: &mut EvaluationContext,
    arguments: Vec<Value>,
) -> ValueResult {
    let parts = parts(node);

    if arguments.len() != parts.params.len() {
        return Err(EvaluationError::ArgumentMismatch(format!(
            "Invalid number of arguments - expected {} arguments, but was called with {}.",
            parts.params.len(),
            arguments.len()
        )));
    }

    let mut frame = LocalFrame::new();
    for (name, value) in parts.params.iter().zip(arguments) {
        frame.insert(name.clone(), value);
    }

    eval_ctx.with_locals(frame, |ctx| parts.body.get(context, ctx))
}
