//! Container for a parsed expression.
//!
//! Preparing an `Expression` once and reusing it many times can result in
//! significant performance improvements, as parsing and member resolution
//! are only performed once.

use std::sync::Arc;

use crate::engine::ds::context::Variables;
use crate::engine::ds::error::{EvaluationError, SyntaxError, ValueResult};
use crate::engine::ds::value::Value;
use crate::engine::eval::node::{ExprNode, NodeKind};
use crate::parser::api;

pub struct Expression {
    root: Arc<ExprNode>,
}

impl Expression {
    /// Parses the expression string. Empty text yields an empty expression
    /// that evaluates to its context.
    pub fn parse(text: &str) -> Result<Expression, SyntaxError> {
        if text.trim().is_empty() {
            return Ok(Expression {
                root: Arc::new(ExprNode::new(NodeKind::Expression, "", vec![])),
            });
        }
        Ok(Expression {
            root: api::parse(text)?,
        })
    }

    /// Evaluates the expression against `context` and returns the value of
    /// the last node.
    pub fn get_value(&self, context: &Value, variables: Option<&Variables>) -> ValueResult {
        self.root.get_value(context, variables)
    }

    /// Evaluates the expression against `context` and sets the value of the
    /// last node.
    pub fn set_value(
        &self,
        context: &Value,
        variables: Option<&Variables>,
        new_value: Value,
    ) -> Result<(), EvaluationError> {
        self.root.set_value(context, variables, new_value)
    }

    /// Parses `lambda_source` and registers it under `function_name` in the
    /// given variables map, from where method dispatch can invoke it.
    pub fn register_function(
        function_name: &str,
        lambda_source: &str,
        variables: &mut Variables,
    ) -> Result<(), SyntaxError> {
        let lambda = api::parse_lambda(lambda_source)?;
        variables.insert(function_name.to_string(), Value::Lambda(lambda));
        Ok(())
    }

    /// The root node of the parsed tree.
    pub fn root(&self) -> &Arc<ExprNode> {
        &self.root
    }
}
