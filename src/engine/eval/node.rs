//! The expression node model and the `get`/`set` tree-walking protocol.
//!
//! A node's shape (kind, text, children) is fixed by the parser; only the
//! resolution cache mutates afterwards, under the per-node lock, and always
//! idempotently. Nodes are shared behind `Arc` across concurrent evaluations
//! and hold no per-evaluation state.

use std::sync::{Arc, Mutex};

use crate::engine::ds::context::{EvaluationContext, Variables};
use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::numeric::to_boolean;
use crate::engine::ds::type_registry::TypeHandle;
use crate::engine::ds::value::Value;
use crate::engine::eval::method::CachedInvocable;
use crate::engine::eval::property::CachedAccessor;
use crate::engine::eval::{constructor, lambda, method, operators, property};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BinaryOpKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Like,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum UnaryOpKind {
    Not,
    Minus,
    Plus,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NodeKind {
    /// Navigation chain: children evaluate left to right, each against the
    /// previous child's result.
    Expression,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    PropertyOrField,
    Method,
    Constructor,
    ArrayConstructor,
    TypeRef,
    Lambda,
    /// Holder node whose children evaluate into a list: lambda parameter
    /// lists, array ranks and array initializers.
    ExpressionList,
    Ternary,
    BinaryOp(BinaryOpKind),
    UnaryOp(UnaryOpKind),
}

/// Parameter names and body of a lambda, split out on first use.
#[derive(Clone)]
pub struct LambdaParts {
    pub params: Vec<String>,
    pub body: Arc<ExprNode>,
}

/// Node-kind-specific resolution cache, lazily populated under the node lock.
pub enum NodeCache {
    Empty,
    Literal(Result<Value, EvaluationError>),
    Accessor(CachedAccessor),
    Invocable(CachedInvocable),
    Constructor(constructor::CachedConstructor),
    Type(TypeHandle),
    Lambda(LambdaParts),
}

pub struct ExprNode {
    pub(crate) kind: NodeKind,
    pub(crate) text: String,
    pub(crate) children: Vec<Arc<ExprNode>>,
    /// Named constructor arguments: `(property name, value node)` pairs.
    pub(crate) named_args: Vec<(String, Arc<ExprNode>)>,
    pub(crate) cache: Mutex<NodeCache>,
}

impl ExprNode {
    pub fn new(kind: NodeKind, text: &str, children: Vec<Arc<ExprNode>>) -> Self {
        ExprNode {
            kind,
            text: text.to_string(),
            children,
            named_args: Vec::new(),
            cache: Mutex::new(NodeCache::Empty),
        }
    }

    pub fn with_named_args(
        kind: NodeKind,
        text: &str,
        children: Vec<Arc<ExprNode>>,
        named_args: Vec<(String, Arc<ExprNode>)>,
    ) -> Self {
        ExprNode {
            kind,
            text: text.to_string(),
            children,
            named_args,
            cache: Mutex::new(NodeCache::Empty),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Arc<ExprNode>] {
        &self.children
    }

    /// Evaluates this node with a fresh evaluation context.
    pub fn get_value(&self, context: &Value, variables: Option<&Variables>) -> ValueResult {
        let mut eval_ctx = EvaluationContext::new(context.clone(), variables);
        self.get(context, &mut eval_ctx)
    }

    /// Sets this node's value with a fresh evaluation context.
    pub fn set_value(
        &self,
        context: &Value,
        variables: Option<&Variables>,
        new_value: Value,
    ) -> Result<(), EvaluationError> {
        let mut eval_ctx = EvaluationContext::new(context.clone(), variables);
        self.set(context, &mut eval_ctx, new_value)
    }

    /// Returns this node's value for the given context.
    pub fn get(&self, context: &Value, eval_ctx: &mut EvaluationContext) -> ValueResult {
        match self.kind {
            NodeKind::Expression => self.get_chain(context, eval_ctx),
            NodeKind::IntLiteral
            | NodeKind::FloatLiteral
            | NodeKind::StringLiteral
            | NodeKind::BooleanLiteral
            | NodeKind::NullLiteral => self.get_literal(),
            NodeKind::Ternary => self.get_ternary(context, eval_ctx),
            NodeKind::ExpressionList => self.get_expression_list(context, eval_ctx),
            NodeKind::PropertyOrField => property::get(self, context, eval_ctx),
            NodeKind::Method => method::get(self, context, eval_ctx),
            NodeKind::Constructor => constructor::get_constructor(self, context, eval_ctx),
            NodeKind::ArrayConstructor => constructor::get_array(self, context, eval_ctx),
            NodeKind::TypeRef => constructor::get_type(self),
            NodeKind::Lambda => lambda::get(self, context, eval_ctx),
            NodeKind::BinaryOp(op) => operators::get_binary(self, op, context, eval_ctx),
            NodeKind::UnaryOp(op) => operators::get_unary(self, op, context, eval_ctx),
        }
    }

    /// Sets this node's value for the given context. Most node kinds do not
    /// support value setting.
    pub fn set(
        &self,
        context: &Value,
        eval_ctx: &mut EvaluationContext,
        new_value: Value,
    ) -> Result<(), EvaluationError> {
        match self.kind {
            NodeKind::Expression => self.set_chain(context, eval_ctx, new_value),
            NodeKind::PropertyOrField => property::set(self, context, eval_ctx, new_value),
            _ => Err(EvaluationError::Unsupported(format!(
                "You cannot set the value for a node of kind [{:?}].",
                self.kind
            ))),
        }
    }

    /// Evaluates this node, switching the local variables frame to the given
    /// arguments. Only lambda nodes support this.
    pub fn get_with_arguments(
        &self,
        context: &Value,
        eval_ctx: &mut EvaluationContext,
        arguments: Vec<Value>,
    ) -> ValueResult {
        match self.kind {
            NodeKind::Lambda => lambda::get_with_arguments(self, context, eval_ctx, arguments),
            _ => Err(EvaluationError::Unsupported(format!(
                "Node of kind [{:?}] does not support evaluation with arguments.",
                self.kind
            ))),
        }
    }

    fn get_chain(&self, context: &Value, eval_ctx: &mut EvaluationContext) -> ValueResult {
        let mut result = context.clone();
        for child in &self.children {
            result = child.get(&result, eval_ctx)?;
        }
        Ok(result)
    }

    fn set_chain(
        &self,
        context: &Value,
        eval_ctx: &mut EvaluationContext,
        new_value: Value,
    ) -> Result<(), EvaluationError> {
        if self.children.is_empty() {
            return Err(EvaluationError::Unsupported(
                "You cannot set the value for an empty expression.".to_string(),
            ));
        }

        let mut target = context.clone();
        for child in &self.children[..self.children.len() - 1] {
            match child.get(&target, eval_ctx) {
                Ok(value) => target = value,
                Err(e) if e.is_not_readable() => {
                    return Err(EvaluationError::NotWritable(format!(
                        "Cannot read the value of '{}' property in the expression.",
                        child.text
                    )))
                }
                Err(e) => return Err(e),
            }
        }
        self.children
            .last()
            .unwrap()
            .set(&target, eval_ctx, new_value)
    }

    fn get_literal(&self) -> ValueResult {
        let mut cache = self.cache.lock().unwrap();
        if let NodeCache::Literal(cached) = &*cache {
            return cached.clone();
        }
        let parsed = self.parse_literal();
        *cache = NodeCache::Literal(parsed.clone());
        parsed
    }

    fn parse_literal(&self) -> ValueResult {
        match self.kind {
            NodeKind::NullLiteral => Ok(Value::Null),
            NodeKind::StringLiteral => Ok(Value::String(self.text.clone())),
            NodeKind::BooleanLiteral => match self.text.parse::<bool>() {
                Ok(b) => Ok(Value::Bool(b)),
                Err(_) => Err(EvaluationError::FormatError(format!(
                    "'{}' is not a valid boolean literal.",
                    self.text
                ))),
            },
            NodeKind::IntLiteral => match self.text.parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(EvaluationError::FormatError(format!(
                    "'{}' is not a valid integer literal.",
                    self.text
                ))),
            },
            NodeKind::FloatLiteral => match self.text.parse::<f64>() {
                Ok(d) => Ok(Value::Float(d)),
                Err(_) => Err(EvaluationError::FormatError(format!(
                    "'{}' is not a valid float literal.",
                    self.text
                ))),
            },
            _ => unreachable!("not a literal node"),
        }
    }

    fn get_ternary(&self, context: &Value, eval_ctx: &mut EvaluationContext) -> ValueResult {
        let condition = self.children[0].get(context, eval_ctx)?;
        if to_boolean(&condition)? {
            self.children[1].get(context, eval_ctx)
        } else {
            self.children[2].get(context, eval_ctx)
        }
    }

    fn get_expression_list(
        &self,
        context: &Value,
        eval_ctx: &mut EvaluationContext,
    ) -> ValueResult {
        let mut items = Vec::with_capacity(self.children.len());
        for child in &self.children {
            items.push(child.get(context, eval_ctx)?);
        }
        Ok(Value::new_list(items))
    }
}

impl std::fmt::Debug for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}]", self.kind, self.text)
    }
}
