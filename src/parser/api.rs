//! Builds expression node trees from the pest parse tree.

use std::sync::Arc;

use pest::error::{Error, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::engine::ds::error::SyntaxError;
use crate::engine::eval::node::{BinaryOpKind, ExprNode, NodeKind, UnaryOpKind};

#[derive(Parser)]
#[grammar = "parser/expression.pest"] // relative to src
pub struct ExpressionParser;

/// Parses a full expression.
pub fn parse(source: &str) -> Result<Arc<ExprNode>, SyntaxError> {
    let mut pairs = ExpressionParser::parse(Rule::root, source)
        .map_err(|e| to_syntax_error(e, source))?;
    let root = pairs.next().unwrap();
    let expression = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::expression)
        .unwrap();
    Ok(build_expression(expression))
}

/// Parses a lambda: either `(a, b) => body` or a bare body expression,
/// which yields a parameterless lambda.
pub fn parse_lambda(source: &str) -> Result<Arc<ExprNode>, SyntaxError> {
    let mut pairs = ExpressionParser::parse(Rule::lambda_root, source)
        .map_err(|e| to_syntax_error(e, source))?;
    let root = pairs.next().unwrap();
    let inner = root
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .unwrap();
    match inner.as_rule() {
        Rule::lambda => Ok(build_lambda(inner)),
        _ => {
            let body = build_expression(inner);
            Ok(Arc::new(ExprNode::new(NodeKind::Lambda, "", vec![body])))
        }
    }
}

/// Parses a property path, e.g. a named constructor argument.
pub fn parse_property(source: &str) -> Result<Arc<ExprNode>, SyntaxError> {
    let mut pairs = ExpressionParser::parse(Rule::property_root, source)
        .map_err(|e| to_syntax_error(e, source))?;
    let root = pairs.next().unwrap();
    let children = root
        .into_inner()
        .filter(|p| p.as_rule() == Rule::property)
        .map(|p| Arc::new(ExprNode::new(NodeKind::PropertyOrField, p.as_str(), vec![])))
        .collect();
    Ok(Arc::new(ExprNode::new(NodeKind::Expression, source, children)))
}

fn to_syntax_error(error: Error<Rule>, source: &str) -> SyntaxError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos((line, column)) => (line, column),
        LineColLocation::Span((line, column), _) => (line, column),
    };
    SyntaxError {
        message: error.variant.message().to_string(),
        line,
        column,
        expression: source.to_string(),
    }
}

fn build_expression(pair: Pair<Rule>) -> Arc<ExprNode> {
    build_ternary(pair.into_inner().next().unwrap())
}

fn build_ternary(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner();
    let condition = build_binary_level(inner.next().unwrap());
    match inner.next() {
        Some(true_branch) => {
            let false_branch = inner.next().unwrap();
            Arc::new(ExprNode::new(
                NodeKind::Ternary,
                "?:",
                vec![
                    condition,
                    build_expression(true_branch),
                    build_expression(false_branch),
                ],
            ))
        }
        None => condition,
    }
}

/// Folds one precedence level (`operand (op operand)*`) left to right.
fn build_binary_level(pair: Pair<Rule>) -> Arc<ExprNode> {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let first = inner.next().unwrap();
    let mut node = match rule {
        Rule::multiplicative => build_unary(first),
        _ => build_binary_level(first),
    };
    while let Some(op_pair) = inner.next() {
        let rhs_pair = inner.next().unwrap();
        let rhs = match rule {
            Rule::multiplicative => build_unary(rhs_pair),
            _ => build_binary_level(rhs_pair),
        };
        let op = binary_op_kind(op_pair.as_rule());
        node = Arc::new(ExprNode::new(
            NodeKind::BinaryOp(op),
            op_pair.as_str(),
            vec![node, rhs],
        ));
    }
    node
}

fn binary_op_kind(rule: Rule) -> BinaryOpKind {
    match rule {
        Rule::op_or => BinaryOpKind::Or,
        Rule::op_xor => BinaryOpKind::Xor,
        Rule::op_and => BinaryOpKind::And,
        Rule::op_eq => BinaryOpKind::Equal,
        Rule::op_ne => BinaryOpKind::NotEqual,
        Rule::op_le => BinaryOpKind::LessOrEqual,
        Rule::op_ge => BinaryOpKind::GreaterOrEqual,
        Rule::op_lt => BinaryOpKind::Less,
        Rule::op_gt => BinaryOpKind::Greater,
        Rule::op_like => BinaryOpKind::Like,
        Rule::op_add => BinaryOpKind::Add,
        Rule::op_sub => BinaryOpKind::Subtract,
        Rule::op_mul => BinaryOpKind::Multiply,
        Rule::op_div => BinaryOpKind::Divide,
        Rule::op_mod => BinaryOpKind::Modulus,
        other => unreachable!("not a binary operator rule: {:?}", other),
    }
}

fn build_unary(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner().peekable();
    let op = match inner.peek().map(|p| p.as_rule()) {
        Some(Rule::op_not) => Some(UnaryOpKind::Not),
        Some(Rule::op_neg) => Some(UnaryOpKind::Minus),
        Some(Rule::op_pos) => Some(UnaryOpKind::Plus),
        _ => None,
    };
    if op.is_some() {
        inner.next();
    }
    let chain = build_chain(inner.next().unwrap());
    match op {
        Some(op) => Arc::new(ExprNode::new(NodeKind::UnaryOp(op), "", vec![chain])),
        None => chain,
    }
}

fn build_chain(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut nodes: Vec<Arc<ExprNode>> = pair.into_inner().map(build_primary).collect();
    if nodes.len() == 1 {
        nodes.pop().unwrap()
    } else {
        Arc::new(ExprNode::new(NodeKind::Expression, "", nodes))
    }
}

fn build_primary(pair: Pair<Rule>) -> Arc<ExprNode> {
    match pair.as_rule() {
        Rule::float_literal => {
            Arc::new(ExprNode::new(NodeKind::FloatLiteral, pair.as_str(), vec![]))
        }
        Rule::int_literal => Arc::new(ExprNode::new(NodeKind::IntLiteral, pair.as_str(), vec![])),
        Rule::string_literal => {
            let raw = pair.as_str();
            let text = raw[1..raw.len() - 1].replace("''", "'");
            Arc::new(ExprNode::new(NodeKind::StringLiteral, &text, vec![]))
        }
        Rule::bool_literal => {
            Arc::new(ExprNode::new(NodeKind::BooleanLiteral, pair.as_str(), vec![]))
        }
        Rule::null_literal => Arc::new(ExprNode::new(NodeKind::NullLiteral, pair.as_str(), vec![])),
        Rule::type_ref => {
            let name = pair.into_inner().next().unwrap();
            Arc::new(ExprNode::new(NodeKind::TypeRef, name.as_str(), vec![]))
        }
        Rule::array_ctor => build_array_ctor(pair),
        Rule::ctor => build_ctor(pair),
        Rule::lambda => build_lambda(pair),
        Rule::paren => build_expression(pair.into_inner().next().unwrap()),
        Rule::method_call => build_method_call(pair),
        Rule::property => {
            Arc::new(ExprNode::new(NodeKind::PropertyOrField, pair.as_str(), vec![]))
        }
        other => unreachable!("not a primary rule: {:?}", other),
    }
}

fn build_method_call(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner();
    let name = inner.next().unwrap();
    let args = match inner.next() {
        Some(call_args) => call_args.into_inner().map(build_expression).collect(),
        None => Vec::new(),
    };
    Arc::new(ExprNode::new(NodeKind::Method, name.as_str(), args))
}

fn build_ctor(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner();
    inner.next(); // kw_new
    let type_name = inner.next().unwrap().as_str().to_string();

    let mut positional = Vec::new();
    let mut named = Vec::new();
    if let Some(args) = inner.next() {
        for arg in args.into_inner() {
            match arg.as_rule() {
                Rule::named_arg => {
                    let mut parts = arg.into_inner();
                    let name = parts.next().unwrap().as_str().to_string();
                    let value = build_expression(parts.next().unwrap());
                    named.push((name, value));
                }
                _ => positional.push(build_expression(arg)),
            }
        }
    }
    Arc::new(ExprNode::with_named_args(
        NodeKind::Constructor,
        &type_name,
        positional,
        named,
    ))
}

fn build_array_ctor(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner();
    inner.next(); // kw_new
    let type_name = inner.next().unwrap().as_str().to_string();

    let mut ranks = Vec::new();
    let mut initializer = None;
    for part in inner {
        match part.as_rule() {
            Rule::rank_list => {
                ranks = part.into_inner().map(build_expression).collect();
            }
            Rule::array_init => {
                let values = part.into_inner().map(build_expression).collect();
                initializer = Some(Arc::new(ExprNode::new(NodeKind::ExpressionList, "", values)));
            }
            other => unreachable!("unexpected array constructor part: {:?}", other),
        }
    }

    let rank_root = Arc::new(ExprNode::new(NodeKind::ExpressionList, "", ranks));
    let mut children = vec![rank_root];
    if let Some(init) = initializer {
        children.push(init);
    }
    Arc::new(ExprNode::new(
        NodeKind::ArrayConstructor,
        &type_name,
        children,
    ))
}

fn build_lambda(pair: Pair<Rule>) -> Arc<ExprNode> {
    let mut inner = pair.into_inner().peekable();
    let params = match inner.peek().map(|p| p.as_rule()) {
        Some(Rule::param_list) => {
            let list = inner.next().unwrap();
            let names = list
                .into_inner()
                .map(|p| Arc::new(ExprNode::new(NodeKind::PropertyOrField, p.as_str(), vec![])))
                .collect();
            Some(Arc::new(ExprNode::new(NodeKind::ExpressionList, "", names)))
        }
        _ => None,
    };
    let body = build_expression(inner.next().unwrap());
    match params {
        Some(params) => Arc::new(ExprNode::new(NodeKind::Lambda, "", vec![params, body])),
        None => Arc::new(ExprNode::new(NodeKind::Lambda, "", vec![body])),
    }
}
