use crate::engine::eval::node::{BinaryOpKind, NodeKind};
use crate::parser::api::{parse, parse_lambda, parse_property};

#[test]
fn parses_int_literal() {
    let node = parse("42").unwrap();
    assert_eq!(node.kind(), NodeKind::IntLiteral);
    assert_eq!(node.text(), "42");
}

#[test]
fn parses_float_literal() {
    let node = parse("3.14").unwrap();
    assert_eq!(node.kind(), NodeKind::FloatLiteral);
    assert_eq!(node.text(), "3.14");
}

#[test]
fn parses_string_literal_with_escaped_quote() {
    let node = parse("'it''s'").unwrap();
    assert_eq!(node.kind(), NodeKind::StringLiteral);
    assert_eq!(node.text(), "it's");
}

#[test]
fn parses_bool_and_null_literals() {
    assert_eq!(parse("true").unwrap().kind(), NodeKind::BooleanLiteral);
    assert_eq!(parse("null").unwrap().kind(), NodeKind::NullLiteral);
}

#[test]
fn parses_binary_operator_with_precedence() {
    let node = parse("1 + 2 * 3").unwrap();
    assert_eq!(node.kind(), NodeKind::BinaryOp(BinaryOpKind::Add));
    let rhs = &node.children()[1];
    assert_eq!(rhs.kind(), NodeKind::BinaryOp(BinaryOpKind::Multiply));
}

#[test]
fn parses_left_associative_chain() {
    // (1 - 2) - 3
    let node = parse("1 - 2 - 3").unwrap();
    assert_eq!(node.kind(), NodeKind::BinaryOp(BinaryOpKind::Subtract));
    let lhs = &node.children()[0];
    assert_eq!(lhs.kind(), NodeKind::BinaryOp(BinaryOpKind::Subtract));
}

#[test]
fn parses_textual_operators() {
    assert_eq!(
        parse("true or false").unwrap().kind(),
        NodeKind::BinaryOp(BinaryOpKind::Or)
    );
    assert_eq!(
        parse("true and false").unwrap().kind(),
        NodeKind::BinaryOp(BinaryOpKind::And)
    );
    assert_eq!(
        parse("1 xor 2").unwrap().kind(),
        NodeKind::BinaryOp(BinaryOpKind::Xor)
    );
    assert_eq!(
        parse("'a' like 'b'").unwrap().kind(),
        NodeKind::BinaryOp(BinaryOpKind::Like)
    );
}

#[test]
fn keyword_prefix_still_parses_as_identifier() {
    // "orderBy" starts with "or" but is a method name, not an operator
    let node = parse("items.orderBy((x) => x)").unwrap();
    assert_eq!(node.kind(), NodeKind::Expression);
    assert_eq!(node.children()[1].kind(), NodeKind::Method);
    assert_eq!(node.children()[1].text(), "orderBy");
}

#[test]
fn parses_navigation_chain() {
    let node = parse("a.b.c").unwrap();
    assert_eq!(node.kind(), NodeKind::Expression);
    assert_eq!(node.children().len(), 3);
    for child in node.children() {
        assert_eq!(child.kind(), NodeKind::PropertyOrField);
    }
}

#[test]
fn parses_method_call_with_arguments() {
    let node = parse("Add(1, 'two')").unwrap();
    assert_eq!(node.kind(), NodeKind::Method);
    assert_eq!(node.text(), "Add");
    assert_eq!(node.children().len(), 2);
}

#[test]
fn parses_ternary() {
    let node = parse("a ? 1 : 2").unwrap();
    assert_eq!(node.kind(), NodeKind::Ternary);
    assert_eq!(node.children().len(), 3);
}

#[test]
fn parses_type_reference() {
    let node = parse("T(System.DateTime)").unwrap();
    assert_eq!(node.kind(), NodeKind::TypeRef);
    assert_eq!(node.text(), "System.DateTime");
}

#[test]
fn parses_constructor_with_named_arguments() {
    let node = parse("new Inventory(42, Name = 'spare parts')").unwrap();
    assert_eq!(node.kind(), NodeKind::Constructor);
    assert_eq!(node.text(), "Inventory");
    assert_eq!(node.children().len(), 1);
}

#[test]
fn parses_array_constructor_with_rank() {
    let node = parse("new int[3]").unwrap();
    assert_eq!(node.kind(), NodeKind::ArrayConstructor);
    assert_eq!(node.text(), "int");
    assert_eq!(node.children()[0].children().len(), 1);
}

#[test]
fn parses_array_constructor_with_initializer() {
    let node = parse("new int[] {1, 2, 3}").unwrap();
    assert_eq!(node.kind(), NodeKind::ArrayConstructor);
    assert!(node.children()[0].children().is_empty());
    assert_eq!(node.children()[1].children().len(), 3);
}

#[test]
fn parses_lambda_with_parameters() {
    let node = parse("(x, y) => x + y").unwrap();
    assert_eq!(node.kind(), NodeKind::Lambda);
    assert_eq!(node.children().len(), 2);
    assert_eq!(node.children()[0].children().len(), 2);
}

#[test]
fn parenthesized_expression_is_not_a_lambda() {
    let node = parse("(1 + 2)").unwrap();
    assert_eq!(node.kind(), NodeKind::BinaryOp(BinaryOpKind::Add));
}

#[test]
fn parse_lambda_accepts_bare_body() {
    let node = parse_lambda("1 + 2").unwrap();
    assert_eq!(node.kind(), NodeKind::Lambda);
    assert_eq!(node.children().len(), 1);
}

#[test]
fn parse_property_builds_navigation() {
    let node = parse_property("Name").unwrap();
    assert_eq!(node.kind(), NodeKind::Expression);
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].text(), "Name");
}

#[test]
fn reports_syntax_error_position() {
    let err = parse("1 +").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.column >= 3);
    assert_eq!(err.expression, "1 +");
}

#[test]
fn rejects_unbalanced_parens() {
    assert!(parse("(1 + 2").is_err());
    assert!(parse("f(1, ").is_err());
}
