//! Tests for operator semantics and type coercion.

use navex::engine::ds::error::EvaluationError;
use navex::engine::ds::value::Value;
use navex::Expression;

/// Helper to evaluate an expression against a null context.
fn eval(source: &str) -> Value {
    Expression::parse(source)
        .unwrap()
        .get_value(&Value::Null, None)
        .unwrap()
}

/// Helper to evaluate an expression expecting a failure.
fn eval_err(source: &str) -> EvaluationError {
    Expression::parse(source)
        .unwrap()
        .get_value(&Value::Null, None)
        .unwrap_err()
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn evaluates_literals() {
    assert_eq!(eval("42"), Value::Int(42));
    assert_eq!(eval("3.5"), Value::Float(3.5));
    assert_eq!(eval("'hello'"), Value::String("hello".to_string()));
    assert_eq!(eval("true"), Value::Bool(true));
    assert_eq!(eval("null"), Value::Null);
}

#[test]
fn string_literal_unescapes_quotes() {
    assert_eq!(eval("'it''s'"), Value::String("it's".to_string()));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn adds_numbers() {
    assert_eq!(eval("20 + 30"), Value::Int(50));
    assert_eq!(eval("1 + 2.5"), Value::Float(3.5));
}

#[test]
fn addition_is_commutative_for_numbers() {
    assert_eq!(eval("7 + 11"), eval("11 + 7"));
    assert_eq!(eval("1.5 + 2"), eval("2 + 1.5"));
}

#[test]
fn adds_strings() {
    assert_eq!(eval("'20' + '30'"), Value::String("2030".to_string()));
    assert_eq!(eval("'x' + 'y'"), Value::String("xy".to_string()));
}

#[test]
fn string_concatenation_applies_when_either_side_is_a_string() {
    assert_eq!(eval("'n=' + 5"), Value::String("n=5".to_string()));
    assert_eq!(eval("5 + 'x'"), Value::String("5x".to_string()));
}

#[test]
fn arithmetic_precedence_and_unary() {
    assert_eq!(eval("2 + 3 * 4"), Value::Int(14));
    assert_eq!(eval("(2 + 3) * 4"), Value::Int(20));
    assert_eq!(eval("-3 + 10"), Value::Int(7));
    assert_eq!(eval("10 % 3"), Value::Int(1));
    assert_eq!(eval("10 / 4"), Value::Int(2));
    assert_eq!(eval("10.0 / 4"), Value::Float(2.5));
}

#[test]
fn add_rejects_uncombinable_types() {
    match eval_err("true + 5") {
        EvaluationError::TypeMismatch(message) => {
            assert!(message.contains("bool"));
            assert!(message.contains("int"));
        }
        other => panic!("expected TypeMismatch, got {:?}", other),
    }
}

// ============================================================================
// Set algebra over lists and maps
// ============================================================================

fn as_sorted_ints(value: &Value) -> Vec<i64> {
    let mut items: Vec<i64> = value
        .list_items()
        .expect("expected a list")
        .iter()
        .map(|v| match v {
            Value::Int(i) => *i,
            other => panic!("expected int, got {:?}", other),
        })
        .collect();
    items.sort_unstable();
    items
}

#[test]
fn list_addition_is_set_union() {
    let result = eval("new int[] {1, 2, 3} + new int[] {2, 3, 4}");
    assert_eq!(as_sorted_ints(&result), vec![1, 2, 3, 4]);
}

#[test]
fn list_subtraction_is_set_difference() {
    let result = eval("new int[] {1, 2, 3} - new int[] {2, 3, 4}");
    assert_eq!(as_sorted_ints(&result), vec![1]);
}

#[test]
fn list_multiplication_is_set_intersection() {
    let result = eval("new int[] {1, 2, 3} * new int[] {2, 3, 4}");
    assert_eq!(as_sorted_ints(&result), vec![2, 3]);
}

#[test]
fn map_addition_prefers_left_values() {
    let left = Value::new_map(vec![
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(2)),
    ]);
    let right = Value::new_map(vec![
        ("b".to_string(), Value::Int(20)),
        ("c".to_string(), Value::Int(30)),
    ]);
    let context = Value::new_map(vec![
        ("left".to_string(), left),
        ("right".to_string(), right),
    ]);
    let expr = Expression::parse("left + right").unwrap();
    let result = expr.get_value(&context, None).unwrap();
    match result {
        Value::Map(m) => {
            let m = m.lock().unwrap();
            assert_eq!(m.len(), 3);
            assert_eq!(m.get("a"), Some(&Value::Int(1)));
            assert_eq!(m.get("b"), Some(&Value::Int(2)));
            assert_eq!(m.get("c"), Some(&Value::Int(30)));
        }
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn map_subtraction_removes_keys() {
    let context = Value::new_map(vec![
        (
            "left".to_string(),
            Value::new_map(vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(2)),
            ]),
        ),
        (
            "right".to_string(),
            Value::new_map(vec![("b".to_string(), Value::Int(9))]),
        ),
    ]);
    let expr = Expression::parse("left - right").unwrap();
    let result = expr.get_value(&context, None).unwrap();
    match result {
        Value::Map(m) => {
            let m = m.lock().unwrap();
            assert_eq!(m.len(), 1);
            assert_eq!(m.get("a"), Some(&Value::Int(1)));
        }
        other => panic!("expected map, got {:?}", other),
    }
}

// ============================================================================
// Logical and bitwise operators
// ============================================================================

#[test]
fn or_of_booleans() {
    assert_eq!(eval("true or false"), Value::Bool(true));
    assert_eq!(eval("false || false"), Value::Bool(false));
}

#[test]
fn or_of_integers_is_bitwise() {
    assert_eq!(eval("5 or 3"), Value::Int(7));
    assert_eq!(eval("2 || 4"), Value::Int(6));
}

#[test]
fn and_of_integers_is_bitwise() {
    assert_eq!(eval("6 and 3"), Value::Int(2));
    assert_eq!(eval("true and false"), Value::Bool(false));
}

#[test]
fn xor_of_integers_and_booleans() {
    assert_eq!(eval("2 xor 3"), Value::Int(1));
    assert_eq!(eval("true xor false"), Value::Bool(true));
    assert_eq!(eval("true xor true"), Value::Bool(false));
}

#[test]
fn not_negates_booleans() {
    assert_eq!(eval("!true"), Value::Bool(false));
    assert_eq!(eval("!(1 > 2)"), Value::Bool(true));
}

// ============================================================================
// Comparison operators
// ============================================================================

#[test]
fn compares_numbers_and_strings() {
    assert_eq!(eval("1 < 2"), Value::Bool(true));
    assert_eq!(eval("2 <= 2"), Value::Bool(true));
    assert_eq!(eval("3 > 4"), Value::Bool(false));
    assert_eq!(eval("2 >= 2.0"), Value::Bool(true));
    assert_eq!(eval("'abc' < 'abd'"), Value::Bool(true));
}

#[test]
fn equality_coerces_numeric_kinds() {
    assert_eq!(eval("2 == 2.0"), Value::Bool(true));
    assert_eq!(eval("2 != 3"), Value::Bool(true));
    assert_eq!(eval("'a' == 'a'"), Value::Bool(true));
    assert_eq!(eval("null == null"), Value::Bool(true));
}

#[test]
fn like_matches_wildcards() {
    assert_eq!(eval("'Abcdef' like 'a*f'"), Value::Bool(true));
    assert_eq!(eval("'abc' like 'a?c'"), Value::Bool(true));
    assert_eq!(eval("'a7' like 'a#'"), Value::Bool(true));
    assert_eq!(eval("'abc' like 'x*'"), Value::Bool(false));
}

// ============================================================================
// Ternary
// ============================================================================

#[test]
fn ternary_selects_branch() {
    assert_eq!(eval("1 < 2 ? 'yes' : 'no'"), Value::String("yes".to_string()));
    assert_eq!(eval("1 > 2 ? 'yes' : 'no'"), Value::String("no".to_string()));
}

#[test]
fn ternary_is_lazy() {
    // the false branch would fail with a property-not-found error if it
    // were ever evaluated
    assert_eq!(eval("true ? 1 : nonsense.path"), Value::Int(1));
    assert_eq!(eval("false ? nonsense.path : 2"), Value::Int(2));
}

// ============================================================================
// Dates and durations
// ============================================================================

#[test]
fn date_plus_days() {
    let result = eval("date('2004-08-14') + 14");
    assert_eq!(result, eval("date('2004-08-28')"));
}

#[test]
fn date_plus_duration_string() {
    let result = eval("date('2004-08-14') + '1.00:00:00'");
    assert_eq!(result, eval("date('2004-08-15')"));
}

#[test]
fn date_minus_date_is_duration() {
    let result = eval("date('2004-08-28') - date('2004-08-14')");
    match result {
        Value::Duration(d) => assert_eq!(d.num_days(), 14),
        other => panic!("expected duration, got {:?}", other),
    }
}

#[test]
fn date_with_explicit_format() {
    let result = eval("date('14.08.2004', '%d.%m.%Y')");
    assert_eq!(result, eval("date('2004-08-14')"));
}

// ============================================================================
// Empty expression
// ============================================================================

#[test]
fn empty_expression_returns_context() {
    let expr = Expression::parse("").unwrap();
    let context = Value::Int(5);
    assert_eq!(expr.get_value(&context, None).unwrap(), Value::Int(5));
}

#[test]
fn empty_expression_rejects_set() {
    let expr = Expression::parse("").unwrap();
    match expr.set_value(&Value::Null, None, Value::Int(1)) {
        Err(EvaluationError::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other),
    }
}

// ============================================================================
// Assignment restrictions
// ============================================================================

#[test]
fn literals_and_operators_reject_set() {
    let expr = Expression::parse("1 + 2").unwrap();
    match expr.set_value(&Value::Null, None, Value::Int(1)) {
        Err(EvaluationError::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other),
    }

    let expr = Expression::parse("42").unwrap();
    match expr.set_value(&Value::Null, None, Value::Int(1)) {
        Err(EvaluationError::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other),
    }
}
