//! A parsed expression is shared and re-evaluated, possibly from several
//! threads at once, without leaking state between evaluations.

mod support;

use std::sync::Arc;
use std::thread;

use navex::engine::ds::value::Value;
use navex::Expression;

use support::{gadget, inventory};

#[test]
fn re_evaluation_with_different_contexts_is_independent() {
    let expr = Expression::parse("x * 2 + 1").unwrap();
    for i in 0..10 {
        let context = Value::new_map(vec![("x".to_string(), Value::Int(i))]);
        assert_eq!(expr.get_value(&context, None).unwrap(), Value::Int(i * 2 + 1));
    }
}

#[test]
fn concurrent_evaluation_of_shared_expression() {
    let expr = Arc::new(Expression::parse("x * 2 + 1").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let expr = expr.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let x = t * 1000 + i;
                    let context = Value::new_map(vec![("x".to_string(), Value::Int(x))]);
                    let result = expr.get_value(&context, None).unwrap();
                    assert_eq!(result, Value::Int(x * 2 + 1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn concurrent_evaluation_across_context_types_rebinds_safely() {
    // threads alternate between unrelated context types, forcing the shared
    // accessor and invocable caches to refresh under contention
    let expr = Arc::new(Expression::parse("Describe()").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let expr = expr.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    if (t + i) % 2 == 0 {
                        let inv = inventory("nuts", 1);
                        let result = expr.get_value(&inv, None).unwrap();
                        assert_eq!(result, Value::String("inventory 'nuts'".to_string()));
                    } else {
                        let gad = gadget("bolts");
                        let result = expr.get_value(&gad, None).unwrap();
                        assert_eq!(result, Value::String("gadget 'bolts'".to_string()));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
