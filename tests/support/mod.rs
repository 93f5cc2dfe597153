//! Shared test fixtures: a small registered type model used by the
//! navigation and evaluation tests.
#![allow(dead_code)]

use std::collections::HashMap;

use navex::engine::ds::type_registry::{
    resolve_type, ConstructorDef, MethodDef, ParamSpec, ParamType, PropertyDef, TypeDescriptor,
};
use navex::engine::ds::value::Value;

/// Registers the test types. Safe to call from every test; registration
/// replaces any previous descriptor of the same name.
pub fn register_test_types() {
    TypeDescriptor::new("Inventory")
        .property("Name", ParamType::String)
        .property("Capacity", ParamType::Int)
        .read_only_property("Items", ParamType::List(None))
        .add_property(PropertyDef::new("Secret", ParamType::String).write_only())
        .add_property(
            PropertyDef::new("Category", ParamType::String)
                .read_only()
                .static_member()
                .with_getter(|_| Ok(Value::String("storage".to_string()))),
        )
        .add_constructor(ConstructorDef::new(vec![], |_| Ok(new_inventory("", 0))))
        .add_constructor(ConstructorDef::new(
            vec![ParamSpec::of(ParamType::Int)],
            |args| match &args[0] {
                Value::Int(capacity) => Ok(new_inventory("", *capacity)),
                _ => unreachable!(),
            },
        ))
        .add_method(MethodDef::new("Describe", vec![], |target, _| {
            let name = read_slot(target, "Name");
            Ok(Value::String(format!("inventory '{}'", name)))
        }))
        .add_method(MethodDef::new(
            "Tally",
            vec![
                ParamSpec::of(ParamType::Int),
                ParamSpec::of(ParamType::List(Some("object".to_string()))),
            ],
            |_, _| Ok(Value::String("object[]".to_string())),
        ))
        .add_method(MethodDef::new(
            "Tally",
            vec![
                ParamSpec::of(ParamType::Int),
                ParamSpec::of(ParamType::List(Some("item".to_string()))),
            ],
            |_, _| Ok(Value::String("item[]".to_string())),
        ))
        .add_method(MethodDef::new(
            "Tally",
            vec![
                ParamSpec::of(ParamType::Int),
                ParamSpec::of(ParamType::List(None)),
            ],
            |_, _| Ok(Value::String("collection".to_string())),
        ))
        .add_method(
            MethodDef::new(
                "Join",
                vec![
                    ParamSpec::of(ParamType::String),
                    ParamSpec::of(ParamType::List(Some("string".to_string()))),
                ],
                |_, args| {
                    let separator = match &args[0] {
                        Value::String(s) => s.clone(),
                        _ => unreachable!(),
                    };
                    let parts: Vec<String> = args[1]
                        .list_items()
                        .unwrap()
                        .iter()
                        .map(|v| v.to_string())
                        .collect();
                    Ok(Value::String(parts.join(&separator)))
                },
            )
            .variadic(),
        )
        .register();

    TypeDescriptor::new("Gadget")
        .property("Name", ParamType::String)
        .add_method(MethodDef::new("Describe", vec![], |target, _| {
            let name = read_slot(target, "Name");
            Ok(Value::String(format!("gadget '{}'", name)))
        }))
        .register();

    TypeDescriptor::new("Warehouse")
        .property("Inv", ParamType::Object("Inventory".to_string()))
        .register();

    TypeDescriptor::new_enum("Color", &[("Red", 1), ("Green", 2), ("Blue", 4)]).register();
}

fn read_slot(target: &Value, name: &str) -> String {
    match target {
        Value::Object(o) => o
            .lock()
            .unwrap()
            .slots
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn new_inventory(name: &str, capacity: i64) -> Value {
    let handle = resolve_type("Inventory").unwrap();
    let mut slots = HashMap::new();
    slots.insert("Name".to_string(), Value::String(name.to_string()));
    slots.insert("Capacity".to_string(), Value::Int(capacity));
    slots.insert("Items".to_string(), Value::new_list(vec![]));
    Value::new_object(handle, slots)
}

pub fn inventory(name: &str, capacity: i64) -> Value {
    register_test_types();
    new_inventory(name, capacity)
}

pub fn gadget(name: &str) -> Value {
    register_test_types();
    let handle = resolve_type("Gadget").unwrap();
    let mut slots = HashMap::new();
    slots.insert("Name".to_string(), Value::String(name.to_string()));
    Value::new_object(handle, slots)
}

pub fn warehouse(inv: Value) -> Value {
    register_test_types();
    let handle = resolve_type("Warehouse").unwrap();
    let mut slots = HashMap::new();
    slots.insert("Inv".to_string(), inv);
    Value::new_object(handle, slots)
}

pub fn typed_item_list(items: Vec<Value>) -> Value {
    Value::new_typed_list("item", items)
}
