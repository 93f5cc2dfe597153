//! # navex - an embeddable navigation-expression engine
//!
//! A small dynamically-typed query/navigation language: property paths,
//! arithmetic and logical/set operators, method calls, constructors, lambdas
//! and collection aggregates. An expression is parsed once into a shared
//! node tree and evaluated many times, possibly concurrently, against
//! different root objects and variable bindings; member and overload
//! resolution results are cached on the nodes across evaluations.
//!
//! ## Quick Start
//!
//! ```
//! use navex::Expression;
//! use navex::engine::ds::value::Value;
//!
//! let expr = Expression::parse("2 + 3 * 4").unwrap();
//! let result = expr.get_value(&Value::Null, None).unwrap();
//! assert_eq!(result, Value::Int(14));
//! ```
//!
//! ### Navigating objects
//!
//! Property paths and method calls resolve against types registered in the
//! type registry; dynamic map values act as expando objects:
//!
//! ```
//! use navex::Expression;
//! use navex::engine::ds::value::Value;
//!
//! let order = Value::new_map(vec![
//!     ("Total".to_string(), Value::Float(99.5)),
//! ]);
//! let expr = Expression::parse("Total > 50.0 ? 'big' : 'small'").unwrap();
//! let result = expr.get_value(&order, None).unwrap();
//! assert_eq!(result, Value::String("big".to_string()));
//! ```
//!
//! ### Registered functions
//!
//! Lambdas registered in a variables map are callable by name:
//!
//! ```
//! use navex::Expression;
//! use navex::engine::ds::context::Variables;
//! use navex::engine::ds::value::Value;
//!
//! let mut vars = Variables::new();
//! Expression::register_function("sqr", "(n) => n * n", &mut vars).unwrap();
//!
//! let expr = Expression::parse("sqr(7)").unwrap();
//! let result = expr.get_value(&Value::Null, Some(&vars)).unwrap();
//! assert_eq!(result, Value::Int(49));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar and node-tree construction
//! - **[`engine`]** - the evaluation engine
//!   - **[`engine::ds`]** - values, errors, evaluation context, type registry
//!   - **[`engine::eval`]** - the node model and tree-walking evaluation
//!   - **[`engine::ext`]** - pluggable collection aggregates and method-call
//!     extensions

#[macro_use]
extern crate lazy_static;

pub mod engine;
pub mod parser;
mod expression;

pub use expression::Expression;
