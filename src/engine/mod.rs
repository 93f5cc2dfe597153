//! The expression evaluation engine: data structures (`ds`), tree-walking
//! evaluation (`eval`) and pluggable extensions (`ext`).

pub mod ds;
pub mod eval;
pub mod ext;
