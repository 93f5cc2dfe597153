pub mod compare;
pub mod like;
pub mod numeric;
pub mod set_ops;
pub mod type_conversion;
