//! Error types produced while parsing and evaluating expressions.

use std::fmt;

/// Error raised when expression source text cannot be parsed.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// The offending source text.
    pub expression: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {} in expression [{}]",
            self.line, self.column, self.message, self.expression
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Error raised while evaluating a parsed expression.
///
/// Every failure is deterministic for the same inputs; nothing is retried.
#[derive(Debug, Clone)]
pub enum EvaluationError {
    /// An intermediate step of a navigation path evaluated to null.
    NullValueInPath(String),
    /// Named member does not exist on the context.
    PropertyNotFound(String),
    /// Member exists but cannot be read.
    NotReadable(String),
    /// Member exists but cannot be written.
    NotWritable(String),
    /// Operator applied to operand types it has no rule for.
    TypeMismatch(String),
    /// No method or constructor matches the name and argument values.
    NoMatchingOverload(String),
    /// Lambda invoked with the wrong number of arguments.
    ArgumentMismatch(String),
    /// Malformed usage, e.g. an array constructor with neither rank nor initializer.
    ArgumentError(String),
    /// Value could not be converted to the required type.
    ConversionError(String),
    /// Literal text could not be parsed as a value of its kind.
    FormatError(String),
    /// Name could not be resolved to a registered type.
    TypeNotFound(String),
    /// Operation is not supported by this node kind.
    Unsupported(String),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::NullValueInPath(m) => write!(f, "Null value in path: {}", m),
            EvaluationError::PropertyNotFound(m) => write!(f, "Property not found: {}", m),
            EvaluationError::NotReadable(m) => write!(f, "Not readable: {}", m),
            EvaluationError::NotWritable(m) => write!(f, "Not writable: {}", m),
            EvaluationError::TypeMismatch(m) => write!(f, "Type mismatch: {}", m),
            EvaluationError::NoMatchingOverload(m) => write!(f, "No matching overload: {}", m),
            EvaluationError::ArgumentMismatch(m) => write!(f, "Argument mismatch: {}", m),
            EvaluationError::ArgumentError(m) => write!(f, "Argument error: {}", m),
            EvaluationError::ConversionError(m) => write!(f, "Conversion error: {}", m),
            EvaluationError::FormatError(m) => write!(f, "Format error: {}", m),
            EvaluationError::TypeNotFound(m) => write!(f, "Type not found: {}", m),
            EvaluationError::Unsupported(m) => write!(f, "Unsupported: {}", m),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl EvaluationError {
    /// True when this error signals that a member could not be read.
    /// Used by navigation `set` to remap intermediate read failures.
    pub fn is_not_readable(&self) -> bool {
        matches!(self, EvaluationError::NotReadable(_))
    }
}

/// Result alias used throughout the evaluator.
pub type ValueResult = Result<crate::engine::ds::value::Value, EvaluationError>;
