//! Date conversion, exposed as the `date(...)` method-call extension.

use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::operations::type_conversion::parse_date;
use crate::engine::ds::value::Value;
use crate::engine::ext::MethodCallExtension;

/// Parses a date string: `date('2004-08-14')`, or with an explicit chrono
/// format string: `date('14.08.2004', '%d.%m.%Y')`.
pub struct DateConversionExtension;

impl MethodCallExtension for DateConversionExtension {
    fn execute(&self, _context: &Value, args: &[Value]) -> ValueResult {
        let text = match args.first() {
            Some(Value::String(s)) => s,
            Some(Value::Date(d)) => return Ok(Value::Date(*d)),
            other => {
                return Err(EvaluationError::ArgumentError(format!(
                    "date expects a string argument, got [{}].",
                    other.map(|v| v.type_name()).unwrap_or_else(|| "nothing".to_string())
                )))
            }
        };
        let format = match args.get(1) {
            Some(Value::String(f)) => Some(f.as_str()),
            _ => None,
        };
        parse_date(text, format)
    }
}
