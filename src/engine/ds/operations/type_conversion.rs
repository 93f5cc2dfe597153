//! Conversion of values to a declared target type, applied when an
//! assignment or array initializer receives a value that is not already
//! assignable.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::type_registry::{element_param_type, ParamMatch, ParamType};
use crate::engine::ds::value::Value;

/// Converts `value` to `target` unless it is already assignable.
/// `member` names the property or parameter for diagnostics.
pub fn convert_value_if_necessary(target: &ParamType, value: Value, member: &str) -> ValueResult {
    if target.matches(&value) != ParamMatch::None {
        return Ok(value);
    }
    if value.is_null() && !target.is_primitive() {
        return Ok(Value::Null);
    }

    let failed = |value: &Value| {
        Err(EvaluationError::ConversionError(format!(
            "Cannot convert value [{}] of type '{}' to type '{:?}' for '{}'.",
            value,
            value.type_name(),
            target,
            member
        )))
    };

    match target {
        ParamType::Int => match &value {
            Value::Float(d) => Ok(Value::Int(d.round() as i64)),
            Value::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| failed(&value)),
            _ => failed(&value),
        },
        ParamType::Float => match &value {
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .or_else(|_| failed(&value)),
            _ => failed(&value),
        },
        ParamType::Bool => match &value {
            Value::Int(i) => Ok(Value::Bool(*i != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => failed(&value),
            },
            _ => failed(&value),
        },
        ParamType::String => Ok(Value::String(value.to_string())),
        ParamType::Date => match &value {
            Value::String(s) => parse_date(s, None).or_else(|_| failed(&value)),
            _ => failed(&value),
        },
        ParamType::Duration => to_duration(&value).map(Value::Duration).or_else(|_| failed(&value)),
        ParamType::List(elem) => match (&value, elem) {
            (Value::List(source), Some(elem)) => {
                let items = source.lock().unwrap().items.clone();
                let elem_type = element_param_type(elem);
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    converted.push(convert_value_if_necessary(&elem_type, item, member)?);
                }
                Ok(Value::new_typed_list(elem, converted))
            }
            _ => failed(&value),
        },
        _ => failed(&value),
    }
}

/// Parses a date string. With no explicit format, a few common layouts are
/// tried in order.
pub fn parse_date(text: &str, format: Option<&str>) -> ValueResult {
    let text = text.trim();
    if let Some(format) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Value::Date(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Ok(Value::Date(d.and_hms_opt(0, 0, 0).unwrap()));
        }
        return Err(EvaluationError::FormatError(format!(
            "String '{}' does not match date format '{}'.",
            text, format
        )));
    }
    for layout in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(Value::Date(dt));
        }
    }
    for layout in &["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, layout) {
            return Ok(Value::Date(d.and_hms_opt(0, 0, 0).unwrap()));
        }
    }
    Err(EvaluationError::FormatError(format!(
        "String '{}' is not a recognized date.",
        text
    )))
}

/// Coerces the duration forms accepted by date arithmetic: an existing
/// duration, a number of days, or a `[d.]hh:mm:ss` string.
pub fn to_duration(value: &Value) -> Result<Duration, EvaluationError> {
    match value {
        Value::Duration(d) => Ok(*d),
        Value::Int(days) => Ok(Duration::days(*days)),
        Value::Float(days) => Ok(Duration::seconds((days * 86_400.0).round() as i64)),
        Value::String(s) => parse_duration(s),
        other => Err(EvaluationError::ConversionError(format!(
            "Cannot convert an instance of '{}' to a duration.",
            other.type_name()
        ))),
    }
}

/// Parses a `[d.]hh:mm:ss` duration string.
pub fn parse_duration(text: &str) -> Result<Duration, EvaluationError> {
    let text = text.trim();
    let malformed = || {
        EvaluationError::FormatError(format!(
            "String '{}' is not a recognized duration; expected [d.]hh:mm:ss.",
            text
        ))
    };

    let (days, clock) = match text.find('.') {
        Some(pos) if text[..pos].chars().all(|c| c.is_ascii_digit()) && !text[..pos].is_empty() => {
            let days = text[..pos].parse::<i64>().map_err(|_| malformed())?;
            (days, &text[pos + 1..])
        }
        _ => (0, text),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(malformed());
    }
    let hours = parts[0].parse::<i64>().map_err(|_| malformed())?;
    let minutes = parts[1].parse::<i64>().map_err(|_| malformed())?;
    let seconds = parts[2].parse::<i64>().map_err(|_| malformed())?;

    Ok(Duration::days(days)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds))
}
