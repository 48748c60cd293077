//! Column lookup and lenient scalar coercion shared by every [`DataModel`].
//!
//! Source rows come either from delimited text (every cell is a JSON string)
//! or from programmatic callers (native JSON numbers, booleans, nulls), so each
//! coercion accepts both shapes.
//!
//! [`DataModel`]: crate::domain::model::DataModel

use crate::domain::model::Record;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

/// One model field and the source column it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub alias: Option<&'static str>,
}

impl FieldSpec {
    pub const fn aliased(name: &'static str, alias: &'static str) -> Self {
        Self {
            name,
            alias: Some(alias),
        }
    }

    pub const fn plain(name: &'static str) -> Self {
        Self { name, alias: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

const FIELD_REQUIRED: &str = "Field required";
const INVALID_INTEGER: &str = "Input should be a valid integer";
const INVALID_NUMBER: &str = "Input should be a valid number";
const NOT_FINITE: &str = "Input should be a finite number";

/// Finds the value for `spec`: alias first, then field name, then either one
/// case-insensitively.
pub fn lookup<'a>(record: &'a Record, spec: &FieldSpec) -> Option<&'a Value> {
    if let Some(alias) = spec.alias {
        if let Some(value) = record.data.get(alias) {
            return Some(value);
        }
    }
    if let Some(value) = record.data.get(spec.name) {
        return Some(value);
    }

    record.data.iter().find_map(|(key, value)| {
        let matches_alias = spec
            .alias
            .map(|alias| key.eq_ignore_ascii_case(alias))
            .unwrap_or(false);
        (matches_alias || key.eq_ignore_ascii_case(spec.name)).then_some(value)
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn present<'a>(record: &'a Record, spec: &FieldSpec) -> Option<&'a Value> {
    lookup(record, spec).filter(|value| !is_blank(value))
}

pub fn optional_string(record: &Record, spec: &FieldSpec) -> Option<String> {
    match present(record, spec)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn coerce_int<T: TryFrom<i64>>(spec: &FieldSpec, value: &Value) -> Result<T, FieldError> {
    coerce_i64(value)
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| FieldError::new(spec.name, INVALID_INTEGER))
}

pub fn required_int<T: TryFrom<i64>>(record: &Record, spec: &FieldSpec) -> Result<T, FieldError> {
    let value = present(record, spec).ok_or_else(|| FieldError::new(spec.name, FIELD_REQUIRED))?;
    coerce_int(spec, value)
}

pub fn optional_int<T: TryFrom<i64>>(
    record: &Record,
    spec: &FieldSpec,
) -> Result<Option<T>, FieldError> {
    present(record, spec)
        .map(|value| coerce_int(spec, value))
        .transpose()
}

fn coerce_float(spec: &FieldSpec, value: &Value) -> Result<f64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FieldError::new(spec.name, INVALID_NUMBER))?;

    if !parsed.is_finite() {
        return Err(FieldError::new(spec.name, NOT_FINITE));
    }
    Ok(parsed)
}

pub fn required_float(record: &Record, spec: &FieldSpec) -> Result<f64, FieldError> {
    let value = present(record, spec).ok_or_else(|| FieldError::new(spec.name, FIELD_REQUIRED))?;
    coerce_float(spec, value)
}

pub fn optional_float(record: &Record, spec: &FieldSpec) -> Result<Option<f64>, FieldError> {
    present(record, spec)
        .map(|value| coerce_float(spec, value))
        .transpose()
}

const NULL_DATES: [&str; 2] = ["0000/00/00", "0000-00-00"];
const DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

/// Agency dates are slash or dash separated, sometimes followed by a time.
/// Placeholders and anything unparsable become `None` rather than an error.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_DATES.contains(&trimmed) {
        return None;
    }

    let candidates = [trimmed, trimmed.get(..10).unwrap_or(trimmed)];
    candidates.iter().find_map(|candidate| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
    })
}

pub fn optional_date(record: &Record, spec: &FieldSpec) -> Option<NaiveDate> {
    match present(record, spec)? {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Booleans pass through and the agency code `PB` (prescribed burn) means
/// `true`. Every other marker is treated as unknown.
pub fn prescribed_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.trim() == "PB" => Some(true),
        _ => None,
    }
}
