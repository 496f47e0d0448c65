//! Request-body parsing and field-level validation.
//!
//! Bodies are decoded into a JSON object first and each field is then
//! checked on its own, so a response reports every invalid field at once.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DomainError;

/// A decoded JSON request body.
pub type Fields = Map<String, Value>;

pub(crate) const REQUIRED: &str = "This field is required.";
const NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Keeps the value of a successful check, or records its message.
    pub fn collect<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Decodes a request body into a JSON object. An empty body reads as `{}`.
pub fn parse_fields(body: &[u8]) -> Result<Fields, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| DomainError::MalformedBody(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(DomainError::Validation(ValidationErrors::single(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&other)
            ),
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Reads a required text field.
///
/// Numbers are accepted and rendered as text; surrounding whitespace is
/// trimmed before the blank and length checks.
pub(crate) fn char_field(
    fields: &Fields,
    name: &str,
    max_length: Option<usize>,
) -> Result<String, String> {
    let text = match fields.get(name) {
        None => return Err(REQUIRED.to_string()),
        Some(Value::Null) => return Err(NULL.to_string()),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(NOT_A_STRING.to_string()),
    };

    if text.is_empty() {
        return Err(BLANK.to_string());
    }
    if let Some(max) = max_length
        && text.chars().count() > max
    {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    Ok(text)
}

/// Reads a required integer field. Integral numbers and numeric strings
/// are accepted.
pub(crate) fn integer_field(fields: &Fields, name: &str) -> Result<i64, String> {
    match fields.get(name) {
        None => Err(REQUIRED.to_string()),
        Some(Value::Null) => Err(NULL.to_string()),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| NOT_AN_INTEGER.to_string()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| NOT_AN_INTEGER.to_string()),
        Some(_) => Err(NOT_AN_INTEGER.to_string()),
    }
}
