//! Structural validation of JSON payloads.
//!
//! Every failure is recorded as a [`FieldError`] (field path plus reason) and
//! all of them are reported together, so the HTTP layer can echo precise
//! diagnostics back to the client.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(path, message);
        errors
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any error points at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.0.iter().any(|e| e.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Which create validator to apply.
///
/// `Strict` demands every column that has a storage default; `Relaxed` lets
/// those be omitted so the store fills them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    Strict,
    Relaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

impl Presence {
    /// Presence of a defaulted column under the given create mode.
    pub fn defaulted(mode: CreateMode) -> Self {
        match mode {
            CreateMode::Strict => Presence::Required,
            CreateMode::Relaxed => Presence::Optional,
        }
    }
}

/// A closed set of string labels accepted on the wire.
pub trait Label: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == label)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads typed fields out of a JSON object, accumulating errors.
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value) -> Result<Self, ValidationErrors> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: ValidationErrors::new(),
            }),
            other => Err(ValidationErrors::single(
                "",
                format!("Expected object, received {}", type_name(other)),
            )),
        }
    }

    /// `None` when the key is absent. Records "Required" if it had to be there.
    fn lookup(&mut self, name: &str, presence: Presence) -> Option<&'a Value> {
        let object = self.object;
        match object.get(name) {
            Some(value) => Some(value),
            None => {
                if presence == Presence::Required {
                    self.errors.push(name, "Required");
                }
                None
            }
        }
    }

    fn mismatch(&mut self, name: &str, expected: &str, received: &Value) {
        self.errors.push(
            name,
            format!("Expected {}, received {}", expected, type_name(received)),
        );
    }

    /// Non-nullable string. `non_empty` rejects blank text.
    pub fn text(&mut self, name: &str, presence: Presence, non_empty: bool) -> Option<String> {
        match self.lookup(name, presence)? {
            Value::String(s) => {
                if non_empty && s.trim().is_empty() {
                    self.errors.push(name, "String must contain at least 1 character(s)");
                    None
                } else {
                    Some(s.clone())
                }
            }
            other => {
                self.mismatch(name, "string", other);
                None
            }
        }
    }

    /// Nullable string. Outer `None` means the key was omitted.
    pub fn nullable_text(&mut self, name: &str, presence: Presence) -> Option<Option<String>> {
        match self.lookup(name, presence)? {
            Value::Null => Some(None),
            Value::String(s) => Some(Some(s.clone())),
            other => {
                self.mismatch(name, "string", other);
                None
            }
        }
    }

    pub fn boolean(&mut self, name: &str, presence: Presence) -> Option<bool> {
        match self.lookup(name, presence)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(name, "boolean", other);
                None
            }
        }
    }

    /// Integer no smaller than `min`.
    pub fn integer(&mut self, name: &str, presence: Presence, min: i64) -> Option<i64> {
        let value = self.lookup(name, presence)?;
        match value.as_i64() {
            Some(n) if n >= min => Some(n),
            Some(_) => {
                self.errors.push(
                    name,
                    format!("Number must be greater than or equal to {}", min),
                );
                None
            }
            None if value.is_number() => {
                self.errors.push(name, "Expected integer, received float");
                None
            }
            None => {
                self.mismatch(name, "number", value);
                None
            }
        }
    }

    /// Nullable array of strings; element errors are reported as `name.<index>`.
    pub fn nullable_string_list(
        &mut self,
        name: &str,
        presence: Presence,
    ) -> Option<Option<Vec<String>>> {
        match self.lookup(name, presence)? {
            Value::Null => Some(None),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut ok = true;
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        other => {
                            ok = false;
                            self.mismatch(&format!("{}.{}", name, index), "string", other);
                        }
                    }
                }
                ok.then_some(Some(out))
            }
            other => {
                self.mismatch(name, "array", other);
                None
            }
        }
    }

    pub fn label<T: Label>(&mut self, name: &str, presence: Presence) -> Option<T> {
        match self.lookup(name, presence)? {
            Value::String(s) => match T::from_label(s) {
                Some(v) => Some(v),
                None => {
                    let allowed: Vec<String> =
                        T::ALL.iter().map(|v| format!("'{}'", v.as_str())).collect();
                    self.errors.push(
                        name,
                        format!(
                            "Invalid enum value. Expected {}, received '{}'",
                            allowed.join(" | "),
                            s
                        ),
                    );
                    None
                }
            },
            other => {
                self.mismatch(name, "string", other);
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payloads() {
        let err = FieldReader::new(&json!([1, 2])).err().unwrap();
        assert_eq!(err.errors()[0].path, "");
        assert!(err.errors()[0].message.contains("array"));
    }

    #[test]
    fn collects_every_field_error() {
        let body = json!({ "title": 3, "tags": ["a", 1, "c"] });
        let mut reader = FieldReader::new(&body).unwrap();
        assert!(reader.text("title", Presence::Required, true).is_none());
        assert!(reader.text("content", Presence::Required, true).is_none());
        assert!(reader.nullable_string_list("tags", Presence::Optional).is_none());
        let errors = reader.finish().unwrap_err();

        assert_eq!(errors.errors().len(), 3);
        assert!(errors.has_path("title"));
        assert!(errors.has_path("content"));
        assert!(errors.has_path("tags.1"));
    }

    #[test]
    fn blank_text_is_rejected_only_when_asked() {
        let body = json!({ "a": "   ", "b": "" });
        let mut reader = FieldReader::new(&body).unwrap();
        assert!(reader.text("a", Presence::Required, true).is_none());
        assert_eq!(reader.text("b", Presence::Required, false), Some(String::new()));
        assert!(reader.finish().unwrap_err().has_path("a"));
    }

    #[test]
    fn integer_bounds_and_floats() {
        let body = json!({ "neg": -1, "float": 1.5, "ok": 42 });
        let mut reader = FieldReader::new(&body).unwrap();
        assert!(reader.integer("neg", Presence::Required, 0).is_none());
        assert!(reader.integer("float", Presence::Required, 0).is_none());
        assert_eq!(reader.integer("ok", Presence::Required, 0), Some(42));
        assert_eq!(reader.finish().unwrap_err().errors().len(), 2);
    }

    #[test]
    fn nullable_distinguishes_null_from_missing() {
        let body = json!({ "summary": null });
        let mut reader = FieldReader::new(&body).unwrap();
        assert_eq!(reader.nullable_text("summary", Presence::Optional), Some(None));
        assert_eq!(reader.nullable_text("other", Presence::Optional), None);
        assert!(reader.finish().is_ok());
    }
}
