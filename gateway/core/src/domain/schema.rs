// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Declarative input shapes and the single validation interpreter.
//!
//! Every operation declares its input as an ordered list of [`FieldSpec`]s.
//! One generic routine, [`InputSchema::validate`], interprets that list
//! against a loosely-typed argument bag and either fails fast with the
//! canonical `Required parameter '<field>' must be <constraint>` message or
//! returns a normalized [`ToolArguments`] map: declared defaults filled in,
//! undeclared fields dropped.
//!
//! ## Invariants
//!
//! - Fields are checked in declaration order; the first violation is the
//!   one reported, deterministically.
//! - Validation is synchronous and happens before any network call.
//! - The normalized map contains only declared fields.

use serde_json::{json, Map, Value};

use crate::domain::tool::ToolError;

/// The primitive shape of one declared field, with optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        min_len: usize,
        max_len: Option<usize>,
    },
    Enum {
        values: &'static [&'static str],
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    StringArray,
    Object,
}

impl FieldKind {
    /// Human-readable constraint wording used in validation messages.
    pub fn constraint(&self) -> String {
        match self {
            Self::String { max_len: None, .. } => "a non-empty string".to_string(),
            Self::String {
                max_len: Some(max), ..
            } => format!("a non-empty string of at most {} characters", max),
            Self::Enum { values } => format!("one of: {}", values.join(", ")),
            Self::Integer {
                min: Some(min),
                max: Some(max),
            } => format!("an integer between {} and {}", min, max),
            Self::Integer { .. } => "an integer".to_string(),
            Self::Number {
                min: Some(min),
                max: Some(max),
            } => format!("a number between {} and {}", min, max),
            Self::Number { .. } => "a number".to_string(),
            Self::Boolean => "a boolean".to_string(),
            Self::StringArray => "a non-empty array of strings".to_string(),
            Self::Object => "an object".to_string(),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String { min_len, max_len } => value.as_str().is_some_and(|s| {
                let len = s.chars().count();
                len >= *min_len && max_len.map_or(true, |max| len <= max)
            }),
            Self::Enum { values } => value.as_str().is_some_and(|s| values.contains(&s)),
            Self::Integer { min, max } => value.as_i64().is_some_and(|n| {
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }),
            Self::Number { min, max } => value.as_f64().is_some_and(|n| {
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }),
            Self::Boolean => value.is_boolean(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_string)),
            Self::Object => value.is_object(),
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            Self::String { min_len, max_len } => {
                let mut schema = json!({ "type": "string", "minLength": min_len });
                if let Some(max) = max_len {
                    schema["maxLength"] = json!(max);
                }
                schema
            }
            Self::Enum { values } => json!({ "type": "string", "enum": values }),
            Self::Integer { min, max } => {
                let mut schema = json!({ "type": "integer" });
                if let Some(lo) = min {
                    schema["minimum"] = json!(lo);
                }
                if let Some(hi) = max {
                    schema["maximum"] = json!(hi);
                }
                schema
            }
            Self::Number { min, max } => {
                let mut schema = json!({ "type": "number" });
                if let Some(lo) = min {
                    schema["minimum"] = json!(lo);
                }
                if let Some(hi) = max {
                    schema["maximum"] = json!(hi);
                }
                schema
            }
            Self::Boolean => json!({ "type": "boolean" }),
            Self::StringArray => json!({
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1,
            }),
            Self::Object => json!({ "type": "object" }),
        }
    }
}

/// One declared field: name, shape, requiredness, and optional default.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: FieldKind::String {
                min_len: 1,
                max_len: None,
            },
            required: true,
            default: None,
        }
    }

    pub fn bounded_string(
        name: &'static str,
        description: &'static str,
        max_len: usize,
    ) -> Self {
        Self {
            kind: FieldKind::String {
                min_len: 1,
                max_len: Some(max_len),
            },
            ..Self::string(name, description)
        }
    }

    pub fn enumeration(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self {
            kind: FieldKind::Enum { values },
            ..Self::string(name, description)
        }
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: FieldKind::Integer {
                min: None,
                max: None,
            },
            ..Self::string(name, description)
        }
    }

    pub fn bounded_integer(
        name: &'static str,
        description: &'static str,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            kind: FieldKind::Integer {
                min: Some(min),
                max: Some(max),
            },
            ..Self::string(name, description)
        }
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: FieldKind::Number {
                min: None,
                max: None,
            },
            ..Self::string(name, description)
        }
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: FieldKind::Boolean,
            ..Self::string(name, description)
        }
    }

    pub fn string_array(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: FieldKind::StringArray,
            ..Self::string(name, description)
        }
    }

    pub fn object(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: FieldKind::Object,
            ..Self::string(name, description)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Optional field with a declared default, applied when omitted.
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }
}

/// An ordered, immutable input declaration for one operation.
#[derive(Debug, Clone)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Schema for operations taking no input.
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate a raw argument bag against this schema.
    ///
    /// Checks fields in declaration order and fails fast on the first
    /// violation. On success returns the normalized argument map: declared
    /// defaults applied, undeclared fields removed.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidInput`] with the canonical message:
    /// `Required parameter '<field>' must be <constraint>` for absent or
    /// invalid required fields, `Parameter '<field>' must be <constraint>`
    /// for present-but-invalid optional fields.
    pub fn validate(&self, args: &Value) -> Result<ToolArguments, ToolError> {
        let empty = Map::new();
        let bag = args.as_object().unwrap_or(&empty);
        let mut normalized = Map::new();

        for field in &self.fields {
            match bag.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(ToolError::invalid(format!(
                            "Required parameter '{}' must be {}",
                            field.name,
                            field.kind.constraint()
                        )));
                    }
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.to_string(), default.clone());
                    }
                }
                Some(value) => {
                    if !field.kind.accepts(value) {
                        let lead = if field.required {
                            "Required parameter"
                        } else {
                            "Parameter"
                        };
                        return Err(ToolError::invalid(format!(
                            "{} '{}' must be {}",
                            lead,
                            field.name,
                            field.kind.constraint()
                        )));
                    }
                    normalized.insert(field.name.to_string(), value.clone());
                }
            }
        }

        Ok(ToolArguments::new(normalized))
    }

    /// Render as a draft JSON Schema object for `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = field.kind.to_json_schema();
            prop["description"] = json!(field.description);
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            properties.insert(field.name.to_string(), prop);
            if field.required {
                required.push(json!(field.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// A validated, normalized argument map handed to operation handlers.
///
/// Handlers still fetch defensively: the accessors re-state the canonical
/// constraint message rather than panicking, so a handler reached with a
/// malformed bag (e.g. from a test) degrades into the same structured
/// error the validator would have produced.
#[derive(Debug, Clone)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ToolError::invalid(format!(
                    "Required parameter '{}' must be a non-empty string",
                    name
                ))
            })
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.opt_str(name).unwrap_or(default)
    }

    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        self.0.get(name).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn opt_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.0.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn string_array(&self, name: &str) -> Result<Vec<&str>, ToolError> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .filter(|items: &Vec<&str>| !items.is_empty())
            .ok_or_else(|| {
                ToolError::invalid(format!(
                    "Required parameter '{}' must be a non-empty array of strings",
                    name
                ))
            })
    }

    pub fn opt_string_array(&self, name: &str) -> Option<Vec<&str>> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    pub fn object(&self, name: &str) -> Result<&Value, ToolError> {
        self.0
            .get(name)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                ToolError::invalid(format!("Required parameter '{}' must be an object", name))
            })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
