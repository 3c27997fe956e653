//! Declared input/output contracts for prompt flows.
//!
//! A [`Schema`] is a small structural type language covering exactly what the
//! flows need: strings, numbers, arrays, and objects with required fields.
//! It validates `serde_json::Value`s and renders itself as JSON Schema for the
//! generative service.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// A structural schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A string; `non_empty` rejects blank (whitespace-only) text.
    String { non_empty: bool },
    /// Any finite JSON number.
    Number,
    /// A homogeneous array.
    Array(Box<Schema>),
    /// An object whose declared fields are all required. Undeclared fields
    /// are tolerated.
    Object(Vec<Field>),
}

/// A named, described member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub description: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schema,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The first place a value departs from its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at `{path}`: {message}")]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `$.flashcards[2].answer`.
    pub path: String,
    pub message: String,
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { non_empty: false }
    }

    pub fn non_empty_string() -> Self {
        Schema::String { non_empty: true }
    }

    pub fn array(item: Schema) -> Self {
        Schema::Array(Box::new(item))
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object(fields)
    }

    /// Field names of an object schema, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Schema::Object(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Check `value` against this schema.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        match (self, value) {
            (Schema::String { non_empty }, Value::String(s)) => {
                if *non_empty && s.trim().is_empty() {
                    return Err(violation(path, "must not be empty"));
                }
                Ok(())
            }
            (Schema::Number, Value::Number(_)) => Ok(()),
            (Schema::Array(item), Value::Array(items)) => {
                for (i, element) in items.iter().enumerate() {
                    item.validate_at(element, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            (Schema::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match map.get(&field.name) {
                        Some(v) => field.schema.validate_at(v, &field_path)?,
                        None => return Err(violation(&field_path, "missing required field")),
                    }
                }
                Ok(())
            }
            (expected, found) => Err(violation(
                path,
                &format!("expected {}, found {}", expected.type_name(), json_type(found)),
            )),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Schema::String { .. } => "string",
            Schema::Number => "number",
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::String { non_empty: true } => json!({ "type": "string", "minLength": 1 }),
            Schema::String { non_empty: false } => json!({ "type": "string" }),
            Schema::Number => json!({ "type": "number" }),
            Schema::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
            Schema::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    let mut prop = field.schema.to_json_schema();
                    if !field.description.is_empty() {
                        if let Value::Object(obj) = &mut prop {
                            obj.insert("description".into(), Value::String(field.description.clone()));
                        }
                    }
                    properties.insert(field.name.clone(), prop);
                }
                let required: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }
}

fn violation(path: &str, message: &str) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
