//! Response schema: one object model for what we ask the model to return.
//!
//! DESIGN
//! ======
//! The same `Schema` value is rendered into the provider's schema dialect
//! (Gemini's OpenAPI subset or JSON Schema for `OpenAI`) and then used to
//! validate the JSON text that comes back. Nothing from a provider becomes
//! typed data without passing through [`Schema::validate`].
//!
//! Validation coerces where the intent is unambiguous: integral floats
//! become integers, clamped integers are pulled into range, unknown object
//! fields are dropped. Everything else, numeric strings included, is an error.

use serde_json::{Map, Value};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(Vec<Property>),
    Array { items: Box<Schema>, min_items: Option<usize>, max_items: Option<usize> },
    String,
    Enum(Vec<String>),
    Integer { minimum: Option<i64>, maximum: Option<i64>, clamp: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

impl Property {
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self { name: name.into(), schema, required: true }
    }

    #[cfg(test)]
    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self { name: name.into(), schema, required: false }
    }
}

/// Why a provider document did not match its schema. `path` is a JSONPath-ish
/// locator such as `$.title` or `$[2].type`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{path}: missing required field")]
    Missing { path: String },
    #[error("{path}: expected {expected}")]
    WrongType { path: String, expected: &'static str },
    #[error("{path}: {value} is outside {minimum:?}..={maximum:?}")]
    OutOfRange { path: String, value: i64, minimum: Option<i64>, maximum: Option<i64> },
    #[error("{path}: {value:?} is not an allowed value")]
    NotAllowed { path: String, value: String },
    #[error("{path}: expected {min:?}..={max:?} items, got {len}")]
    ItemCount { path: String, len: usize, min: Option<usize>, max: Option<usize> },
}

// =============================================================================
// BUILDERS
// =============================================================================

impl Schema {
    fn new(kind: SchemaKind) -> Self {
        Self { kind, description: None }
    }

    #[must_use]
    pub fn object(properties: Vec<Property>) -> Self {
        Self::new(SchemaKind::Object(properties))
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array { items: Box::new(items), min_items: None, max_items: None })
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer { minimum: None, maximum: None, clamp: false })
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bound an integer schema. No-op on other kinds.
    #[must_use]
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let SchemaKind::Integer { minimum, maximum, .. } = &mut self.kind {
            *minimum = min;
            *maximum = max;
        }
        self
    }

    /// Clamp out-of-range integers instead of rejecting them. No-op on other kinds.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        if let SchemaKind::Integer { clamp, .. } = &mut self.kind {
            *clamp = true;
        }
        self
    }

    /// Bound an array schema's length. No-op on other kinds.
    #[must_use]
    pub fn item_count(mut self, min: usize, max: usize) -> Self {
        if let SchemaKind::Array { min_items, max_items, .. } = &mut self.kind {
            *min_items = Some(min);
            *max_items = Some(max);
        }
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, SchemaKind::Object(_))
    }
}

// =============================================================================
// RENDERING
// =============================================================================

impl Schema {
    /// Render as Gemini's `responseSchema` (OpenAPI 3.0 subset, upper-case types).
    #[must_use]
    pub fn to_gemini(&self) -> Value {
        let mut out = Map::new();
        match &self.kind {
            SchemaKind::Object(properties) => {
                out.insert("type".into(), "OBJECT".into());
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.clone(), p.schema.to_gemini()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                out.insert("required".into(), required_names(properties));
                let ordering: Vec<Value> = properties.iter().map(|p| Value::from(p.name.as_str())).collect();
                out.insert("propertyOrdering".into(), Value::Array(ordering));
            }
            SchemaKind::Array { items, min_items, max_items } => {
                out.insert("type".into(), "ARRAY".into());
                out.insert("items".into(), items.to_gemini());
                if let Some(min) = min_items {
                    out.insert("minItems".into(), Value::from(*min));
                }
                if let Some(max) = max_items {
                    out.insert("maxItems".into(), Value::from(*max));
                }
            }
            SchemaKind::String => {
                out.insert("type".into(), "STRING".into());
            }
            SchemaKind::Enum(values) => {
                out.insert("type".into(), "STRING".into());
                out.insert("enum".into(), Value::from(values.clone()));
            }
            SchemaKind::Integer { minimum, maximum, .. } => {
                out.insert("type".into(), "INTEGER".into());
                if let Some(min) = minimum {
                    out.insert("minimum".into(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".into(), Value::from(*max));
                }
            }
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        Value::Object(out)
    }

    /// Render as JSON Schema for `OpenAI` structured outputs (strict mode).
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        match &self.kind {
            SchemaKind::Object(properties) => {
                out.insert("type".into(), "object".into());
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.clone(), p.schema.to_json_schema()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                out.insert("required".into(), required_names(properties));
                out.insert("additionalProperties".into(), Value::Bool(false));
            }
            SchemaKind::Array { items, min_items, max_items } => {
                out.insert("type".into(), "array".into());
                out.insert("items".into(), items.to_json_schema());
                if let Some(min) = min_items {
                    out.insert("minItems".into(), Value::from(*min));
                }
                if let Some(max) = max_items {
                    out.insert("maxItems".into(), Value::from(*max));
                }
            }
            SchemaKind::String => {
                out.insert("type".into(), "string".into());
            }
            SchemaKind::Enum(values) => {
                out.insert("type".into(), "string".into());
                out.insert("enum".into(), Value::from(values.clone()));
            }
            SchemaKind::Integer { minimum, maximum, .. } => {
                out.insert("type".into(), "integer".into());
                if let Some(min) = minimum {
                    out.insert("minimum".into(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".into(), Value::from(*max));
                }
            }
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        Value::Object(out)
    }
}

fn required_names(properties: &[Property]) -> Value {
    Value::Array(
        properties
            .iter()
            .filter(|p| p.required)
            .map(|p| Value::from(p.name.as_str()))
            .collect(),
    )
}

// =============================================================================
// VALIDATION
// =============================================================================

impl Schema {
    /// Validate `value` and return its normalized form.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, depth-first in property order.
    pub fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<Value, SchemaError> {
        match &self.kind {
            SchemaKind::Object(properties) => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| SchemaError::WrongType { path: path.to_string(), expected: "object" })?;
                let mut out = Map::new();
                for prop in properties {
                    let child = format!("{path}.{}", prop.name);
                    match obj.get(&prop.name) {
                        None | Some(Value::Null) => {
                            if prop.required {
                                return Err(SchemaError::Missing { path: child });
                            }
                        }
                        Some(v) => {
                            out.insert(prop.name.clone(), prop.schema.validate_at(v, &child)?);
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            SchemaKind::Array { items, min_items, max_items } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| SchemaError::WrongType { path: path.to_string(), expected: "array" })?;
                let len = arr.len();
                if min_items.is_some_and(|min| len < min) || max_items.is_some_and(|max| len > max) {
                    return Err(SchemaError::ItemCount {
                        path: path.to_string(),
                        len,
                        min: *min_items,
                        max: *max_items,
                    });
                }
                arr.iter()
                    .enumerate()
                    .map(|(i, v)| items.validate_at(v, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            SchemaKind::String => value
                .as_str()
                .map(Value::from)
                .ok_or_else(|| SchemaError::WrongType { path: path.to_string(), expected: "string" }),
            SchemaKind::Enum(allowed) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| SchemaError::WrongType { path: path.to_string(), expected: "string" })?;
                if allowed.iter().any(|a| a == s) {
                    Ok(Value::from(s))
                } else {
                    Err(SchemaError::NotAllowed { path: path.to_string(), value: s.to_string() })
                }
            }
            SchemaKind::Integer { minimum, maximum, clamp } => {
                let n = as_integer(value)
                    .ok_or_else(|| SchemaError::WrongType { path: path.to_string(), expected: "integer" })?;
                let out_of_range = minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max);
                if !out_of_range {
                    return Ok(Value::from(n));
                }
                if *clamp {
                    let clamped = n.clamp(minimum.unwrap_or(i64::MIN), maximum.unwrap_or(i64::MAX));
                    return Ok(Value::from(clamped));
                }
                Err(SchemaError::OutOfRange { path: path.to_string(), value: n, minimum: *minimum, maximum: *maximum })
            }
        }
    }
}

/// Parse a model's JSON document. Tolerates surrounding whitespace and a
/// single Markdown code fence, which some OpenAI-compatible servers emit even
/// in JSON mode.
///
/// # Errors
///
/// Returns the `serde_json` error when the remaining text is not JSON.
pub fn parse_document(text: &str) -> Result<Value, serde_json::Error> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, |inner| {
            let inner = inner.strip_prefix("json").unwrap_or(inner);
            inner.trim()
        });
    serde_json::from_str(unfenced)
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
