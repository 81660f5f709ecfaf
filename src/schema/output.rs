//! Reply shapes declared by each flow.
//!
//! A [`Shape`] serves two purposes: it is sent to the model as a structural
//! constraint, and the model's reply is checked against it before anything is
//! deserialized. Text leaves must be non-empty.
use serde_json::{json, Map, Value};

/// Structural description of a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text {
        description: &'static str,
    },
    List {
        items: Box<Shape>,
        min_items: usize,
        description: &'static str,
    },
    Object {
        fields: Vec<(&'static str, Shape)>,
    },
}

/// A reply that does not conform to the declared [`Shape`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("reply does not match schema at {path}: {problem}")]
pub struct SchemaMismatch {
    pub path: String,
    pub problem: String,
}

impl SchemaMismatch {
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into(),
        }
    }
}

impl Shape {
    pub fn text(description: &'static str) -> Self {
        Self::Text { description }
    }

    pub fn list(items: Shape, min_items: usize, description: &'static str) -> Self {
        Self::List {
            items: Box::new(items),
            min_items,
            description,
        }
    }

    pub fn object(fields: Vec<(&'static str, Shape)>) -> Self {
        Self::Object { fields }
    }

    /// Top-level field names, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        match self {
            Self::Object { fields } => fields.iter().map(|(name, _)| *name).collect(),
            _ => Vec::new(),
        }
    }

    /// Render as a standard JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        self.render_schema(&|kind| kind.to_string())
    }

    /// Render in the OpenAPI subset accepted by `generationConfig.responseSchema`.
    pub fn to_gemini_schema(&self) -> Value {
        self.render_schema(&|kind| kind.to_ascii_uppercase())
    }

    fn render_schema(&self, type_name: &dyn Fn(&str) -> String) -> Value {
        match self {
            Self::Text { description } => json!({
                "type": type_name("string"),
                "description": description,
            }),
            Self::List {
                items,
                min_items,
                description,
            } => {
                let mut schema = json!({
                    "type": type_name("array"),
                    "description": description,
                    "items": items.render_schema(type_name),
                });
                if *min_items > 0 {
                    schema["minItems"] = json!(min_items);
                }
                schema
            }
            Self::Object { fields } => {
                let mut properties = Map::new();
                for (name, shape) in fields {
                    properties.insert((*name).to_string(), shape.render_schema(type_name));
                }
                json!({
                    "type": type_name("object"),
                    "properties": properties,
                    "required": self.field_names(),
                })
            }
        }
    }

    /// Check a parsed reply against this shape. Extra object fields are
    /// ignored; missing or empty ones are not.
    pub fn check(&self, value: &Value) -> Result<(), SchemaMismatch> {
        self.check_at("$", value)
    }

    fn check_at(&self, path: &str, value: &Value) -> Result<(), SchemaMismatch> {
        match self {
            Self::Text { .. } => match value.as_str() {
                Some(text) if !text.trim().is_empty() => Ok(()),
                Some(_) => Err(SchemaMismatch::new(path, "text is empty")),
                None => Err(SchemaMismatch::new(
                    path,
                    format!("expected text, found {}", kind_of(value)),
                )),
            },
            Self::List {
                items, min_items, ..
            } => {
                let array = value.as_array().ok_or_else(|| {
                    SchemaMismatch::new(path, format!("expected a list, found {}", kind_of(value)))
                })?;
                if array.len() < *min_items {
                    return Err(SchemaMismatch::new(
                        path,
                        format!("expected at least {min_items} item(s), found {}", array.len()),
                    ));
                }
                for (idx, item) in array.iter().enumerate() {
                    items.check_at(&format!("{path}[{idx}]"), item)?;
                }
                Ok(())
            }
            Self::Object { fields } => {
                let object = value.as_object().ok_or_else(|| {
                    SchemaMismatch::new(
                        path,
                        format!("expected an object, found {}", kind_of(value)),
                    )
                })?;
                for (name, shape) in fields {
                    let field_path = format!("{path}.{name}");
                    match object.get(*name) {
                        Some(field) => shape.check_at(&field_path, field)?,
                        None => return Err(SchemaMismatch::new(field_path, "missing field")),
                    }
                }
                Ok(())
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
