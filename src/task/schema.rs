//! Structural input schema
//!
//! A task's declared inputs are mapped to a JSON Schema object whose
//! properties are keyed by dotted input name. The flattened bound values are
//! checked against it before the task runs. Validation collects every
//! violation instead of stopping at the first one.

use crate::error::FieldError;
use crate::task::{FlatInputs, InputSpec, Value};
use serde_json::{Map, Value as Json};
use tracing::warn;

/// Schema built from a task's inputs
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    document: Json,
}

impl InputSchema {
    /// Build the schema: one property per input, required when it has no default
    pub fn from_inputs(inputs: &[InputSpec]) -> Self {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for input in inputs {
            properties.insert(input.name.clone(), property(input));
            if input.required() {
                required.push(Json::String(input.name.clone()));
            }
        }

        let mut document = Map::new();
        document.insert("type".to_string(), Json::from("object"));
        document.insert("properties".to_string(), Json::Object(properties));
        document.insert("required".to_string(), Json::Array(required));

        InputSchema {
            document: Json::Object(document),
        }
    }

    /// The JSON Schema document
    pub fn document(&self) -> &Json {
        &self.document
    }

    /// Names of the required properties
    pub fn required(&self) -> Vec<&str> {
        self.document["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Json::as_str).collect())
            .unwrap_or_default()
    }

    fn properties(&self) -> impl Iterator<Item = (&String, &Json)> {
        self.document["properties"].as_object().into_iter().flatten()
    }

    /// Validate flattened values; keys without a property are allowed
    pub fn validate(&self, values: &FlatInputs) -> Result<(), Vec<FieldError>> {
        let instance = Json::Object(
            values
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value)))
                .collect(),
        );

        let valid = jsonschema::validator_for(&self.document)
            .map(|validator| validator.is_valid(&instance))
            .unwrap_or(false);
        if valid {
            return Ok(());
        }

        // Checked property by property so each violation names its input
        let required = self.required();
        let mut errors = Vec::new();
        for (name, property) in self.properties() {
            match instance.get(name) {
                None if required.contains(&name.as_str()) => {
                    errors.push(FieldError::new(name, "is required"));
                }
                None => {}
                Some(value) => match jsonschema::validator_for(property) {
                    Ok(validator) => errors.extend(
                        validator
                            .iter_errors(value)
                            .map(|e| FieldError::new(name, e.to_string())),
                    ),
                    Err(e) => errors.push(FieldError::new(name, format!("invalid schema: {}", e))),
                },
            }
        }

        errors.sort_by(|a, b| a.field.cmp(&b.field));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Schema property for one input; the declared type overrides an extra `type`
fn property(input: &InputSpec) -> Json {
    let mut property = Map::new();

    for (keyword, constraint) in &input.extra {
        match serde_json::to_value(constraint) {
            Ok(value) => {
                property.insert(keyword.clone(), value);
            }
            Err(e) => {
                warn!(input = %input.name, keyword = %keyword, error = %e, "schema keyword is not valid JSON, ignoring it");
            }
        }
    }

    property.insert("type".to_string(), Json::from(input.type_name()));
    if let Some(description) = &input.description {
        property.insert("description".to_string(), Json::from(description.as_str()));
    }

    Json::Object(property)
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Int(i) => Json::from(*i),
        Value::Bool(b) => Json::Bool(*b),
    }
}
