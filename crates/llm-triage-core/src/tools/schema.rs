//! Parameter schema builders
//!
//! Every operation takes a flat object whose fields are all required and
//! which rejects unknown keys. Only the field kinds the catalog needs are
//! supported.

use serde_json::{json, Map, Value};

use super::error::{RegistryResult, ToolError};

/// A non-empty, ordered set of allowed string values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    values: Vec<String>,
}

impl EnumSchema {
    /// Build from a fixed list. Fails if `values` is empty.
    pub fn new<I, S>(field: &str, values: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ToolError::SchemaBuild(field.to_string()));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn to_json(&self) -> Value {
        json!({ "type": "string", "enum": self.values })
    }
}

/// Pick the live values when there are any, otherwise the fallback.
///
/// Evaluated once while the registry is built. Order is preserved.
pub fn build_enum_schema(
    field: &str,
    live: Option<&[String]>,
    fallback: &[String],
) -> RegistryResult<EnumSchema> {
    match live {
        Some(values) if !values.is_empty() => EnumSchema::new(field, values.iter().cloned()),
        _ => EnumSchema::new(field, fallback.iter().cloned()),
    }
}

#[derive(Debug, Clone)]
enum FieldKind {
    String,
    Enum(EnumSchema),
    EnumArray(EnumSchema),
}

/// Builder for an operation's parameter object
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    fields: Vec<(String, Option<String>, FieldKind)>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-form string field
    pub fn string(mut self, name: &str, description: Option<&str>) -> Self {
        self.fields
            .push((name.to_string(), description.map(String::from), FieldKind::String));
        self
    }

    /// String field limited to `values`
    pub fn enumeration(mut self, name: &str, description: Option<&str>, values: EnumSchema) -> Self {
        self.fields
            .push((name.to_string(), description.map(String::from), FieldKind::Enum(values)));
        self
    }

    /// Array field whose items are limited to `values`
    pub fn enum_array(mut self, name: &str, description: Option<&str>, values: EnumSchema) -> Self {
        self.fields.push((
            name.to_string(),
            description.map(String::from),
            FieldKind::EnumArray(values),
        ));
        self
    }

    /// Render as a JSON Schema object
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for (name, description, kind) in &self.fields {
            let mut prop = match kind {
                FieldKind::String => json!({ "type": "string" }),
                FieldKind::Enum(values) => values.to_json(),
                FieldKind::EnumArray(values) => json!({
                    "type": "array",
                    "items": values.to_json(),
                }),
            };
            if let Some(d) = description {
                prop["description"] = Value::String(d.clone());
            }
            properties.insert(name.clone(), prop);
        }

        let required: Vec<&str> = self.fields.iter().map(|(n, _, _)| n.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
