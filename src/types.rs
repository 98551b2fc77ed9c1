//! Core types shared by the dereferencer and the batch pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of a `$ref` that points into the document's own `definitions` map.
pub const LOCAL_REF_PREFIX: &str = "#/definitions/";

/// Key holding the definitions map of a schema document.
pub const DEFINITIONS_KEY: &str = "definitions";

/// Key of a JSON Schema reference.
pub const REF_KEY: &str = "$ref";

/// Separator marking a type declared inside another type (`Outer+Inner`).
pub const NESTING_SEPARATOR: char = '+';

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One schema-worthy type handed to the pipeline by a type source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Fully-qualified name, e.g. `Acme.Orders.OrderPlaced`.
    pub full_name: String,
    /// Namespace the type lives in, e.g. `Acme.Orders`.
    pub namespace: String,
}

impl TypeDescriptor {
    pub fn new(namespace: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            namespace: namespace.into(),
        }
    }

    /// True when the type is declared inside another type.
    pub fn is_nested(&self) -> bool {
        self.full_name.contains(NESTING_SEPARATOR)
    }

    /// File stem for this type's artifacts: the full name without its
    /// `namespace.` prefix.
    ///
    /// Falls back to the full name when it does not start with the namespace.
    pub fn output_name(&self) -> &str {
        if self.namespace.is_empty() {
            return &self.full_name;
        }
        self.full_name
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&self.full_name)
    }
}

/// A single sub-step of per-type processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Invoking the schema generator.
    Generate,
    /// Writing `schemas/<name>.json`.
    WriteSchema,
    /// Dereferencing and writing `schemas/<name>.schema.json`.
    Dereference,
    /// Generating and writing `samples/<name>.sample.json`.
    WriteSample,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Generate => "generate schema",
            Operation::WriteSchema => "write schema",
            Operation::Dereference => "write dereferenced schema",
            Operation::WriteSample => "write sample",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_strips_namespace() {
        let ty = TypeDescriptor::new("Acme.Orders", "Acme.Orders.OrderPlaced");
        assert_eq!(ty.output_name(), "OrderPlaced");
    }

    #[test]
    fn output_name_falls_back_to_full_name() {
        let ty = TypeDescriptor::new("Other", "Acme.Orders.OrderPlaced");
        assert_eq!(ty.output_name(), "Acme.Orders.OrderPlaced");

        // Prefix match must stop at a segment boundary
        let ty = TypeDescriptor::new("Acme.Ord", "Acme.Orders.OrderPlaced");
        assert_eq!(ty.output_name(), "Acme.Orders.OrderPlaced");

        let ty = TypeDescriptor::new("", "OrderPlaced");
        assert_eq!(ty.output_name(), "OrderPlaced");
    }

    #[test]
    fn nested_types_detected() {
        assert!(TypeDescriptor::new("Acme", "Acme.Outer+Inner").is_nested());
        assert!(!TypeDescriptor::new("Acme", "Acme.Outer").is_nested());
    }

    #[test]
    fn descriptor_uses_camel_case_fields() {
        let ty: TypeDescriptor =
            serde_json::from_str(r#"{"fullName":"A.B","namespace":"A"}"#).unwrap();
        assert_eq!(ty, TypeDescriptor::new("A", "A.B"));
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&Value::Null), "null");
        assert_eq!(json_type_name(&serde_json::json!([1])), "array");
        assert_eq!(json_type_name(&serde_json::json!({})), "object");
    }
}
