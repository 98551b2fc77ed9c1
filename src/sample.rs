//! Example payload generation from a schema document.

use serde_json::{json, Map, Value};

use crate::error::BoxError;
use crate::resolver::{local_ref_name, resolve_local_ref};
use crate::source::SampleGenerator;
use crate::types::json_type_name;

/// How many times one definition may be entered on a single path before a
/// recursive reference is sampled as `null`.
pub const DEFAULT_MAX_RECURSION_LEVEL: usize = 3;

/// Builds a representative payload for a schema.
///
/// Explicit values win: `examples[0]`, then `default`, `const` and `enum[0]`.
/// Otherwise the sample is derived from `type`: every object property is
/// filled, arrays get one item, strings honor common formats and fall back to
/// the property name.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSampleGenerator {
    pub max_recursion_level: usize,
}

impl Default for DefaultSampleGenerator {
    fn default() -> Self {
        Self {
            max_recursion_level: DEFAULT_MAX_RECURSION_LEVEL,
        }
    }
}

impl DefaultSampleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_recursion_level(mut self, level: usize) -> Self {
        self.max_recursion_level = level;
        self
    }

    fn sample(
        &self,
        node: &Value,
        document: &Value,
        name: Option<&str>,
        entered: &mut Vec<String>,
    ) -> Value {
        if let Some(definition) = resolve_local_ref(node, document) {
            let def_name = local_ref_name(node).unwrap_or_default().to_string();
            if entered.iter().filter(|n| **n == def_name).count() >= self.max_recursion_level {
                return Value::Null;
            }
            entered.push(def_name);
            let result = self.sample(definition, document, name, entered);
            entered.pop();
            return result;
        }

        let Some(schema) = node.as_object() else {
            return Value::Null;
        };

        if let Some(example) = schema
            .get("examples")
            .and_then(Value::as_array)
            .and_then(|e| e.first())
        {
            return example.clone();
        }
        if let Some(value) = schema.get("default").or_else(|| schema.get("const")) {
            return value.clone();
        }
        if let Some(first) = schema
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|e| e.first())
        {
            return first.clone();
        }

        if let Some(Value::Array(parts)) = schema.get("allOf") {
            let mut merged = match self.sample_typed(schema, document, name, entered) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            for part in parts {
                if let Value::Object(map) = self.sample(part, document, name, entered) {
                    for (k, v) in map {
                        merged.entry(k).or_insert(v);
                    }
                }
            }
            return Value::Object(merged);
        }

        for key in ["oneOf", "anyOf"] {
            if let Some(Value::Array(branches)) = schema.get(key) {
                let branch = branches
                    .iter()
                    .find(|b| b.get("type") != Some(&json!("null")))
                    .or_else(|| branches.first());
                if let Some(branch) = branch {
                    return self.sample(branch, document, name, entered);
                }
            }
        }

        self.sample_typed(schema, document, name, entered)
    }

    fn sample_typed(
        &self,
        schema: &Map<String, Value>,
        document: &Value,
        name: Option<&str>,
        entered: &mut Vec<String>,
    ) -> Value {
        match schema_type(schema) {
            Some("object") => {
                let mut result = Map::new();
                if let Some(Value::Object(props)) = schema.get("properties") {
                    for (prop_name, prop) in props {
                        let value = self.sample(prop, document, Some(prop_name), entered);
                        result.insert(prop_name.clone(), value);
                    }
                }
                Value::Object(result)
            }
            Some("array") => match schema.get("items") {
                Some(Value::Array(tuple)) => Value::Array(
                    tuple
                        .iter()
                        .map(|item| self.sample(item, document, name, entered))
                        .collect(),
                ),
                Some(item) => Value::Array(vec![self.sample(item, document, name, entered)]),
                None => Value::Array(Vec::new()),
            },
            Some("string") => sample_string(schema, name),
            Some("integer") => schema.get("minimum").cloned().unwrap_or(json!(0)),
            Some("number") => schema.get("minimum").cloned().unwrap_or(json!(0.0)),
            Some("boolean") => Value::Bool(false),
            _ => Value::Null,
        }
    }
}

impl SampleGenerator for DefaultSampleGenerator {
    fn generate_sample(&self, schema: &Value) -> Result<Value, BoxError> {
        match schema {
            Value::Object(_) => Ok(self.sample(schema, schema, None, &mut Vec::new())),
            Value::Bool(_) => Ok(Value::Null),
            other => Err(format!(
                "cannot sample a schema of type {}, expected object",
                json_type_name(other)
            )
            .into()),
        }
    }
}

/// The declared type, taking the first non-null entry of a type list and
/// inferring object/array from `properties`/`items`.
fn schema_type(schema: &Map<String, Value>) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .or(Some("null")),
        _ if schema.contains_key("properties") => Some("object"),
        _ if schema.contains_key("items") => Some("array"),
        _ => None,
    }
}

fn sample_string(schema: &Map<String, Value>, name: Option<&str>) -> Value {
    let text = match schema.get("format").and_then(Value::as_str) {
        Some("date-time") => "2020-01-01T00:00:00Z",
        Some("date") => "2020-01-01",
        Some("time") => "00:00:00",
        Some("uuid") => "00000000-0000-0000-0000-000000000000",
        Some("email") => "user@example.com",
        Some("uri") => "https://example.com/",
        _ => name.unwrap_or("string"),
    };
    Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(schema: Value) -> Value {
        DefaultSampleGenerator::new().generate_sample(&schema).unwrap()
    }

    #[test]
    fn object_properties_filled() {
        let result = sample(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "count": { "type": "integer" },
                "price": { "type": "number" },
                "active": { "type": "boolean" },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }));
        assert_eq!(
            result,
            json!({
                "name": "name",
                "count": 0,
                "price": 0.0,
                "active": false,
                "tags": ["tags"]
            })
        );
    }

    #[test]
    fn explicit_values_win() {
        let result = sample(json!({
            "type": "object",
            "properties": {
                "a": { "type": "string", "examples": ["ex"] },
                "b": { "type": "integer", "default": 7 },
                "c": { "const": "fixed" },
                "d": { "type": "string", "enum": ["first", "second"] }
            }
        }));
        assert_eq!(result, json!({ "a": "ex", "b": 7, "c": "fixed", "d": "first" }));
    }

    #[test]
    fn formats_and_nullable_types() {
        let result = sample(json!({
            "properties": {
                "at": { "type": "string", "format": "date-time" },
                "id": { "type": ["null", "string"], "format": "uuid" },
                "nothing": { "type": "null" }
            }
        }));
        assert_eq!(result["at"], "2020-01-01T00:00:00Z");
        assert_eq!(result["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(result["nothing"], Value::Null);
    }

    #[test]
    fn follows_local_refs_and_any_of() {
        let result = sample(json!({
            "definitions": { "Address": { "type": "object", "properties": { "street": { "type": "string" } } } },
            "type": "object",
            "properties": {
                "home": { "$ref": "#/definitions/Address" },
                "work": { "anyOf": [{ "type": "null" }, { "$ref": "#/definitions/Address" }] }
            }
        }));
        assert_eq!(result["home"], json!({ "street": "street" }));
        assert_eq!(result["work"], json!({ "street": "street" }));
    }

    #[test]
    fn all_of_merges_objects() {
        let result = sample(json!({
            "allOf": [
                { "properties": { "a": { "type": "integer" } } },
                { "properties": { "b": { "type": "boolean" } } }
            ]
        }));
        assert_eq!(result, json!({ "a": 0, "b": false }));
    }

    #[test]
    fn recursion_is_bounded() {
        let schema = json!({
            "definitions": {
                "Node": {
                    "type": "object",
                    "properties": { "next": { "$ref": "#/definitions/Node" } }
                }
            },
            "$ref": "#/definitions/Node"
        });
        let result = DefaultSampleGenerator::new()
            .max_recursion_level(2)
            .generate_sample(&schema)
            .unwrap();
        assert_eq!(result, json!({ "next": { "next": null } }));
    }

    #[test]
    fn non_object_schema_is_an_error() {
        let err = DefaultSampleGenerator::new()
            .generate_sample(&json!([1]))
            .unwrap_err();
        assert!(err.to_string().contains("expected object"));
    }
}
