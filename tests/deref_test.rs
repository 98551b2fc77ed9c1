//! Integration tests for schema dereferencing.

use schema_inline::{dereference, dereference_document, DereferenceError};
use serde_json::{json, Value};

/// True if any object in `value` has a `definitions` key.
fn has_definitions(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("definitions") || map.values().any(has_definitions),
        Value::Array(items) => items.iter().any(has_definitions),
        _ => false,
    }
}

/// True if any object in `value` has a `$ref` into `#/definitions/`.
fn has_local_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.get("$ref")
                .and_then(Value::as_str)
                .is_some_and(|r| r.starts_with("#/definitions/"))
                || map.values().any(has_local_ref)
        }
        Value::Array(items) => items.iter().any(has_local_ref),
        _ => false,
    }
}

mod substitution {
    use super::*;

    #[test]
    fn replaces_ref_with_definition() {
        let doc = json!({
            "definitions": { "Foo": { "type": "string" } },
            "properties": { "a": { "$ref": "#/definitions/Foo" } }
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(result, json!({ "properties": { "a": { "type": "string" } } }));
    }

    #[test]
    fn unresolvable_ref_passes_through() {
        let doc = json!({
            "definitions": { "Foo": { "type": "string" } },
            "properties": { "a": { "$ref": "#/definitions/Missing" } }
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(result["properties"]["a"], json!({ "$ref": "#/definitions/Missing" }));
    }

    #[test]
    fn non_local_ref_untouched() {
        let doc = json!({
            "definitions": { "Foo": { "type": "string" } },
            "properties": {
                "remote": { "$ref": "https://example.com/schema.json" },
                "defs": { "$ref": "#/$defs/Foo" }
            }
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(
            result["properties"]["remote"],
            json!({ "$ref": "https://example.com/schema.json" })
        );
        assert_eq!(result["properties"]["defs"], json!({ "$ref": "#/$defs/Foo" }));
    }

    #[test]
    fn ref_siblings_are_replaced_with_definition() {
        // The whole ref object is substituted, including extra keys next to $ref
        let doc = json!({
            "definitions": { "Foo": { "type": "string" } },
            "properties": {
                "a": { "$ref": "#/definitions/Foo", "description": "dropped" }
            }
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(result["properties"]["a"], json!({ "type": "string" }));
    }

    #[test]
    fn lookups_use_the_given_document() {
        let document = json!({ "definitions": { "Id": { "type": "integer" } } });
        let node = json!({ "items": { "$ref": "#/definitions/Id" } });

        let result = dereference(&node, &document).unwrap();
        assert_eq!(result, json!({ "items": { "type": "integer" } }));
    }

    #[test]
    fn realistic_schema_is_fully_inlined() {
        let doc = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "OrderPlaced",
            "type": "object",
            "required": ["id", "lines"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "customer": {
                    "anyOf": [{ "$ref": "#/definitions/Customer" }, { "type": "null" }]
                },
                "lines": {
                    "type": "array",
                    "items": { "$ref": "#/definitions/Line" }
                },
                "status": { "$ref": "#/definitions/Status" }
            },
            "definitions": {
                "Customer": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "address": { "$ref": "#/definitions/Address" }
                    }
                },
                "Address": {
                    "type": "object",
                    "properties": { "street": { "type": "string" } }
                },
                "Line": {
                    "type": "object",
                    "properties": {
                        "sku": { "type": "string" },
                        "quantity": { "type": "integer", "minimum": 1 },
                        "price": { "type": "number", "multipleOf": 0.01 }
                    }
                },
                "Status": { "type": "string", "enum": ["open", "closed"] }
            }
        });

        let result = dereference_document(&doc).unwrap();
        assert!(!has_definitions(&result));
        assert!(!has_local_ref(&result));
        assert_eq!(
            result["properties"]["customer"]["anyOf"][0]["properties"]["address"],
            json!({ "type": "object", "properties": { "street": { "type": "string" } } })
        );
        assert_eq!(result["properties"]["lines"]["items"]["properties"]["price"]["multipleOf"], json!(0.01));
        assert_eq!(result["properties"]["status"]["enum"], json!(["open", "closed"]));
        assert_eq!(result["required"], json!(["id", "lines"]));
    }
}

mod structure {
    use super::*;

    #[test]
    fn scalar_only_document_round_trips() {
        let doc = json!({
            "title": "Plain",
            "count": 3,
            "ratio": 0.25,
            "big": 18446744073709551615u64,
            "negative": -7,
            "flag": true,
            "nothing": null,
            "list": [1, "two", false, null]
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(result, doc);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            serde_json::to_string(&doc).unwrap()
        );
    }

    #[test]
    fn nested_definitions_stripped_everywhere() {
        let doc = json!({
            "properties": {
                "level1": {
                    "properties": {
                        "level2": {
                            "definitions": { "unrelated": true },
                            "type": "object"
                        }
                    }
                }
            }
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(
            result["properties"]["level1"]["properties"]["level2"],
            json!({ "type": "object" })
        );
        assert!(!has_definitions(&result));
    }

    #[test]
    fn definitions_inside_arrays_stripped() {
        let doc = json!({ "oneOf": [{ "definitions": {}, "type": "string" }] });
        let result = dereference_document(&doc).unwrap();
        assert_eq!(result, json!({ "oneOf": [{ "type": "string" }] }));
    }

    #[test]
    fn dereferencing_is_idempotent() {
        let doc = json!({
            "definitions": {
                "Foo": { "type": "object", "properties": { "x": { "type": "integer" } } }
            },
            "properties": {
                "a": { "$ref": "#/definitions/Foo" },
                "b": { "items": [{ "$ref": "#/definitions/Foo" }, { "const": 1 }] }
            }
        });

        let once = dereference_document(&doc).unwrap();
        let twice = dereference_document(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn array_order_preserved() {
        let doc = json!({
            "definitions": { "N": { "type": "null" } },
            "enum": ["c", "a", "b"],
            "anyOf": [{ "type": "string" }, { "$ref": "#/definitions/N" }, { "type": "integer" }]
        });

        let result = dereference_document(&doc).unwrap();
        assert_eq!(result["enum"], json!(["c", "a", "b"]));
        assert_eq!(
            result["anyOf"],
            json!([{ "type": "string" }, { "type": "null" }, { "type": "integer" }])
        );
    }
}

mod cycles {
    use super::*;

    #[test]
    fn self_referential_definition_fails_fast() {
        let doc = json!({
            "definitions": {
                "Tree": {
                    "type": "object",
                    "properties": {
                        "children": { "type": "array", "items": { "$ref": "#/definitions/Tree" } }
                    }
                }
            },
            "$ref": "#/definitions/Tree"
        });

        let err = dereference_document(&doc).unwrap_err();
        assert!(matches!(err, DereferenceError::CyclicReference { .. }));
        assert_eq!(err.to_string(), "cyclic reference: Tree -> Tree");
    }

    #[test]
    fn mutual_alias_cycle_detected() {
        let doc = json!({
            "definitions": {
                "A": { "$ref": "#/definitions/B" },
                "B": { "$ref": "#/definitions/A" }
            },
            "properties": { "x": { "$ref": "#/definitions/A" } }
        });

        let err = dereference_document(&doc).unwrap_err();
        assert_eq!(
            err,
            DereferenceError::CyclicReference {
                chain: vec!["A".into(), "B".into(), "A".into()]
            }
        );
    }

    #[test]
    fn unused_cyclic_definition_is_harmless() {
        // Definitions are only expanded where referenced
        let doc = json!({
            "definitions": {
                "Loop": { "properties": { "self": { "$ref": "#/definitions/Loop" } } }
            },
            "type": "string"
        });

        assert_eq!(dereference_document(&doc).unwrap(), json!({ "type": "string" }));
    }
}
