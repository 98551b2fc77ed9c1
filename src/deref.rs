//! Dereferencing: inline every local `#/definitions/...` ref of a document.
//!
//! The input is never modified. The result is a new tree built while all ref
//! lookups go against the original document, so a half-built output is never
//! consulted.
//!
//! ```
//! use schema_inline::dereference_document;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "definitions": { "Foo": { "type": "string" } },
//!     "properties": { "a": { "$ref": "#/definitions/Foo" } }
//! });
//!
//! let inlined = dereference_document(&doc).unwrap();
//! assert_eq!(inlined, json!({ "properties": { "a": { "type": "string" } } }));
//! ```

use serde_json::{Map, Value};

use crate::error::DereferenceError;
use crate::resolver::{local_ref_name, resolve_local_ref};
use crate::types::DEFINITIONS_KEY;

/// Dereference `node`, resolving local refs against `document`.
///
/// Every resolvable local ref is replaced by its (recursively dereferenced)
/// definition, and every `definitions` property is dropped from every object
/// in the result. Refs that do not resolve, or do not point into
/// `#/definitions/`, are kept as-is.
///
/// # Errors
///
/// Returns `DereferenceError::CyclicReference` when a definition refers back
/// to itself, directly or through other definitions.
pub fn dereference(node: &Value, document: &Value) -> Result<Value, DereferenceError> {
    let mut expanding = Vec::new();
    expand(node, document, &mut expanding)
}

/// Dereference a whole document against itself.
pub fn dereference_document(document: &Value) -> Result<Value, DereferenceError> {
    dereference(document, document)
}

/// Whether `key` is dropped from a rebuilt object.
///
/// Applies at every object level, not only the root. Dropped values are never
/// expanded, so an unused cyclic definition does not fail the document.
pub fn is_stripped_key(key: &str) -> bool {
    key == DEFINITIONS_KEY
}

// --- Internal implementation ---

/// Ref-or-recurse rule shared by array elements and object properties.
///
/// `expanding` holds the definition names currently being inlined on this
/// recursion path.
fn expand(
    node: &Value,
    document: &Value,
    expanding: &mut Vec<String>,
) -> Result<Value, DereferenceError> {
    let Some(definition) = resolve_local_ref(node, document) else {
        return rebuild(node, document, expanding);
    };
    // resolve_local_ref only matches nodes with a local ref name
    let name = local_ref_name(node).unwrap_or_default();

    if expanding.iter().any(|n| n == name) {
        let start = expanding.iter().position(|n| n == name).unwrap_or(0);
        let mut chain = expanding[start..].to_vec();
        chain.push(name.to_string());
        return Err(DereferenceError::CyclicReference { chain });
    }

    expanding.push(name.to_string());
    // Alias definitions (a bare ref to another definition) resolve again here
    let result = expand(definition, document, expanding);
    expanding.pop();
    result
}

fn rebuild(
    node: &Value,
    document: &Value,
    expanding: &mut Vec<String>,
) -> Result<Value, DereferenceError> {
    match node {
        Value::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for item in items {
                result.push(expand(item, document, expanding)?);
            }
            Ok(Value::Array(result))
        }
        Value::Object(map) => {
            let mut result = Map::new();
            for (key, value) in map {
                if is_stripped_key(key) {
                    continue;
                }
                result.insert(key.clone(), expand(value, document, expanding)?);
            }
            Ok(Value::Object(result))
        }
        // Scalars are leaves
        other => Ok(other.clone()),
    }
}
