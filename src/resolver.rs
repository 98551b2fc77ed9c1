//! Local reference lookup against a schema document's `definitions` map.

use serde_json::Value;

use crate::types::{DEFINITIONS_KEY, LOCAL_REF_PREFIX, REF_KEY};

/// Returns the definition name of a local ref node.
///
/// `Some("Foo")` for `{"$ref": "#/definitions/Foo"}`; `None` for anything that
/// is not an object with a string `$ref` under the local prefix.
pub fn local_ref_name(node: &Value) -> Option<&str> {
    node.as_object()?
        .get(REF_KEY)?
        .as_str()?
        .strip_prefix(LOCAL_REF_PREFIX)
}

/// Resolve a local ref node against the original document.
///
/// Returns the referenced `definitions` entry, or `None` when `node` is not a
/// local ref or the definition does not exist. Unresolvable refs are not an
/// error: callers treat the node as an ordinary object.
pub fn resolve_local_ref<'a>(node: &Value, document: &'a Value) -> Option<&'a Value> {
    let name = local_ref_name(node)?;
    document
        .get(DEFINITIONS_KEY)?
        .as_object()?
        .get(name)
}
