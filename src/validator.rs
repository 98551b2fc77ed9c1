//! Sample validation against the schema it was generated from.

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};

/// Validate an instance against a schema document.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema itself can't be
/// compiled, or `ValidateError::Invalid` with every violation found.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
