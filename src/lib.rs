//! Schema Inliner
//!
//! Inline local JSON Schema definitions and batch-generate schema and sample
//! artifacts for many types.
//!
//! Two pieces make up the crate:
//!
//! - [`dereference`] rebuilds a schema document with every
//!   `#/definitions/<Name>` reference replaced by the definition it points to,
//!   and every `definitions` map removed.
//! - [`run`] takes a list of types, asks a [`SchemaGenerator`] for each schema
//!   and writes `schemas/<Name>.json`, optionally `schemas/<Name>.schema.json`,
//!   and `samples/<Name>.sample.json`. One type failing never stops the others;
//!   all failures come back together at the end.
//!
//! # Example
//!
//! ```
//! use schema_inline::dereference_document;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "definitions": {
//!         "Money": { "type": "number" }
//!     },
//!     "type": "object",
//!     "properties": {
//!         "total": { "$ref": "#/definitions/Money" },
//!         "spec": { "$ref": "https://example.com/spec.json" }
//!     }
//! });
//!
//! let inlined = dereference_document(&schema).unwrap();
//!
//! assert_eq!(inlined["properties"]["total"], json!({ "type": "number" }));
//! // Only local refs are inlined
//! assert_eq!(inlined["properties"]["spec"]["$ref"], "https://example.com/spec.json");
//! assert!(inlined.get("definitions").is_none());
//! ```
//!
//! # Artifacts
//!
//! | Artifact | Path |
//! |----------|------|
//! | Raw schema | `<out>/schemas/<Name>.json` |
//! | Dereferenced schema | `<out>/schemas/<Name>.schema.json` |
//! | Sample payload | `<out>/samples/<Name>.sample.json` |
//!
//! `<Name>` is the type's full name without its namespace prefix.

mod deref;
mod error;
mod loader;
mod pipeline;
mod resolver;
mod sample;
mod source;
mod types;
mod validator;

pub use deref::{dereference, dereference_document, is_stripped_key};
pub use error::{
    AggregateError, BoxError, DereferenceError, Failure, LoadError, PipelineError, RunSummary,
    SchemaError, SourceError, StepError, ValidateError,
};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str};
pub use pipeline::{
    run, CancelToken, PipelineOptions, DEFAULT_OUTPUT_DIR, SAMPLES_DIR, SCHEMAS_DIR,
};
pub use resolver::{local_ref_name, resolve_local_ref};
pub use sample::{DefaultSampleGenerator, DEFAULT_MAX_RECURSION_LEVEL};
pub use source::{
    filter_by_namespace, parse_filters, schemars_schema, ManifestSource, SampleGenerator,
    SchemaGenerator, SchemarsRegistry, TypeSource,
};
pub use types::{
    json_type_name, Operation, TypeDescriptor, DEFINITIONS_KEY, LOCAL_REF_PREFIX,
    NESTING_SEPARATOR, REF_KEY,
};
pub use validator::validate_against_schema;

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
