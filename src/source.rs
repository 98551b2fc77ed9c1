//! Type sources and schema generators feeding the batch pipeline.
//!
//! The pipeline never cares where types come from. A [`TypeSource`] lists
//! candidate types, a [`SchemaGenerator`] turns one into a schema document and
//! a [`SampleGenerator`] turns a schema into an example payload. Two sources
//! ship with the crate:
//!
//! - [`ManifestSource`]: a JSON manifest file listing types with their schemas.
//! - [`SchemarsRegistry`]: Rust types deriving `schemars::JsonSchema`.

use std::path::Path;

use schemars::r#gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BoxError, SourceError};
use crate::loader::load_schema;
use crate::types::{json_type_name, TypeDescriptor};

/// Lists the types a pipeline run should process.
pub trait TypeSource {
    /// Returns every known type whose full name contains one of `filters`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::EmptyFilter` when `filters` is empty or holds a
    /// blank entry.
    fn list_candidate_types(&self, filters: &[String]) -> Result<Vec<TypeDescriptor>, SourceError>;
}

/// Turns a type into a JSON Schema document.
pub trait SchemaGenerator: Sync {
    fn generate(&self, ty: &TypeDescriptor) -> Result<Value, BoxError>;
}

impl<F> SchemaGenerator for F
where
    F: Fn(&TypeDescriptor) -> Result<Value, BoxError> + Sync,
{
    fn generate(&self, ty: &TypeDescriptor) -> Result<Value, BoxError> {
        self(ty)
    }
}

/// Produces an example payload for a schema document.
pub trait SampleGenerator: Sync {
    fn generate_sample(&self, schema: &Value) -> Result<Value, BoxError>;
}

impl<F> SampleGenerator for F
where
    F: Fn(&Value) -> Result<Value, BoxError> + Sync,
{
    fn generate_sample(&self, schema: &Value) -> Result<Value, BoxError> {
        self(schema)
    }
}

/// Check a filter list and select the matching types, keeping their order.
pub fn filter_by_namespace<'a, I>(types: I, filters: &[String]) -> Result<Vec<TypeDescriptor>, SourceError>
where
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    if filters.is_empty() || filters.iter().any(|f| f.trim().is_empty()) {
        return Err(SourceError::EmptyFilter);
    }

    let found: Vec<TypeDescriptor> = types
        .into_iter()
        .filter(|ty| filters.iter().any(|f| ty.full_name.contains(f.trim())))
        .cloned()
        .collect();

    for ty in &found {
        tracing::info!(type_name = %ty.full_name, "adding type");
    }
    Ok(found)
}

/// Split a comma-separated filter argument into entries.
pub fn parse_filters(raw: &str) -> Vec<String> {
    raw.split(',').map(|f| f.trim().to_string()).collect()
}

// --- Manifest source ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    #[serde(flatten)]
    descriptor: TypeDescriptor,
    #[serde(default)]
    schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    types: Vec<ManifestEntry>,
}

/// Types and their schemas read from a JSON manifest file.
///
/// ```json
/// {
///   "types": [
///     {
///       "fullName": "Acme.Orders.OrderPlaced",
///       "namespace": "Acme.Orders",
///       "schema": { "type": "object" }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ManifestSource {
    entries: Vec<ManifestEntry>,
}

impl ManifestSource {
    /// Load a manifest from `path`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::EmptyPath` for an empty path, `SourceError::Load`
    /// if the file can't be read or parsed, and `SourceError::InvalidManifest`
    /// if it does not have the manifest shape.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        if path.as_os_str().is_empty() {
            return Err(SourceError::EmptyPath);
        }
        let raw = load_schema(path)?;
        Self::from_value(raw)
    }

    /// Build a manifest from an already parsed JSON value.
    pub fn from_value(raw: Value) -> Result<Self, SourceError> {
        let manifest: Manifest =
            serde_json::from_value(raw).map_err(|e| SourceError::InvalidManifest {
                message: e.to_string(),
            })?;
        Ok(Self {
            entries: manifest.types,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeSource for ManifestSource {
    fn list_candidate_types(&self, filters: &[String]) -> Result<Vec<TypeDescriptor>, SourceError> {
        filter_by_namespace(self.entries.iter().map(|e| &e.descriptor), filters)
    }
}

impl SchemaGenerator for ManifestSource {
    fn generate(&self, ty: &TypeDescriptor) -> Result<Value, BoxError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor == *ty)
            .ok_or_else(|| format!("unknown type {}", ty.full_name))?;

        match &entry.schema {
            Some(schema @ Value::Object(_)) => Ok(schema.clone()),
            Some(other) => Err(format!(
                "schema for {} must be an object, got {}",
                ty.full_name,
                json_type_name(other)
            )
            .into()),
            None => Err(format!("no schema provided for {}", ty.full_name).into()),
        }
    }
}

// --- schemars registry ---

type SchemaFn = fn() -> Result<Value, serde_json::Error>;

/// Draft-07 schema for `T`, with shared types under `definitions`.
pub fn schemars_schema<T: JsonSchema>() -> Result<Value, serde_json::Error> {
    let root = SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<T>();
    serde_json::to_value(root)
}

/// Rust types registered for schema generation through `schemars`.
#[derive(Debug, Clone, Default)]
pub struct SchemarsRegistry {
    entries: Vec<(TypeDescriptor, SchemaFn)>,
}

impl SchemarsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` as `<namespace>.<schema name>`.
    pub fn register<T: JsonSchema>(self, namespace: &str) -> Self {
        let full_name = format!("{}.{}", namespace, T::schema_name());
        self.register_as::<T>(namespace, full_name)
    }

    /// Register `T` under an explicit full name.
    pub fn register_as<T: JsonSchema>(mut self, namespace: &str, full_name: impl Into<String>) -> Self {
        self.entries.push((
            TypeDescriptor::new(namespace, full_name),
            schemars_schema::<T> as SchemaFn,
        ));
        self
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.entries.iter().map(|(ty, _)| ty)
    }
}

impl TypeSource for SchemarsRegistry {
    fn list_candidate_types(&self, filters: &[String]) -> Result<Vec<TypeDescriptor>, SourceError> {
        filter_by_namespace(self.types(), filters)
    }
}

impl SchemaGenerator for SchemarsRegistry {
    fn generate(&self, ty: &TypeDescriptor) -> Result<Value, BoxError> {
        let (_, schema_fn) = self
            .entries
            .iter()
            .find(|(known, _)| known == ty)
            .ok_or_else(|| format!("unknown type {}", ty.full_name))?;
        Ok(schema_fn()?)
    }
}
