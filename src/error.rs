//! Error types for schema loading, dereferencing and batch generation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Operation;

/// Error type returned by pluggable collaborators (schema and sample generators).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors while loading a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors during dereferencing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DereferenceError {
    #[error("cyclic reference: {}", chain.join(" -> "))]
    CyclicReference {
        /// Definition names along the cycle; the last entry repeats an earlier one.
        chain: Vec<String>,
    },
}

impl DereferenceError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors produced by type sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("module path must not be empty")]
    EmptyPath,

    #[error("at least one non-empty namespace filter is required")]
    EmptyFilter,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },
}

impl SourceError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SourceError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Failure of a single per-type sub-step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("schema generation failed: {source}")]
    Generation {
        #[source]
        source: BoxError,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize JSON: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Dereference(#[from] DereferenceError),

    #[error("sample generation failed: {source}")]
    Sample {
        #[source]
        source: BoxError,
    },

    #[error("generated sample does not match its schema: {}", join_schema_errors(errors))]
    InvalidSample { errors: Vec<SchemaError> },
}

fn join_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One recorded per-type failure.
#[derive(Debug)]
pub struct Failure {
    /// Fully-qualified type name.
    pub type_name: String,
    /// Artifact file stem of the type.
    pub output_name: String,
    pub operation: Operation,
    pub error: StepError,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ERROR: cannot {} for {} in {}: {}",
            self.operation, self.output_name, self.type_name, self.error
        )
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Full names of the types that went through processing, in input order.
    pub processed: Vec<String>,
    /// Full names of nested types that were excluded.
    pub skipped_nested: Vec<String>,
    /// Full names of types never started because the run was cancelled.
    pub cancelled: Vec<String>,
    /// Number of artifact files written.
    pub files_written: usize,
}

/// All failures of one run, surfaced once after every type was attempted.
#[derive(Debug)]
pub struct AggregateError {
    pub failures: Vec<Failure>,
    pub summary: RunSummary,
}

impl AggregateError {
    /// Full names of the types with at least one failure, deduplicated.
    pub fn failed_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !names.contains(&failure.type_name.as_str()) {
                names.push(&failure.type_name);
            }
        }
        names
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Errors returned by a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start worker pool: {source}")]
    ThreadPool {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("{count} operation(s) failed:\n{0}", count = .0.failures.len())]
    Aggregate(AggregateError),
}

impl PipelineError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Aggregate(_) => 1,
            PipelineError::InvalidInput { .. } => 2,
            PipelineError::CreateDir { .. } | PipelineError::ThreadPool { .. } => 3,
        }
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
