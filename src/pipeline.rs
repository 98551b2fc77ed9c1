//! Batch generation of schema and sample artifacts.
//!
//! Every top-level type gets a best-effort attempt. A failing step is recorded
//! and processing moves on; the run reports all failures together once every
//! type has been tried. Files written before a failure stay on disk.
//!
//! Layout under the output directory:
//!
//! | File | Written when |
//! |------|--------------|
//! | `schemas/<Name>.json` | always |
//! | `schemas/<Name>.schema.json` | dereferencing requested |
//! | `samples/<Name>.sample.json` | always |

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde_json::Value;

use crate::deref::dereference_document;
use crate::error::{AggregateError, Failure, PipelineError, RunSummary, StepError, ValidateError};
use crate::source::{SampleGenerator, SchemaGenerator};
use crate::types::{Operation, TypeDescriptor};
use crate::validator::validate_against_schema;

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = ".autogened";

/// Subdirectory for raw and dereferenced schemas.
pub const SCHEMAS_DIR: &str = "schemas";

/// Subdirectory for sample payloads.
pub const SAMPLES_DIR: &str = "samples";

/// Shared flag that stops a run from starting new types.
///
/// Types already in progress finish all of their steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root directory for `schemas/` and `samples/`.
    pub output_dir: PathBuf,
    /// Also write a dereferenced `<Name>.schema.json` per type.
    pub dereference: bool,
    /// Maximum number of types processed at the same time.
    pub concurrency: usize,
    /// Pretty-print written JSON.
    pub pretty: bool,
    /// Validate each sample against its schema before writing it.
    pub validate_samples: bool,
    pub cancel: Option<CancelToken>,
}

impl PipelineOptions {
    /// Create options writing under `output_dir`, without dereferencing.
    ///
    /// Concurrency defaults to the available parallelism of the machine.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dereference: false,
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            pretty: true,
            validate_samples: false,
            cancel: None,
        }
    }

    pub fn dereference(mut self, dereference: bool) -> Self {
        self.dereference = dereference;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn validate_samples(mut self, validate: bool) -> Self {
        self.validate_samples = validate;
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// Failures collected across all workers of one run.
#[derive(Debug, Default)]
struct ErrorLog {
    entries: Mutex<Vec<(usize, Failure)>>,
}

impl ErrorLog {
    fn record(&self, index: usize, failure: Failure) {
        tracing::warn!(
            type_name = %failure.type_name,
            operation = %failure.operation,
            error = %failure.error,
            "operation failed"
        );
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push((index, failure));
    }

    /// Failures in input type order, then in step order within a type.
    fn into_failures(self) -> Vec<Failure> {
        let mut entries = self.entries.into_inner().unwrap_or_else(|e| e.into_inner());
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, failure)| failure).collect()
    }
}

enum Outcome {
    Processed { files_written: usize },
    Cancelled,
}

/// Generate schema and sample artifacts for every top-level type in `types`.
///
/// Nested types (full name containing `+`) are skipped. Output directories
/// are created once up front.
///
/// # Errors
///
/// Returns `PipelineError::InvalidInput` before doing any work when the
/// options are unusable, `PipelineError::CreateDir` when the output
/// directories can't be created, and `PipelineError::Aggregate` after the run
/// when at least one step failed for at least one type.
pub fn run<G, S>(
    types: &[TypeDescriptor],
    schema_generator: &G,
    sample_generator: &S,
    options: &PipelineOptions,
) -> Result<RunSummary, PipelineError>
where
    G: SchemaGenerator + ?Sized,
    S: SampleGenerator + ?Sized,
{
    if options.output_dir.as_os_str().is_empty() {
        return Err(PipelineError::InvalidInput {
            message: "output directory must not be empty".to_string(),
        });
    }
    if options.concurrency == 0 {
        return Err(PipelineError::InvalidInput {
            message: "concurrency must be at least 1".to_string(),
        });
    }

    let mut summary = RunSummary::default();
    let mut top_level = Vec::new();
    for ty in types {
        if ty.is_nested() {
            tracing::debug!(type_name = %ty.full_name, "skipping nested type");
            summary.skipped_nested.push(ty.full_name.clone());
        } else {
            top_level.push(ty);
        }
    }

    for dir in [SCHEMAS_DIR, SAMPLES_DIR] {
        let path = options.output_dir.join(dir);
        std::fs::create_dir_all(&path)
            .map_err(|source| PipelineError::CreateDir { path, source })?;
    }

    tracing::info!(count = top_level.len(), "found schemas");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency)
        .build()
        .map_err(|source| PipelineError::ThreadPool { source })?;

    let log = ErrorLog::default();
    let outcomes: Vec<Outcome> = pool.install(|| {
        top_level
            .par_iter()
            .enumerate()
            .map(|(index, ty)| {
                process_type(ty, index, schema_generator, sample_generator, options, &log)
            })
            .collect()
    });

    for (ty, outcome) in top_level.iter().zip(outcomes) {
        match outcome {
            Outcome::Processed { files_written } => {
                summary.processed.push(ty.full_name.clone());
                summary.files_written += files_written;
            }
            Outcome::Cancelled => summary.cancelled.push(ty.full_name.clone()),
        }
    }

    let failures = log.into_failures();
    tracing::info!(
        processed = summary.processed.len(),
        files_written = summary.files_written,
        failures = failures.len(),
        "generation finished"
    );

    if failures.is_empty() {
        Ok(summary)
    } else {
        Err(PipelineError::Aggregate(AggregateError { failures, summary }))
    }
}

/// Steps for one type run in order; only a generation failure stops them.
fn process_type<G, S>(
    ty: &TypeDescriptor,
    index: usize,
    schema_generator: &G,
    sample_generator: &S,
    options: &PipelineOptions,
    log: &ErrorLog,
) -> Outcome
where
    G: SchemaGenerator + ?Sized,
    S: SampleGenerator + ?Sized,
{
    if options.is_cancelled() {
        return Outcome::Cancelled;
    }

    let output_name = ty.output_name();
    let mut files_written = 0;
    let mut step = |operation: Operation, result: Result<(), StepError>| match result {
        Ok(()) => files_written += 1,
        Err(error) => log.record(
            index,
            Failure {
                type_name: ty.full_name.clone(),
                output_name: output_name.to_string(),
                operation,
                error,
            },
        ),
    };

    tracing::info!(type_name = %ty.full_name, "generating schema");
    let schema = match schema_generator.generate(ty) {
        Ok(schema) => schema,
        Err(source) => {
            step(Operation::Generate, Err(StepError::Generation { source }));
            return Outcome::Processed { files_written: 0 };
        }
    };

    let schemas_dir = options.output_dir.join(SCHEMAS_DIR);

    let raw_path = schemas_dir.join(format!("{}.json", output_name));
    step(
        Operation::WriteSchema,
        write_json(&raw_path, &schema, options.pretty),
    );

    if options.dereference {
        let deref_path = schemas_dir.join(format!("{}.schema.json", output_name));
        let result = dereference_document(&schema)
            .map_err(StepError::from)
            .and_then(|inlined| write_json(&deref_path, &inlined, options.pretty));
        step(Operation::Dereference, result);
    }

    let sample_path = options
        .output_dir
        .join(SAMPLES_DIR)
        .join(format!("{}.sample.json", output_name));
    let result = build_sample(&schema, sample_generator, options.validate_samples)
        .and_then(|sample| write_json(&sample_path, &sample, options.pretty));
    step(Operation::WriteSample, result);

    Outcome::Processed { files_written }
}

fn build_sample<S>(schema: &Value, sample_generator: &S, validate: bool) -> Result<Value, StepError>
where
    S: SampleGenerator + ?Sized,
{
    let sample = sample_generator
        .generate_sample(schema)
        .map_err(|source| StepError::Sample { source })?;

    if validate {
        match validate_against_schema(schema, &sample) {
            Ok(()) => {}
            Err(ValidateError::Invalid { errors }) => {
                return Err(StepError::InvalidSample { errors })
            }
            Err(other) => {
                return Err(StepError::Sample {
                    source: other.into(),
                })
            }
        }
    }
    Ok(sample)
}

fn write_json(path: &Path, value: &Value, pretty: bool) -> Result<(), StepError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| StepError::Serialize { source })?;

    std::fs::write(path, text).map_err(|source| StepError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote artifact");
    Ok(())
}
