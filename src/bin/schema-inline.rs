//! Schema Inliner CLI
//!
//! Command-line interface for batch schema generation and dereferencing.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_inline::{
    dereference_document, load_schema_auto, run, DefaultSampleGenerator, ManifestSource,
    PipelineOptions, TypeSource, DEFAULT_OUTPUT_DIR,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-inline")]
#[command(about = "Generate and dereference JSON Schemas for a set of types")]
#[command(version)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write schema and sample files for every matching type of a module manifest
    Generate {
        /// Path to the module manifest listing types and their schemas
        #[arg(long = "module", short = 'p')]
        module: PathBuf,

        /// Namespace filter; several can be given separated by commas
        #[arg(long, short = 'f', value_delimiter = ',', required = true)]
        namespace_filter: Vec<String>,

        /// Output directory
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Also write a dereferenced <Name>.schema.json per type
        #[arg(long, short = 'd')]
        deref_schema: bool,

        /// Number of types processed in parallel (default: available CPUs)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Check each sample against its schema before writing it
        #[arg(long)]
        validate_samples: bool,
    },

    /// Inline all #/definitions/ refs of a single schema
    Deref {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate {
            module,
            namespace_filter,
            output_dir,
            deref_schema,
            jobs,
            compact,
            validate_samples,
        } => {
            let mut options = PipelineOptions::new(output_dir)
                .dereference(deref_schema)
                .pretty(!compact)
                .validate_samples(validate_samples);
            if let Some(jobs) = jobs {
                options = options.concurrency(jobs);
            }
            run_generate(module, &namespace_filter, &options)
        }

        Commands::Deref {
            schema,
            output,
            pretty,
        } => run_deref(&schema, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_generate(
    module: PathBuf,
    filters: &[String],
    options: &PipelineOptions,
) -> Result<(), u8> {
    let source = ManifestSource::load(&module).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let types = source.list_candidate_types(filters).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let summary = run(&types, &source, &DefaultSampleGenerator::new(), options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    println!(
        "Generated {} files for {} types in {}",
        summary.files_written,
        summary.processed.len(),
        options.output_dir.display()
    );
    Ok(())
}

fn run_deref(schema_source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let schema = load_schema_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let inlined = dereference_document(&schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&inlined)
    } else {
        serde_json::to_string(&inlined)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
