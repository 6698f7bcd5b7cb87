#![deny(missing_docs)]

//! # GAPIC CLI
//!
//! `protoc-gen-go_gapic`, the protoc plugin that generates Go GAPIC clients.
//!
//! Reads a `CodeGeneratorRequest` (stdin by default), runs the generator and
//! writes a `CodeGeneratorResponse` to stdout. Logs go to stderr.
//!
//! Debug inputs:
//! - `--request <file>`: a serialized request saved from protoc.
//! - `--descriptors-json <file>`: a JSON descriptor set.
//! - `--out-dir <dir>`: write the files instead of emitting a response.

use std::io::{Read, Write};
use std::path::PathBuf;

use chrono::Datelike;
use clap::Parser;
use gapic_core::{generate_with, GenerationOutput, GenerationRequest, GeneratorOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

mod error;
mod request;
mod response;

#[derive(Parser, Debug)]
#[clap(author, version, about = "protoc plugin generating Go GAPIC clients")]
struct Cli {
    /// Read the serialized CodeGeneratorRequest from a file instead of stdin.
    #[clap(long, value_name = "FILE", conflicts_with = "descriptors_json")]
    request: Option<PathBuf>,

    /// Read a JSON descriptor set instead of a protobuf request.
    #[clap(long, value_name = "FILE")]
    descriptors_json: Option<PathBuf>,

    /// Write generated files below this directory instead of emitting a response.
    #[clap(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `gapic_core=trace`.
    #[clap(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let request = load_request(&cli)?;
    tracing::info!(
        files = request.files.len(),
        to_generate = request.file_to_generate.len(),
        "loaded request"
    );
    let output = run(&request, chrono::Utc::now().year());

    match &cli.out_dir {
        Some(dir) => response::write_files(dir, &output)?,
        None => {
            let bytes = response::encode(&output)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn init_tracing(filter: &str) -> CliResult<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| CliError::General(format!("invalid log filter {:?}: {}", filter, e)))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| CliError::General(e.to_string()))
}

fn load_request(cli: &Cli) -> CliResult<GenerationRequest> {
    if let Some(path) = &cli.descriptors_json {
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }
    let bytes = match &cli.request {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut input = Vec::new();
            std::io::stdin().read_to_end(&mut input)?;
            input
        }
    };
    request::decode(&bytes)
}

/// Runs the generator. `year` fills the license header unless the request sets
/// `copyright-year`.
fn run(request: &GenerationRequest, year: i32) -> GenerationOutput {
    let mut options = match GeneratorOptions::parse(request.parameter.as_deref()) {
        Ok(options) => options,
        Err(err) => {
            tracing::error!(error = %err, "invalid plugin parameter");
            return GenerationOutput {
                files: Vec::new(),
                error: Some(err.to_string()),
            };
        }
    };
    options.copyright_year.get_or_insert(year);
    generate_with(&request.files, &request.file_to_generate, &options)
}
