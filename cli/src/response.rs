//! # Response Encoding
//!
//! Writes a run's outcome either as a protoc `CodeGeneratorResponse` or, for local
//! debugging, as files under a directory.

use crate::error::{CliError, CliResult};
use gapic_core::GenerationOutput;
use prost::Message;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use std::fs;
use std::path::Path;

/// Serializes the outcome. A failed run carries its error and no files.
pub fn encode(output: &GenerationOutput) -> CliResult<Vec<u8>> {
    let response = CodeGeneratorResponse {
        error: output.error.clone(),
        supported_features: Some(code_generator_response::Feature::Proto3Optional as u64),
        file: output
            .files
            .iter()
            .map(|f| code_generator_response::File {
                name: Some(f.name.clone()),
                content: Some(f.content.clone()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };
    let mut bytes = Vec::new();
    response.encode(&mut bytes)?;
    Ok(bytes)
}

/// Writes every generated file below `dir`, creating directories as needed.
pub fn write_files(dir: &Path, output: &GenerationOutput) -> CliResult<()> {
    if let Some(error) = &output.error {
        return Err(CliError::General(error.clone()));
    }
    for file in &output.files {
        let path = dir.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)?;
        tracing::info!(path = %path.display(), "wrote file");
    }
    Ok(())
}
