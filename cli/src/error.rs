#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the plugin front end.

use derive_more::{Display, From};
use gapic_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Generator failure.
    #[display("Generator Error: {}", _0)]
    App(AppError),

    /// The request on stdin is not a valid `CodeGeneratorRequest`.
    #[display("Request Decode Error: {}", _0)]
    Decode(prost::DecodeError),

    /// The response could not be serialized.
    #[display("Response Encode Error: {}", _0)]
    Encode(prost::EncodeError),

    /// The files of the request do not form a valid descriptor pool.
    #[display("Descriptor Error: {}", _0)]
    Descriptor(prost_reflect::DescriptorError),

    /// A JSON descriptor set could not be parsed.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` wraps a `String`, which does not implement `std::error::Error`,
/// so `source()` cannot be derived.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_generator_errors() {
        let err: CliError = AppError::InvalidParameter("unknown parameter \"x\"".into()).into();
        assert_eq!(
            err.to_string(),
            "Generator Error: invalid parameter: unknown parameter \"x\""
        );
    }
}
