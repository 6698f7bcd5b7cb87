#![deny(missing_docs)]

//! # GAPIC Core
//!
//! Core library of the Go GAPIC client generator: the protobuf descriptor model,
//! method classification, retry synthesis, import resolution and the Go emitters.

/// Shared error types.
pub mod error;

/// Protobuf descriptor model consumed by the generator.
pub mod descriptor;

/// Fully-qualified name lookup across a set of files.
pub mod index;

/// Go import resolution and ordering.
pub mod imports;

/// Call-shape classification of RPC methods.
pub mod classify;

/// Default retry policies.
pub mod retry;

/// Indentation-aware line writer.
pub mod emitter;

/// Identifier casing helpers.
pub mod naming;

/// Plugin parameter parsing.
pub mod options;

/// Page-token iteration protocol used by generated iterators.
pub mod paging;

/// Client file generation.
pub mod generator;

pub use classify::{classify, CallShape, PageElement};
pub use descriptor::{
    FieldDescriptor, FieldKind, FileDescriptor, GenerationRequest, HttpRule, HttpVerb,
    MessageDescriptor, MethodDescriptor, ServiceDescriptor, SourceLocation,
};
pub use error::{AppError, AppResult};
pub use generator::{generate, generate_with, GeneratedFile, GenerationOutput, GENERATOR_VERSION};
pub use index::DescriptorIndex;
pub use options::GeneratorOptions;
pub use retry::RetryPolicy;
