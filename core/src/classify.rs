#![deny(missing_docs)]

//! # Method Classification
//!
//! Assigns every method exactly one call shape. The decision is a pure function
//! of the method flags and the request/response messages:
//!
//! 1. output is `google.longrunning.Operation` → long-running,
//! 2. request/response follow the page-token convention → paged,
//! 3. otherwise the streaming flags decide.

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor, MethodDescriptor, LRO_TYPE};
use crate::error::{AppError, AppResult};
use std::fmt;

/// How a method is exposed on the generated client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallShape<'a> {
    /// Request in, response out.
    Unary,
    /// Request in, stream of responses out.
    ServerStreaming,
    /// Stream of requests in, one response out.
    ClientStreaming,
    /// Streams in both directions.
    BidiStreaming,
    /// Unary call following the page-token convention; carries the element field.
    PagedUnary(&'a FieldDescriptor),
    /// Returns a long-running operation handle.
    LongRunning,
}

impl fmt::Display for CallShape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallShape::Unary => write!(f, "unary"),
            CallShape::ServerStreaming => write!(f, "server-streaming"),
            CallShape::ClientStreaming => write!(f, "client-streaming"),
            CallShape::BidiStreaming => write!(f, "bidi-streaming"),
            CallShape::PagedUnary(field) => write!(f, "paged({})", field.name),
            CallShape::LongRunning => write!(f, "long-running"),
        }
    }
}

/// Classifies `method`, given its resolved request and response messages.
pub fn classify<'a>(
    method: &MethodDescriptor,
    input: &MessageDescriptor,
    output: &'a MessageDescriptor,
) -> AppResult<CallShape<'a>> {
    if method.output_type == LRO_TYPE {
        return Ok(CallShape::LongRunning);
    }
    if let Some(field) = paging_field(method, input, output)? {
        return Ok(CallShape::PagedUnary(field));
    }
    Ok(match (method.client_streaming, method.server_streaming) {
        (true, true) => CallShape::BidiStreaming,
        (false, true) => CallShape::ServerStreaming,
        (true, false) => CallShape::ClientStreaming,
        (false, false) => CallShape::Unary,
    })
}

/// Detects the page-token convention.
///
/// Returns `Ok(None)` when the method does not look paginated, and an error when it
/// looks paginated but the element field is missing or ambiguous.
pub fn paging_field<'a>(
    method: &MethodDescriptor,
    input: &MessageDescriptor,
    output: &'a MessageDescriptor,
) -> AppResult<Option<&'a FieldDescriptor>> {
    let has_size = input
        .field("page_size")
        .is_some_and(|f| f.is_singular(FieldKind::Int32));
    let has_token = input
        .field("page_token")
        .is_some_and(|f| f.is_singular(FieldKind::String));
    if !has_size || !has_token {
        return Ok(None);
    }

    let has_next = output
        .field("next_page_token")
        .is_some_and(|f| f.is_singular(FieldKind::String));
    if !has_next {
        return Ok(None);
    }

    match output.repeated_fields().as_slice() {
        [field] => Ok(Some(*field)),
        [] => Err(AppError::MissingPageElement {
            method: method.name.clone(),
            message: output.name.clone(),
        }),
        many => Err(AppError::AmbiguousPaging {
            method: method.name.clone(),
            message: output.name.clone(),
            count: many.len(),
        }),
    }
}

/// Element type of a paged method's iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageElement {
    /// A message element; `type_name` is fully qualified.
    Message {
        /// Fully qualified message name.
        type_name: String,
        /// Simple message name, used for the iterator name.
        simple_name: String,
    },
    /// A scalar element mapped to a Go type.
    Primitive {
        /// Go type (e.g. `float64`, `[]byte`).
        go_type: &'static str,
        /// Iterator name (e.g. `Float64Iterator`).
        iterator: String,
    },
}

impl PageElement {
    /// Name of the iterator type generated for this element.
    pub fn iterator_name(&self) -> String {
        match self {
            PageElement::Message { simple_name, .. } => format!("{}Iterator", simple_name),
            PageElement::Primitive { iterator, .. } => iterator.clone(),
        }
    }
}

/// Go type and iterator prefix for scalar kinds.
pub fn primitive_go_type(kind: FieldKind) -> Option<(&'static str, &'static str)> {
    let mapped = match kind {
        FieldKind::Double => ("float64", "Float64"),
        FieldKind::Float => ("float32", "Float32"),
        FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => ("int64", "Int64"),
        FieldKind::Uint64 | FieldKind::Fixed64 => ("uint64", "Uint64"),
        FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => ("int32", "Int32"),
        FieldKind::Uint32 | FieldKind::Fixed32 => ("uint32", "Uint32"),
        FieldKind::Bool => ("bool", "Bool"),
        FieldKind::String => ("string", "String"),
        FieldKind::Bytes => ("[]byte", "Bytes"),
        FieldKind::Enum | FieldKind::Message => return None,
    };
    Some(mapped)
}

/// Derives the iterator element for a paged method's repeated field.
pub fn page_element(field: &FieldDescriptor) -> AppResult<PageElement> {
    match field.kind {
        FieldKind::Message => {
            let type_name = field.type_name.clone().ok_or_else(|| {
                AppError::UnresolvedReference(format!(
                    "message field {} has no type name",
                    field.name
                ))
            })?;
            let simple_name = type_name
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string();
            Ok(PageElement::Message {
                type_name,
                simple_name,
            })
        }
        FieldKind::Enum => Err(AppError::Unsupported(format!(
            "paging over enum field {}",
            field.name
        ))),
        kind => {
            let (go_type, prefix) = primitive_go_type(kind).ok_or_else(|| {
                AppError::Unsupported(format!("paging over {:?} field {}", kind, field.name))
            })?;
            Ok(PageElement::Primitive {
                go_type,
                iterator: format!("{}Iterator", prefix),
            })
        }
    }
}
