#![deny(missing_docs)]

//! # Descriptor Model
//!
//! Owned, already-parsed representation of the schema elements handed to the
//! generator by the IDL compiler. Values are built once by the front end and
//! are never mutated afterwards.
//!
//! Type references (`input_type`, `output_type`, `type_name`) are fully qualified
//! and carry a leading dot, exactly as protoc writes them (e.g. `.library.v1.Book`).
//!
//! Annotations are typed optional accessors: an absent `google.api.http` rule is
//! `None`, never an error.

use serde::{Deserialize, Serialize};

/// Full name of the well-known long-running operation type.
pub const LRO_TYPE: &str = ".google.longrunning.Operation";

/// Full name of the well-known empty message.
pub const EMPTY_TYPE: &str = ".google.protobuf.Empty";

/// Field number of `service` in `FileDescriptorProto`.
pub const FILE_SERVICE_FIELD: i32 = 6;

/// Field number of `method` in `ServiceDescriptorProto`.
pub const SERVICE_METHOD_FIELD: i32 = 2;

/// A named schema unit, i.e. one `.proto` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescriptor {
    /// File name relative to the import root (e.g. `library/v1/library.proto`).
    pub name: String,
    /// Proto package (e.g. `library.v1`).
    pub package: String,
    /// Go package hint (`go_package` option), `path;alias` or bare path.
    pub go_package: Option<String>,
    /// Top-level messages.
    pub messages: Vec<MessageDescriptor>,
    /// Top-level enums.
    pub enums: Vec<EnumDescriptor>,
    /// Services.
    pub services: Vec<ServiceDescriptor>,
    /// Source locations carrying leading comments.
    pub locations: Vec<SourceLocation>,
}

/// A source-location record: a path into the file descriptor and its comment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLocation {
    /// Path of field numbers and indices identifying the element.
    pub path: Vec<i32>,
    /// Leading comment attached to the element, if any.
    pub leading_comments: Option<String>,
}

/// A message type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDescriptor {
    /// Simple name (e.g. `Book`).
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Nested message types.
    pub nested_messages: Vec<MessageDescriptor>,
    /// Nested enum types.
    pub nested_enums: Vec<EnumDescriptor>,
}

impl MessageDescriptor {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns all repeated fields in declaration order.
    pub fn repeated_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.repeated).collect()
    }
}

/// An enum type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDescriptor {
    /// Simple name.
    pub name: String,
    /// Value names in declaration order.
    pub values: Vec<String>,
}

/// A message field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as written in the schema (snake_case).
    pub name: String,
    /// Field number.
    #[serde(default)]
    pub number: i32,
    /// Kind of the field value.
    pub kind: FieldKind,
    /// Whether the field is `repeated`.
    #[serde(default)]
    pub repeated: bool,
    /// Fully qualified type name for message and enum kinds.
    #[serde(default)]
    pub type_name: Option<String>,
}

impl FieldDescriptor {
    /// Whether the field is a singular field of the given kind.
    pub fn is_singular(&self, kind: FieldKind) -> bool {
        !self.repeated && self.kind == kind
    }
}

/// Kind of a field value, mirroring the protobuf scalar and composite types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int64`
    Int64,
    /// `uint64`
    Uint64,
    /// `int32`
    Int32,
    /// `fixed64`
    Fixed64,
    /// `fixed32`
    Fixed32,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `uint32`
    Uint32,
    /// `sfixed32`
    Sfixed32,
    /// `sfixed64`
    Sfixed64,
    /// `sint32`
    Sint32,
    /// `sint64`
    Sint64,
    /// An enum type, see `type_name`.
    Enum,
    /// A message type, see `type_name`.
    Message,
}

/// A service: a named collection of methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDescriptor {
    /// Simple name (e.g. `LibraryService`).
    pub name: String,
    /// Methods in declaration order.
    pub methods: Vec<MethodDescriptor>,
    /// `google.api.default_host`, if annotated.
    pub default_host: Option<String>,
    /// `google.api.oauth_scopes`, already split on commas.
    pub oauth_scopes: Vec<String>,
}

/// A remote procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDescriptor {
    /// Simple name (e.g. `ListBooks`).
    pub name: String,
    /// Fully qualified request type.
    pub input_type: String,
    /// Fully qualified response type.
    pub output_type: String,
    /// Client sends a stream of requests.
    pub client_streaming: bool,
    /// Server sends a stream of responses.
    pub server_streaming: bool,
    /// `google.api.http` binding, if annotated.
    pub http: Option<HttpRule>,
}

/// An HTTP binding: verb plus path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    /// HTTP verb.
    pub verb: HttpVerb,
    /// Path template (e.g. `/v1/{parent=shelves/*}/books`).
    pub path: String,
}

/// HTTP verbs allowed in a `google.api.http` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpVerb {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `patch`
    Patch,
    /// `custom` with its kind.
    Custom(String),
}

impl HttpVerb {
    /// Whether the verb only reads state.
    pub fn is_read(&self) -> bool {
        matches!(self, HttpVerb::Get)
    }
}

/// A closed, borrowed view over every kind of schema node the index stores.
///
/// Adding a node kind is a compile-time decision point for every `match`.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A message type.
    Message(&'a MessageDescriptor),
    /// An enum type.
    Enum(&'a EnumDescriptor),
    /// A service.
    Service(&'a ServiceDescriptor),
    /// A method of a service.
    Method(&'a MethodDescriptor),
    /// A field of a message.
    Field(&'a FieldDescriptor),
}

impl<'a> Node<'a> {
    /// Short label used in diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Node::Message(_) => "message",
            Node::Enum(_) => "enum",
            Node::Service(_) => "service",
            Node::Method(_) => "method",
            Node::Field(_) => "field",
        }
    }
}

/// A complete generation request, independent of the wire envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    /// The full transitive descriptor set.
    pub files: Vec<FileDescriptor>,
    /// Names of the files to generate clients for.
    pub file_to_generate: Vec<String>,
    /// Free-form plugin parameter string.
    pub parameter: Option<String>,
}
