#![deny(missing_docs)]

//! # Request Decoding
//!
//! Turns a protoc `CodeGeneratorRequest` into the generator's descriptor model.
//!
//! `prost-types` drops unknown option fields, so the raw file bytes are re-decoded
//! into a `prost_reflect::DescriptorPool`, which keeps the `google.api.*` option
//! extensions readable.

use crate::error::CliResult;
use gapic_core::descriptor::{
    EnumDescriptor, FieldDescriptor, FieldKind, FileDescriptor, GenerationRequest, HttpRule,
    HttpVerb, MessageDescriptor, MethodDescriptor, ServiceDescriptor, SourceLocation,
};
use prost::Message;
use prost_reflect::{self as reflect, DescriptorPool, DynamicMessage, ExtensionDescriptor, Kind, Value};

/// `CodeGeneratorRequest` with the files kept as raw bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: ::prost::alloc::vec::Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Option extensions read by the generator. Absent when the request does not
/// carry the `google/api` files that declare them.
struct Extensions {
    http: Option<ExtensionDescriptor>,
    default_host: Option<ExtensionDescriptor>,
    oauth_scopes: Option<ExtensionDescriptor>,
}

impl Extensions {
    fn lookup(pool: &DescriptorPool) -> Self {
        let ext = Self {
            http: pool.get_extension_by_name("google.api.http"),
            default_host: pool.get_extension_by_name("google.api.default_host"),
            oauth_scopes: pool.get_extension_by_name("google.api.oauth_scopes"),
        };
        tracing::debug!(
            http = ext.http.is_some(),
            default_host = ext.default_host.is_some(),
            oauth_scopes = ext.oauth_scopes.is_some(),
            "resolved option extensions"
        );
        ext
    }
}

/// Decodes a serialized `CodeGeneratorRequest`.
pub fn decode(bytes: &[u8]) -> CliResult<GenerationRequest> {
    let raw = RawCodeGeneratorRequest::decode(bytes)?;
    let pool = build_pool(&raw)?;
    let ext = Extensions::lookup(&pool);

    let files = pool.files().map(|f| convert_file(&f, &ext)).collect();
    Ok(GenerationRequest {
        files,
        file_to_generate: raw.file_to_generate,
        parameter: raw.parameter,
    })
}

fn build_pool(raw: &RawCodeGeneratorRequest) -> CliResult<DescriptorPool> {
    let set = RawFileDescriptorSet {
        file: raw.proto_file.clone(),
    };
    let mut bytes = Vec::new();
    set.encode(&mut bytes)?;
    Ok(DescriptorPool::decode(bytes.as_slice())?)
}

fn convert_file(file: &reflect::FileDescriptor, ext: &Extensions) -> FileDescriptor {
    let proto = file.file_descriptor_proto();
    let locations = proto
        .source_code_info
        .iter()
        .flat_map(|info| info.location.iter())
        .filter(|loc| loc.leading_comments.is_some())
        .map(|loc| SourceLocation {
            path: loc.path.clone(),
            leading_comments: loc.leading_comments.clone(),
        })
        .collect();

    FileDescriptor {
        name: file.name().to_string(),
        package: file.package_name().to_string(),
        go_package: proto.options.as_ref().and_then(|o| o.go_package.clone()),
        messages: file.messages().map(|m| convert_message(&m)).collect(),
        enums: file.enums().map(|e| convert_enum(&e)).collect(),
        services: file.services().map(|s| convert_service(&s, ext)).collect(),
        locations,
    }
}

fn convert_message(message: &reflect::MessageDescriptor) -> MessageDescriptor {
    MessageDescriptor {
        name: message.name().to_string(),
        fields: message.fields().map(|f| convert_field(&f)).collect(),
        nested_messages: message.child_messages().map(|m| convert_message(&m)).collect(),
        nested_enums: message.child_enums().map(|e| convert_enum(&e)).collect(),
    }
}

fn convert_enum(en: &reflect::EnumDescriptor) -> EnumDescriptor {
    EnumDescriptor {
        name: en.name().to_string(),
        values: en.values().map(|v| v.name().to_string()).collect(),
    }
}

fn convert_field(field: &reflect::FieldDescriptor) -> FieldDescriptor {
    let (kind, type_name) = match field.kind() {
        Kind::Double => (FieldKind::Double, None),
        Kind::Float => (FieldKind::Float, None),
        Kind::Int64 => (FieldKind::Int64, None),
        Kind::Uint64 => (FieldKind::Uint64, None),
        Kind::Int32 => (FieldKind::Int32, None),
        Kind::Fixed64 => (FieldKind::Fixed64, None),
        Kind::Fixed32 => (FieldKind::Fixed32, None),
        Kind::Bool => (FieldKind::Bool, None),
        Kind::String => (FieldKind::String, None),
        Kind::Bytes => (FieldKind::Bytes, None),
        Kind::Uint32 => (FieldKind::Uint32, None),
        Kind::Sfixed32 => (FieldKind::Sfixed32, None),
        Kind::Sfixed64 => (FieldKind::Sfixed64, None),
        Kind::Sint32 => (FieldKind::Sint32, None),
        Kind::Sint64 => (FieldKind::Sint64, None),
        Kind::Enum(e) => (FieldKind::Enum, Some(format!(".{}", e.full_name()))),
        Kind::Message(m) => (FieldKind::Message, Some(format!(".{}", m.full_name()))),
    };
    FieldDescriptor {
        name: field.name().to_string(),
        number: field.number() as i32,
        kind,
        repeated: field.is_list() || field.is_map(),
        type_name,
    }
}

fn convert_service(service: &reflect::ServiceDescriptor, ext: &Extensions) -> ServiceDescriptor {
    let options = service.options();
    let default_host = ext
        .default_host
        .as_ref()
        .and_then(|e| string_extension(&options, e));
    let oauth_scopes = ext
        .oauth_scopes
        .as_ref()
        .and_then(|e| string_extension(&options, e))
        .map(|scopes| {
            scopes
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ServiceDescriptor {
        name: service.name().to_string(),
        methods: service
            .methods()
            .map(|m| convert_method(&m, ext))
            .collect(),
        default_host,
        oauth_scopes,
    }
}

fn convert_method(method: &reflect::MethodDescriptor, ext: &Extensions) -> MethodDescriptor {
    let http = ext
        .http
        .as_ref()
        .and_then(|e| http_rule(method, &method.options(), e));
    MethodDescriptor {
        name: method.name().to_string(),
        input_type: format!(".{}", method.input().full_name()),
        output_type: format!(".{}", method.output().full_name()),
        client_streaming: method.is_client_streaming(),
        server_streaming: method.is_server_streaming(),
        http,
    }
}

fn string_extension(options: &DynamicMessage, ext: &ExtensionDescriptor) -> Option<String> {
    if !options.has_extension(ext) {
        return None;
    }
    options.get_extension(ext).as_str().map(String::from)
}

/// Reads the verb and path of a `google.api.http` rule.
fn http_rule(
    method: &reflect::MethodDescriptor,
    options: &DynamicMessage,
    ext: &ExtensionDescriptor,
) -> Option<HttpRule> {
    if !options.has_extension(ext) {
        return None;
    }
    let value = options.get_extension(ext);
    let rule = value.as_message()?;

    let verbs = [
        ("get", HttpVerb::Get),
        ("put", HttpVerb::Put),
        ("post", HttpVerb::Post),
        ("delete", HttpVerb::Delete),
        ("patch", HttpVerb::Patch),
    ];
    for (field, verb) in verbs {
        if rule.has_field_by_name(field) {
            if let Some(path) = string_field(rule, field) {
                return Some(HttpRule { verb, path });
            }
        }
    }

    if rule.has_field_by_name("custom") {
        if let Some(Value::Message(custom)) = rule.get_field_by_name("custom").as_deref() {
            let kind = string_field(custom, "kind").unwrap_or_default();
            let path = string_field(custom, "path").unwrap_or_default();
            return Some(HttpRule {
                verb: HttpVerb::Custom(kind),
                path,
            });
        }
    }

    tracing::warn!(method = %method.full_name(), "google.api.http rule has no pattern, ignoring");
    None
}

fn string_field(message: &DynamicMessage, name: &str) -> Option<String> {
    message
        .get_field_by_name(name)
        .and_then(|v| v.as_str().map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prost_types::compiler::CodeGeneratorRequest;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::source_code_info::Location;
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileOptions,
        MethodDescriptorProto, ServiceDescriptorProto, SourceCodeInfo,
    };

    fn field(name: &str, number: i32, ty: Type, type_name: Option<&str>, repeated: bool) -> FieldDescriptorProto {
        let label = if repeated { Label::Repeated } else { Label::Optional };
        FieldDescriptorProto {
            name: Some(name.into()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(ty as i32),
            type_name: type_name.map(String::from),
            ..Default::default()
        }
    }

    fn method(name: &str, input: &str, output: &str, server_streaming: bool) -> MethodDescriptorProto {
        MethodDescriptorProto {
            name: Some(name.into()),
            input_type: Some(input.into()),
            output_type: Some(output.into()),
            server_streaming: Some(server_streaming),
            ..Default::default()
        }
    }

    fn echo_request() -> Vec<u8> {
        let file = FileDescriptorProto {
            name: Some("echo.proto".into()),
            package: Some("echo".into()),
            syntax: Some("proto3".into()),
            options: Some(FileOptions {
                go_package: Some("example.com/echo/echopb;echopb".into()),
                ..Default::default()
            }),
            message_type: vec![
                DescriptorProto {
                    name: Some("EchoRequest".into()),
                    field: vec![
                        field("content", 1, Type::String, None, false),
                        field("tags", 2, Type::String, None, true),
                    ],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("EchoResponse".into()),
                    field: vec![field("request", 1, Type::Message, Some(".echo.EchoRequest"), false)],
                    ..Default::default()
                },
            ],
            service: vec![ServiceDescriptorProto {
                name: Some("Echo".into()),
                method: vec![
                    method("Echo", ".echo.EchoRequest", ".echo.EchoResponse", false),
                    method("Expand", ".echo.EchoRequest", ".echo.EchoResponse", true),
                ],
                ..Default::default()
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![
                    Location {
                        path: vec![6, 0, 2, 0],
                        span: vec![10, 2, 40],
                        leading_comments: Some(" Echoes the request.\n".into()),
                        ..Default::default()
                    },
                    Location {
                        path: vec![4, 0],
                        span: vec![3, 0, 6, 1],
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        };
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["echo.proto".into()],
            parameter: Some("go-gapic-package=example.com/echo/apiv1;echo".into()),
            proto_file: vec![file],
            ..Default::default()
        };
        request.encode_to_vec()
    }

    #[test]
    fn test_decode_converts_descriptors() {
        let request = decode(&echo_request()).unwrap();
        assert_eq!(request.file_to_generate, vec!["echo.proto".to_string()]);
        assert_eq!(
            request.parameter.as_deref(),
            Some("go-gapic-package=example.com/echo/apiv1;echo")
        );

        let file = &request.files[0];
        assert_eq!(file.package, "echo");
        assert_eq!(file.go_package.as_deref(), Some("example.com/echo/echopb;echopb"));

        let tags = &file.messages[0].fields[1];
        assert_eq!(tags.kind, FieldKind::String);
        assert!(tags.repeated);
        let nested = &file.messages[1].fields[0];
        assert_eq!(nested.kind, FieldKind::Message);
        assert_eq!(nested.type_name.as_deref(), Some(".echo.EchoRequest"));
    }

    #[test]
    fn test_decode_services_without_annotations() {
        let request = decode(&echo_request()).unwrap();
        let service = &request.files[0].services[0];
        assert_eq!(service.default_host, None);
        assert!(service.oauth_scopes.is_empty());
        assert_eq!(service.methods[0].input_type, ".echo.EchoRequest");
        assert_eq!(service.methods[0].http, None);
        assert!(!service.methods[0].server_streaming);
        assert!(service.methods[1].server_streaming);
    }

    #[test]
    fn test_decode_keeps_only_commented_locations() {
        let request = decode(&echo_request()).unwrap();
        let locations = &request.files[0].locations;
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].path, vec![6, 0, 2, 0]);
        assert_eq!(locations[0].leading_comments.as_deref(), Some(" Echoes the request.\n"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(&[0xff, 0xff]).is_err());
    }
}
