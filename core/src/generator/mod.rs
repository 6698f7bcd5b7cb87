#![deny(missing_docs)]

//! # Client Generation
//!
//! Drives one generation run: builds the descriptor index, walks every service of
//! every requested file, and emits one Go client file per service plus a shared
//! `doc.go` for the package.
//!
//! Each service is an independent output unit with its own emitter and import set.
//! Methods are emitted in declaration order so output is reproducible.

mod client;
mod header;
mod methods;
mod paging;

use crate::classify::{classify, page_element, CallShape, PageElement};
use crate::descriptor::{FileDescriptor, GenerationRequest, MethodDescriptor, ServiceDescriptor};
use crate::emitter::Emitter;
use crate::error::{AppError, AppResult};
use crate::imports::{self, ImportSet, ImportSpec};
use crate::index::{package_prefix, service_full_name, DescriptorIndex};
use crate::naming::{reduce_service_name, stub_field_name, to_snake_case};
use crate::options::GeneratorOptions;
use crate::retry::{synthesize, RetryPolicy};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Version tag of this generator, reported in the `x-goog-api-client` header.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A file ready to be committed to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Output path relative to the protoc output root.
    pub name: String,
    /// Full file content.
    pub content: String,
}

/// The generated client of one service: license/package header plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedService {
    /// Output path relative to the protoc output root.
    pub file_name: String,
    /// License header, package clause and import block.
    pub header: String,
    /// Client scaffolding, methods and iterators.
    pub body: String,
}

impl GeneratedService {
    /// Joins header and body into a committable file.
    pub fn into_file(self) -> GeneratedFile {
        GeneratedFile {
            name: self.file_name,
            content: format!("{}{}", self.header, self.body),
        }
    }
}

/// Result of a complete run.
///
/// When `error` is set no files are committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Generated files.
    pub files: Vec<GeneratedFile>,
    /// First fatal error of the run.
    pub error: Option<String>,
}

impl GenerationOutput {
    fn failed(error: String) -> Self {
        Self {
            files: Vec::new(),
            error: Some(error),
        }
    }
}

/// Runs generation for a request, parsing its parameter string first.
pub fn generate(request: &GenerationRequest) -> GenerationOutput {
    match GeneratorOptions::parse(request.parameter.as_deref()) {
        Ok(options) => generate_with(&request.files, &request.file_to_generate, &options),
        Err(err) => {
            tracing::error!(error = %err, "invalid plugin parameter");
            GenerationOutput::failed(err.to_string())
        }
    }
}

/// Runs generation with already parsed options.
///
/// Every requested file is attempted; the first failure becomes the run's error and
/// suppresses all output.
pub fn generate_with(
    files: &[FileDescriptor],
    to_generate: &[String],
    options: &GeneratorOptions,
) -> GenerationOutput {
    let index = DescriptorIndex::build(files);
    let mut iterators = HashSet::new();
    let mut generated = Vec::new();
    let mut first_error = None;

    for name in to_generate {
        match generate_file(&index, name, options, &mut iterators) {
            Ok(services) => generated.extend(services),
            Err(err) => {
                tracing::error!(file = %name, error = %err, "generation failed");
                first_error.get_or_insert_with(|| format!("{}: {}", name, err));
            }
        }
    }

    if let Some(error) = first_error {
        return GenerationOutput::failed(error);
    }

    let mut out: Vec<GeneratedFile> = generated.into_iter().map(GeneratedService::into_file).collect();
    if !out.is_empty() {
        out.push(header::package_doc(options));
    }
    GenerationOutput {
        files: out,
        error: None,
    }
}

/// Generates every service of one file; nothing is returned unless all succeed.
fn generate_file(
    index: &DescriptorIndex<'_>,
    name: &str,
    options: &GeneratorOptions,
    iterators: &mut HashSet<String>,
) -> AppResult<Vec<GeneratedService>> {
    let file = index.file(name).ok_or_else(|| {
        AppError::UnresolvedReference(format!("file {} is not part of the request", name))
    })?;
    tracing::info!(file = %file.name, services = file.services.len(), "generating file");

    file.services
        .iter()
        .map(|service| ServiceGenerator::new(index, options, file, service).run(iterators))
        .collect()
}

/// A classified method ready for emission.
pub(crate) struct Classified<'a> {
    pub method: &'a MethodDescriptor,
    pub shape: CallShape<'a>,
}

/// Generation state of one output unit (one service).
pub(crate) struct ServiceGenerator<'a> {
    index: &'a DescriptorIndex<'a>,
    options: &'a GeneratorOptions,
    file: &'a FileDescriptor,
    service: &'a ServiceDescriptor,
    full_name: String,
    /// Prefix of the client type names (`` for `Client`, `Library` for `LibraryClient`).
    reduced: String,
    retry: IndexMap<String, RetryPolicy>,
    em: Emitter,
    imports: ImportSet,
}

impl<'a> ServiceGenerator<'a> {
    pub(crate) fn new(
        index: &'a DescriptorIndex<'a>,
        options: &'a GeneratorOptions,
        file: &'a FileDescriptor,
        service: &'a ServiceDescriptor,
    ) -> Self {
        Self {
            index,
            options,
            file,
            service,
            full_name: service_full_name(file, service),
            reduced: reduce_service_name(&service.name, &options.pkg_name),
            retry: synthesize(service),
            em: Emitter::new(),
            imports: ImportSet::new(),
        }
    }

    /// Emits the whole client and returns header and body.
    pub(crate) fn run(mut self, iterators: &mut HashSet<String>) -> AppResult<GeneratedService> {
        let classified = self.classify_methods()?;

        self.client_scaffolding(&classified)?;

        let mut elements: Vec<PageElement> = Vec::new();
        for item in &classified {
            tracing::debug!(
                service = %self.full_name,
                method = %item.method.name,
                shape = %item.shape,
                retry = self.retry.contains_key(&item.method.name),
                "classified method"
            );
            match item.shape {
                CallShape::Unary => self.unary_call(item.method)?,
                CallShape::ServerStreaming
                | CallShape::ClientStreaming
                | CallShape::BidiStreaming => self.streaming_call(item.method, item.shape)?,
                CallShape::LongRunning => self.lro_call(item.method)?,
                CallShape::PagedUnary(field) => {
                    let element = page_element(field)?;
                    self.paging_call(item.method, field, &element)?;
                    elements.push(element);
                }
            }
        }

        for element in &elements {
            if iterators.insert(element.iterator_name()) {
                self.paging_iterator(element)?;
            }
        }

        let header = header::file_header(self.options, &self.imports, None);
        Ok(GeneratedService {
            file_name: self
                .options
                .output_file(&format!("{}_client.go", to_snake_case(&self.service.name))),
            header,
            body: self.em.into_string(),
        })
    }

    fn classify_methods(&self) -> AppResult<Vec<Classified<'a>>> {
        let service = self.service;
        service
            .methods
            .iter()
            .map(|method| {
                let input = self.index.message(&method.input_type)?;
                let output = self.index.message(&method.output_type)?;
                let shape = classify(method, input, output)?;
                Ok(Classified { method, shape })
            })
            .collect()
    }

    fn import(&mut self, spec: ImportSpec) {
        self.imports.insert(spec);
    }

    /// Go expression naming a message or enum type (`alias.Name`), importing its package.
    fn go_type(&mut self, full_name: &str) -> AppResult<String> {
        let file = self.index.owning_file(full_name)?;
        let spec = proto_import(file)?;
        let prefix = package_prefix(&file.package);
        let relative = full_name
            .strip_prefix(prefix.as_str())
            .map(|rest| rest.trim_start_matches('.'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| {
                AppError::UnresolvedReference(format!(
                    "{} is not declared in package {}",
                    full_name, file.package
                ))
            })?;
        let expr = format!("{}.{}", spec.name, relative.replace('.', "_"));
        self.import(spec);
        Ok(expr)
    }

    /// Alias of the package holding the service's gRPC stubs.
    fn stub_package(&mut self) -> AppResult<String> {
        let spec = proto_import(self.file)?;
        let alias = spec.name.clone();
        self.import(spec);
        Ok(alias)
    }

    fn client_type(&self) -> String {
        format!("{}Client", self.reduced)
    }

    fn call_options_type(&self) -> String {
        format!("{}CallOptions", self.reduced)
    }

    fn stub_field(&self) -> String {
        stub_field_name(&self.reduced)
    }

    /// Emits a Go doc comment, starting with `ident`, for the given element.
    fn doc_comment(&mut self, full_name: &str, ident: &str) {
        if let Some(text) = self.index.comment(full_name) {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            let doc = format!("{} {}", ident, crate::naming::lower_first(text));
            self.em.comment(&doc);
        }
    }
}

/// Import of the Go package generated for `file`.
///
/// An alias that would bind the same name as one of the client's own imports
/// gets a `pb` suffix, so `google.golang.org/genproto/googleapis/longrunning`
/// becomes `longrunningpb` next to `cloud.google.com/go/longrunning`.
fn proto_import(file: &FileDescriptor) -> AppResult<ImportSpec> {
    let mut spec = imports::resolve(file)?;
    let clashes = deps::all()
        .iter()
        .any(|dep| dep.path != spec.path && dep.bound_name() == spec.bound_name());
    if clashes {
        spec.name = format!("{}pb", spec.bound_name());
    }
    Ok(spec)
}

/// Imports referenced by generated clients.
pub(crate) mod deps {
    use crate::imports::ImportSpec;

    /// Every import a client may reference besides generated type packages.
    pub fn all() -> Vec<ImportSpec> {
        vec![
            context(),
            math(),
            time(),
            gax(),
            proto(),
            iterator(),
            option(),
            transport(),
            grpc(),
            codes(),
            metadata(),
            longrunning(),
            lroauto(),
        ]
    }

    pub fn context() -> ImportSpec {
        ImportSpec::path("context")
    }
    pub fn math() -> ImportSpec {
        ImportSpec::path("math")
    }
    pub fn time() -> ImportSpec {
        ImportSpec::path("time")
    }
    pub fn gax() -> ImportSpec {
        ImportSpec::named("gax", "github.com/googleapis/gax-go/v2")
    }
    pub fn proto() -> ImportSpec {
        ImportSpec::path("github.com/golang/protobuf/proto")
    }
    pub fn iterator() -> ImportSpec {
        ImportSpec::path("google.golang.org/api/iterator")
    }
    pub fn option() -> ImportSpec {
        ImportSpec::path("google.golang.org/api/option")
    }
    pub fn transport() -> ImportSpec {
        ImportSpec::path("google.golang.org/api/transport")
    }
    pub fn grpc() -> ImportSpec {
        ImportSpec::path("google.golang.org/grpc")
    }
    pub fn codes() -> ImportSpec {
        ImportSpec::path("google.golang.org/grpc/codes")
    }
    pub fn metadata() -> ImportSpec {
        ImportSpec::path("google.golang.org/grpc/metadata")
    }
    pub fn longrunning() -> ImportSpec {
        ImportSpec::path("cloud.google.com/go/longrunning")
    }
    pub fn lroauto() -> ImportSpec {
        ImportSpec::named("lroauto", "cloud.google.com/go/longrunning/autogen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};

    fn request(default_host: Option<&str>) -> GenerationRequest {
        let msg = |name: &str| MessageDescriptor {
            name: name.into(),
            ..Default::default()
        };
        GenerationRequest {
            files: vec![FileDescriptor {
                name: "echo.proto".into(),
                package: "echo".into(),
                go_package: Some("example.com/echo/echopb;echopb".into()),
                messages: vec![
                    msg("EchoRequest"),
                    MessageDescriptor {
                        name: "EchoResponse".into(),
                        fields: vec![FieldDescriptor {
                            name: "content".into(),
                            number: 1,
                            kind: FieldKind::String,
                            repeated: false,
                            type_name: None,
                        }],
                        ..Default::default()
                    },
                ],
                services: vec![ServiceDescriptor {
                    name: "Echo".into(),
                    default_host: default_host.map(String::from),
                    methods: vec![MethodDescriptor {
                        name: "Echo".into(),
                        input_type: ".echo.EchoRequest".into(),
                        output_type: ".echo.EchoResponse".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            file_to_generate: vec!["echo.proto".into()],
            parameter: Some("go-gapic-package=example.com/echo/apiv1;echo".into()),
        }
    }

    #[test]
    fn test_generates_client_and_doc() {
        let out = generate(&request(Some("echo.example.com:443")));
        assert_eq!(out.error, None);
        let names: Vec<&str> = out.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["example.com/echo/apiv1/echo_client.go", "example.com/echo/apiv1/doc.go"]
        );
        let client = &out.files[0].content;
        assert!(client.contains("package echo\n"));
        assert!(client.contains("func NewClient(ctx context.Context"));
        assert!(client.contains("echopb \"example.com/echo/echopb\""));
    }

    #[test]
    fn test_missing_default_host_fails_without_output() {
        let out = generate(&request(None));
        assert!(out.files.is_empty());
        let error = out.error.unwrap();
        assert!(error.starts_with("echo.proto: missing annotation"), "{}", error);
    }

    #[test]
    fn test_bad_parameter_fails_run() {
        let mut req = request(Some("echo.example.com:443"));
        req.parameter = None;
        let out = generate(&req);
        assert!(out.files.is_empty());
        assert!(out.error.unwrap().contains("go-gapic-package"));
    }

    #[test]
    fn test_unknown_file_to_generate() {
        let mut req = request(Some("echo.example.com:443"));
        req.file_to_generate.push("missing.proto".into());
        let out = generate(&req);
        assert!(out.files.is_empty());
        assert!(out.error.unwrap().starts_with("missing.proto: unresolved reference"));
    }

    #[test]
    fn test_nested_type_names_use_underscores() {
        let mut req = request(Some("echo.example.com:443"));
        req.files[0].messages[0].nested_messages.push(MessageDescriptor {
            name: "Inner".into(),
            ..Default::default()
        });
        let options = GeneratorOptions::parse(req.parameter.as_deref()).unwrap();
        let index = DescriptorIndex::build(&req.files);
        let file = &req.files[0];
        let mut gen = ServiceGenerator::new(&index, &options, file, &file.services[0]);
        assert_eq!(gen.go_type(".echo.EchoRequest.Inner").unwrap(), "echopb.EchoRequest_Inner");
        assert!(gen.go_type(".echo.Nope").is_err());
        assert_eq!(gen.imports.len(), 1);
    }

    #[test]
    fn test_type_package_clashing_with_client_import_is_renamed() {
        let mut req = request(Some("echo.example.com:443"));
        req.files[0].go_package = Some("example.com/echo/metadata".into());
        let options = GeneratorOptions::parse(req.parameter.as_deref()).unwrap();
        let index = DescriptorIndex::build(&req.files);
        let file = &req.files[0];
        let mut gen = ServiceGenerator::new(&index, &options, file, &file.services[0]);
        assert_eq!(gen.go_type(".echo.EchoRequest").unwrap(), "metadatapb.EchoRequest");
        assert_eq!(gen.stub_package().unwrap(), "metadatapb");
        assert_eq!(
            gen.imports.iter().collect::<Vec<_>>(),
            vec![&ImportSpec::named("metadatapb", "example.com/echo/metadata")]
        );
    }
}
