use gapic_core::descriptor::{FieldDescriptor, FieldKind};
use gapic_core::{generate, GenerationOutput, GenerationRequest};
use pretty_assertions::assert_eq;

fn library_request() -> GenerationRequest {
    let raw = include_str!("fixtures/library.json");
    serde_json::from_str(raw).unwrap()
}

fn library_service(req: &mut GenerationRequest) -> &mut gapic_core::ServiceDescriptor {
    &mut req.files[2].services[0]
}

fn client_source(out: &GenerationOutput) -> &str {
    assert_eq!(out.error, None);
    &out.files[0].content
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in output", needle))
}

#[test]
fn test_library_files() {
    let out = generate(&library_request());
    let names: Vec<&str> = out.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "example.com/library/apiv1/library_service_client.go",
            "example.com/library/apiv1/doc.go",
        ]
    );
    let src = client_source(&out);
    assert!(src.starts_with("// Copyright 2024 Google LLC\n"));
    assert!(src.contains("// Code generated by protoc-gen-go_gapic. DO NOT EDIT.\n"));
    assert!(src.contains("\npackage library\n"));
}

#[test]
fn test_library_scaffolding() {
    let out = generate(&library_request());
    let src = client_source(&out);

    assert!(src.contains("type CallOptions struct {\n"));
    assert!(src.contains("\tCreateBook []gax.CallOption\n"));
    assert!(src.contains("\tWatch      []gax.CallOption\n"));
    assert!(src.contains("\tUpload     []gax.CallOption\n"));
    assert!(src.contains("\t\toption.WithEndpoint(\"library.example.com:443\"),\n"));
    assert!(src.contains("\t\toption.WithScopes(DefaultAuthScopes()...),\n"));
    assert!(src.contains("\t\t\"https://www.googleapis.com/auth/cloud-platform\",\n"));
    assert!(src.contains("\tclient librarypb.LibraryServiceClient\n"));
    assert!(src.contains("\tLROClient *lroauto.OperationsClient\n"));
    assert!(src.contains("func NewClient(ctx context.Context, opts ...option.ClientOption) (*Client, error) {\n"));
    assert!(src.contains("\t\tclient: librarypb.NewLibraryServiceClient(conn),\n"));
    assert!(src.contains("func (c *Client) Connection() *grpc.ClientConn {\n"));
    assert!(src.contains("func (c *Client) Close() error {\n"));
    assert!(src.contains("func (c *Client) setGoogleClientInfo(keyval ...string) {\n"));
}

#[test]
fn test_library_retry_assignment() {
    let out = generate(&library_request());
    let src = client_source(&out);

    assert!(src.contains("\tretry := []gax.CallOption{\n"));
    assert!(src.contains("\t\t\t\tcodes.DeadlineExceeded,\n\t\t\t\tcodes.Unavailable,\n"));
    assert!(src.contains("\t\t\t\tInitial:    100 * time.Millisecond,\n"));
    assert!(src.contains("\t\t\t\tMax:        60000 * time.Millisecond,\n"));
    assert!(src.contains("\t\t\t\tMultiplier: 1.3,\n"));

    assert!(src.contains("\t\tGetBook:    retry,\n"));
    assert!(src.contains("\t\tListBooks:  retry,\n"));
    assert!(src.contains("\t\tCreateBook: []gax.CallOption{},\n"));
    assert!(src.contains("\t\tDeleteBook: []gax.CallOption{},\n"));
    assert!(src.contains("\t\tWatch:      []gax.CallOption{},\n"));
    assert!(src.contains("\t\tChat:       []gax.CallOption{},\n"));
    assert!(src.contains("\t\tUpload:     []gax.CallOption{},\n"));
}

#[test]
fn test_library_method_shapes() {
    let out = generate(&library_request());
    let src = client_source(&out);

    assert!(src.contains(
        "func (c *Client) GetBook(ctx context.Context, req *librarypb.GetBookRequest, opts ...gax.CallOption) (*librarypb.Book, error) {\n"
    ));
    assert!(src.contains(
        "func (c *Client) ListBooks(ctx context.Context, req *librarypb.ListBooksRequest, opts ...gax.CallOption) *BookIterator {\n"
    ));
    assert!(src.contains("\t\treturn resp.GetBooks(), resp.GetNextPageToken(), nil\n"));
    assert!(src.contains(
        "func (c *Client) CreateBook(ctx context.Context, req *librarypb.CreateBookRequest, opts ...gax.CallOption) (*longrunning.Operation, error) {\n"
    ));
    assert!(src.contains("\tvar resp *longrunningpb.Operation\n"));
    assert!(src.contains("\treturn longrunning.InternalNewOperation(c.LROClient, resp), nil\n"));
    assert!(src.contains(
        "func (c *Client) DeleteBook(ctx context.Context, req *librarypb.DeleteBookRequest, opts ...gax.CallOption) error {\n"
    ));
    assert!(src.contains("\t\t_, err = c.client.DeleteBook(ctx, req, settings.GRPC...)\n"));
    assert!(src.contains(
        "func (c *Client) Watch(ctx context.Context, req *librarypb.WatchRequest, opts ...gax.CallOption) (librarypb.LibraryService_WatchClient, error) {\n"
    ));
    assert!(src.contains(
        "func (c *Client) Chat(ctx context.Context, opts ...gax.CallOption) (librarypb.LibraryService_ChatClient, error) {\n"
    ));
    assert!(src.contains("\t\tresp, err = c.client.Chat(ctx, settings.GRPC...)\n"));
    assert!(src.contains(
        "func (c *Client) Upload(ctx context.Context, opts ...gax.CallOption) (librarypb.LibraryService_UploadClient, error) {\n"
    ));
    assert!(src.contains("\tvar resp librarypb.LibraryService_UploadClient\n"));
    assert!(src.contains("\t\tresp, err = c.client.Upload(ctx, settings.GRPC...)\n"));
}

#[test]
fn test_operation_package_alias_does_not_shadow_longrunning() {
    let req = library_request();
    assert_eq!(
        req.files[1].go_package.as_deref(),
        Some("google.golang.org/genproto/googleapis/longrunning;longrunning")
    );
    let out = generate(&req);
    let src = client_source(&out);

    let block_start = position(src, "import (\n");
    let block = &src[block_start..block_start + position(&src[block_start..], "\n)\n")];
    let mut bound: Vec<&str> = block
        .lines()
        .skip(1)
        .filter(|l| !l.is_empty())
        .map(|l| {
            let l = l.trim();
            match l.split_once(' ') {
                Some((alias, _)) => alias,
                None => l.trim_matches('"').rsplit('/').next().unwrap(),
            }
        })
        .collect();
    let total = bound.len();
    bound.sort_unstable();
    bound.dedup();
    assert_eq!(bound.len(), total, "duplicate import names in {}", block);

    assert!(src.contains("\tvar resp *longrunningpb.Operation\n"));
    assert!(src.contains("\treturn longrunning.InternalNewOperation(c.LROClient, resp), nil\n"));
}

#[test]
fn test_library_iterator() {
    let out = generate(&library_request());
    let src = client_source(&out);

    assert!(src.contains("// BookIterator manages a stream of *librarypb.Book.\n"));
    assert!(src.contains("type BookIterator struct {\n\titems    []*librarypb.Book\n"));
    assert!(src.contains("func (it *BookIterator) Next() (*librarypb.Book, error) {\n"));
    assert!(src.contains("func (it *BookIterator) takeBuf() interface{} {\n"));
    assert_eq!(src.matches("type BookIterator struct").count(), 1);
    // Iterators follow every method.
    assert!(position(src, "func (c *Client) Chat(") < position(src, "type BookIterator struct"));
}

#[test]
fn test_library_comments() {
    let out = generate(&library_request());
    let src = client_source(&out);

    assert!(src.contains(
        "// Client is a client for interacting with library.v1.LibraryService.\n//\n// Manages a collection of books.\ntype Client struct {\n"
    ));
    assert!(src.contains("// GetBook gets a book by name.\nfunc (c *Client) GetBook("));
    assert!(src.contains("// ListBooks lists books,\n// paged by token.\nfunc (c *Client) ListBooks("));
}

#[test]
fn test_library_imports_are_grouped_and_sorted() {
    let out = generate(&library_request());
    let src = client_source(&out);

    let block_start = position(src, "import (\n");
    let block = &src[block_start..block_start + position(&src[block_start..], "\n)\n")];
    let expected = [
        "\t\"context\"",
        "\t\"math\"",
        "\t\"time\"",
        "\t\"cloud.google.com/go/longrunning\"",
        "\tlroauto \"cloud.google.com/go/longrunning/autogen\"",
        "\tlibrarypb \"example.com/genproto/library/v1\"",
        "\t\"github.com/golang/protobuf/proto\"",
        "\tgax \"github.com/googleapis/gax-go/v2\"",
        "\t\"google.golang.org/api/iterator\"",
        "\t\"google.golang.org/api/option\"",
        "\t\"google.golang.org/api/transport\"",
        "\tlongrunningpb \"google.golang.org/genproto/googleapis/longrunning\"",
        "\t\"google.golang.org/grpc\"",
        "\t\"google.golang.org/grpc/codes\"",
        "\t\"google.golang.org/grpc/metadata\"",
    ];
    let lines: Vec<&str> = block.lines().skip(1).filter(|l| !l.is_empty()).collect();
    assert_eq!(lines, expected);
    assert!(block.contains("\t\"time\"\n\n\t\"cloud.google.com/go/longrunning\"\n"));
    assert!(!block.contains("empty"));
}

#[test]
fn test_no_retry_block_without_read_bindings() {
    let mut req = library_request();
    for method in &mut library_service(&mut req).methods {
        method.http = None;
    }
    let out = generate(&req);
    let src = client_source(&out);

    assert!(!src.contains("retry := "));
    assert!(!src.contains("\"time\""));
    assert!(!src.contains("\"google.golang.org/grpc/codes\""));
    assert!(src.contains("\t\tGetBook:    []gax.CallOption{},\n"));
}

#[test]
fn test_ambiguous_paging_aborts_run() {
    let mut req = library_request();
    req.files[2].messages[3].fields.push(FieldDescriptor {
        name: "authors".into(),
        number: 3,
        kind: FieldKind::String,
        repeated: true,
        type_name: None,
    });
    let out = generate(&req);

    assert!(out.files.is_empty());
    assert_eq!(
        out.error.as_deref(),
        Some(
            "library/v1/library.proto: ListBooks looks like a paging method, but too many repeated fields in ListBooksResponse (2)"
        )
    );
}

#[test]
fn test_scalar_paging_uses_primitive_iterator() {
    let mut req = library_request();
    let books = &mut req.files[2].messages[3].fields[0];
    books.name = "titles".into();
    books.kind = FieldKind::String;
    books.type_name = None;
    let out = generate(&req);
    let src = client_source(&out);

    assert!(src.contains("opts ...gax.CallOption) *StringIterator {\n"));
    assert!(src.contains("\t\treturn resp.GetTitles(), resp.GetNextPageToken(), nil\n"));
    assert!(src.contains("func (it *StringIterator) Next() (string, error) {\n"));
}

#[test]
fn test_module_prefix_is_stripped_from_output_names() {
    let mut req = library_request();
    req.parameter = Some(
        "go-gapic-package=example.com/library/apiv1;library,module=example.com".into(),
    );
    let out = generate(&req);

    assert_eq!(out.error, None);
    assert_eq!(out.files[0].name, "library/apiv1/library_service_client.go");
    assert!(out.files[0].content.starts_with("// Copyright Google LLC\n"));
}
