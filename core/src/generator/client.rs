//! Per-service scaffolding: call options, default options, client struct,
//! constructor, connection accessor, close and the metadata header.

use super::{deps, Classified, ServiceGenerator};
use crate::classify::CallShape;
use crate::emit;
use crate::error::{AppError, AppResult};
use crate::retry::RetryPolicy;

impl ServiceGenerator<'_> {
    pub(super) fn client_scaffolding(&mut self, methods: &[Classified<'_>]) -> AppResult<()> {
        let has_lro = methods
            .iter()
            .any(|m| matches!(m.shape, CallShape::LongRunning));

        self.call_options_struct(methods);
        self.default_client_options()?;
        self.default_call_options(methods);
        self.client_struct(has_lro)?;
        self.constructor(has_lro)?;
        self.connection_and_close();
        self.client_info();
        Ok(())
    }

    fn call_options_struct(&mut self, methods: &[Classified<'_>]) {
        self.import(deps::gax());
        let opts = self.call_options_type();
        let client = self.client_type();

        emit!(self.em, "// {} contains the retry settings for each method of {}.", opts, client);
        emit!(self.em, "type {} struct {{", opts);
        let width = methods.iter().map(|m| m.method.name.len()).max().unwrap_or(0);
        for m in methods {
            emit!(self.em, "{:<width$} []gax.CallOption", m.method.name, width = width);
        }
        self.em.line("}");
        self.em.blank();
    }

    fn default_client_options(&mut self) -> AppResult<()> {
        let host = self.service.default_host.clone().ok_or_else(|| {
            AppError::MissingAnnotation(format!(
                "service {} has no google.api.default_host",
                self.full_name
            ))
        })?;
        let port = if host.contains(':') { "" } else { ":443" };
        let has_scopes = !self.service.oauth_scopes.is_empty();
        self.import(deps::option());

        emit!(self.em, "func default{}ClientOptions() []option.ClientOption {{", self.reduced);
        self.em.line("return []option.ClientOption{");
        emit!(self.em, "option.WithEndpoint({:?}),", format!("{}{}", host, port));
        if has_scopes {
            emit!(self.em, "option.WithScopes(Default{}AuthScopes()...),", self.reduced);
        }
        self.em.line("}");
        self.em.line("}");
        self.em.blank();

        if has_scopes {
            emit!(
                self.em,
                "// Default{}AuthScopes reports the default set of authentication scopes to use with this package.",
                self.reduced
            );
            emit!(self.em, "func Default{}AuthScopes() []string {{", self.reduced);
            self.em.line("return []string{");
            let service = self.service;
            for scope in &service.oauth_scopes {
                emit!(self.em, "{:?},", scope);
            }
            self.em.line("}");
            self.em.line("}");
            self.em.blank();
        }
        Ok(())
    }

    /// Retryable methods share a single `retry` block; the others get empty options.
    fn default_call_options(&mut self, methods: &[Classified<'_>]) {
        let opts = self.call_options_type();
        emit!(self.em, "func default{}() *{} {{", opts, opts);

        if !self.retry.is_empty() {
            let policy = self.retry.values().next().cloned().unwrap_or_default();
            self.retry_block(&policy);
        }

        emit!(self.em, "return &{}{{", opts);
        let width = methods.iter().map(|m| m.method.name.len() + 1).max().unwrap_or(0);
        for m in methods {
            let value = if self.retry.contains_key(&m.method.name) {
                "retry"
            } else {
                "[]gax.CallOption{}"
            };
            let key = format!("{}:", m.method.name);
            emit!(self.em, "{:<width$} {},", key, value, width = width);
        }
        self.em.line("}");
        self.em.line("}");
        self.em.blank();
    }

    fn retry_block(&mut self, policy: &RetryPolicy) {
        self.import(deps::codes());
        self.import(deps::time());

        self.em.line("retry := []gax.CallOption{");
        self.em.line("gax.WithRetry(func() gax.Retryer {");
        self.em.line("return gax.OnCodes([]codes.Code{");
        for code in &policy.codes {
            emit!(self.em, "codes.{},", code.go_name());
        }
        self.em.line("}, gax.Backoff{");
        emit!(self.em, "Initial:    {} * time.Millisecond,", policy.initial.as_millis());
        emit!(self.em, "Max:        {} * time.Millisecond,", policy.max.as_millis());
        emit!(self.em, "Multiplier: {},", policy.multiplier);
        self.em.line("})");
        self.em.line("}),");
        self.em.line("}");
    }

    fn client_struct(&mut self, has_lro: bool) -> AppResult<()> {
        self.import(deps::grpc());
        self.import(deps::metadata());
        let pb = self.stub_package()?;
        let client = self.client_type();
        let service_label = self.full_name.trim_start_matches('.').to_string();

        emit!(self.em, "// {} is a client for interacting with {}.", client, service_label);
        if let Some(text) = self.index.comment(&self.full_name) {
            let text = text.trim().to_string();
            if !text.is_empty() {
                self.em.line("//");
                self.em.comment(&text);
            }
        }
        emit!(self.em, "type {} struct {{", client);
        self.em.line("// The connection to the service.");
        self.em.line("conn *grpc.ClientConn");
        self.em.blank();
        self.em.line("// The gRPC API client.");
        emit!(self.em, "{} {}.{}Client", self.stub_field(), pb, self.service.name);
        self.em.blank();
        if has_lro {
            self.import(deps::lroauto());
            self.em.line("// LROClient is used internally to handle long-running operations.");
            self.em.line("// It is exposed so that its CallOptions can be modified if required.");
            self.em.line("// Users should not Close this client.");
            self.em.line("LROClient *lroauto.OperationsClient");
            self.em.blank();
        }
        self.em.line("// The call options for this service.");
        emit!(self.em, "CallOptions *{}", self.call_options_type());
        self.em.blank();
        self.em.line("// The x-goog-* metadata to be sent with each request.");
        self.em.line("xGoogMetadata metadata.MD");
        self.em.line("}");
        self.em.blank();
        Ok(())
    }

    fn constructor(&mut self, has_lro: bool) -> AppResult<()> {
        self.import(deps::context());
        self.import(deps::transport());
        let pb = self.stub_package()?;
        let client = self.client_type();
        let stub = self.stub_field();
        let width = stub.len().max("CallOptions".len()) + 1;

        emit!(
            self.em,
            "// New{} creates a new {} client.",
            client,
            self.service.name
        );
        emit!(
            self.em,
            "func New{}(ctx context.Context, opts ...option.ClientOption) (*{}, error) {{",
            client,
            client
        );
        emit!(
            self.em,
            "conn, err := transport.DialGRPC(ctx, append(default{}ClientOptions(), opts...)...)",
            self.reduced
        );
        self.em.line("if err != nil {");
        self.em.line("return nil, err");
        self.em.line("}");
        emit!(self.em, "c := &{}{{", client);
        emit!(self.em, "{:<width$} conn,", "conn:", width = width);
        emit!(
            self.em,
            "{:<width$} default{}(),",
            "CallOptions:",
            self.call_options_type(),
            width = width
        );
        self.em.blank();
        emit!(
            self.em,
            "{}: {}.New{}Client(conn),",
            stub,
            pb,
            self.service.name
        );
        self.em.line("}");
        self.em.line("c.setGoogleClientInfo()");
        if has_lro {
            self.em.blank();
            self.em.line("c.LROClient, err = lroauto.NewOperationsClient(ctx, option.WithGRPCConn(conn))");
            self.em.line("if err != nil {");
            self.em.line("// The connection is reused, so no dial happens and conn is not closed here.");
            self.em.line("return nil, err");
            self.em.line("}");
        }
        self.em.line("return c, nil");
        self.em.line("}");
        self.em.blank();
        Ok(())
    }

    fn connection_and_close(&mut self) {
        let client = self.client_type();

        self.em.line("// Connection returns the client's connection to the API service.");
        emit!(self.em, "func (c *{}) Connection() *grpc.ClientConn {{", client);
        self.em.line("return c.conn");
        self.em.line("}");
        self.em.blank();

        self.em.line("// Close closes the connection to the API service. The user should invoke this when");
        self.em.line("// the client is no longer required.");
        emit!(self.em, "func (c *{}) Close() error {{", client);
        self.em.line("return c.conn.Close()");
        self.em.line("}");
        self.em.blank();
    }

    /// The header value joins the client identifier, this generator's version and
    /// the gax and gRPC versions.
    fn client_info(&mut self) {
        let client = self.client_type();

        self.em.line("// setGoogleClientInfo sets the name and version of the application in");
        self.em.line("// the `x-goog-api-client` header passed on each request. Intended for");
        self.em.line("// use by Google-written clients.");
        emit!(self.em, "func (c *{}) setGoogleClientInfo(keyval ...string) {{", client);
        self.em.line("kv := append([]string{\"gl-go\", versionGo()}, keyval...)");
        self.em.line("kv = append(kv, \"gapic\", versionClient, \"gax\", gax.Version, \"grpc\", grpc.Version)");
        self.em.line("c.xGoogMetadata = metadata.Pairs(\"x-goog-api-client\", gax.XGoogHeader(kv...))");
        self.em.line("}");
        self.em.blank();
    }
}
