//! Unary, long-running and streaming calls.
//!
//! Every call inserts the outgoing metadata, copies the method's call options and
//! runs the transport call inside `gax.Invoke`, which applies the retry settings.

use super::{deps, ServiceGenerator};
use crate::classify::CallShape;
use crate::descriptor::{MethodDescriptor, EMPTY_TYPE, LRO_TYPE};
use crate::emit;
use crate::error::{AppError, AppResult};

impl ServiceGenerator<'_> {
    /// Doc comment taken from the method's leading comment.
    fn method_doc(&mut self, method: &MethodDescriptor) {
        let full_name = format!("{}.{}", self.full_name, method.name);
        self.doc_comment(&full_name, &method.name);
    }

    fn call_setup(&mut self, method: &MethodDescriptor) {
        let slot = format!("c.CallOptions.{}", method.name);
        self.em.line("ctx = insertMetadata(ctx, c.xGoogMetadata)");
        emit!(self.em, "opts = append({0}[0:len({0}):len({0})], opts...)", slot);
    }

    /// `err := gax.Invoke(...)` wrapping one transport call.
    fn invoke(&mut self, assign: &str, method: &MethodDescriptor, with_request: bool) {
        let args = if with_request { "ctx, req" } else { "ctx" };
        self.em.line("err := gax.Invoke(ctx, func(ctx context.Context, settings gax.CallSettings) error {");
        self.em.line("var err error");
        emit!(
            self.em,
            "{}, err = c.{}.{}({}, settings.GRPC...)",
            assign,
            self.stub_field(),
            method.name,
            args
        );
        self.em.line("return err");
        self.em.line("}, opts...)");
    }

    pub(super) fn unary_call(&mut self, method: &MethodDescriptor) -> AppResult<()> {
        self.import(deps::context());
        self.import(deps::gax());
        let req = self.go_type(&method.input_type)?;
        let client = self.client_type();

        self.method_doc(method);
        if method.output_type == EMPTY_TYPE {
            emit!(
                self.em,
                "func (c *{}) {}(ctx context.Context, req *{}, opts ...gax.CallOption) error {{",
                client,
                method.name,
                req
            );
            self.call_setup(method);
            self.invoke("_", method, true);
            self.em.line("return err");
            self.em.line("}");
            self.em.blank();
            return Ok(());
        }

        let resp = self.go_type(&method.output_type)?;
        emit!(
            self.em,
            "func (c *{}) {}(ctx context.Context, req *{}, opts ...gax.CallOption) (*{}, error) {{",
            client,
            method.name,
            req,
            resp
        );
        self.call_setup(method);
        emit!(self.em, "var resp *{}", resp);
        self.invoke("resp", method, true);
        self.return_resp();
        Ok(())
    }

    /// The call returns the operation handle; completion is left to the caller.
    pub(super) fn lro_call(&mut self, method: &MethodDescriptor) -> AppResult<()> {
        self.import(deps::context());
        self.import(deps::gax());
        self.import(deps::longrunning());
        let req = self.go_type(&method.input_type)?;
        let op = self.go_type(LRO_TYPE)?;
        let client = self.client_type();

        self.method_doc(method);
        emit!(
            self.em,
            "func (c *{}) {}(ctx context.Context, req *{}, opts ...gax.CallOption) (*longrunning.Operation, error) {{",
            client,
            method.name,
            req
        );
        self.call_setup(method);
        emit!(self.em, "var resp *{}", op);
        self.invoke("resp", method, true);
        self.em.line("if err != nil {");
        self.em.line("return nil, err");
        self.em.line("}");
        self.em.line("return longrunning.InternalNewOperation(c.LROClient, resp), nil");
        self.em.line("}");
        self.em.blank();
        Ok(())
    }

    /// Opens the stream and hands it to the caller without buffering.
    pub(super) fn streaming_call(
        &mut self,
        method: &MethodDescriptor,
        shape: CallShape<'_>,
    ) -> AppResult<()> {
        let with_request = match shape {
            CallShape::ServerStreaming => true,
            CallShape::ClientStreaming | CallShape::BidiStreaming => false,
            other => {
                return Err(AppError::General(format!(
                    "{} is {}, not a streaming call",
                    method.name, other
                )))
            }
        };
        self.import(deps::context());
        self.import(deps::gax());
        let pb = self.stub_package()?;
        let stream = format!("{}.{}_{}Client", pb, self.service.name, method.name);
        let client = self.client_type();

        self.method_doc(method);
        if with_request {
            let req = self.go_type(&method.input_type)?;
            emit!(
                self.em,
                "func (c *{}) {}(ctx context.Context, req *{}, opts ...gax.CallOption) ({}, error) {{",
                client,
                method.name,
                req,
                stream
            );
        } else {
            emit!(
                self.em,
                "func (c *{}) {}(ctx context.Context, opts ...gax.CallOption) ({}, error) {{",
                client,
                method.name,
                stream
            );
        }
        self.call_setup(method);
        emit!(self.em, "var resp {}", stream);
        self.invoke("resp", method, with_request);
        self.return_resp();
        Ok(())
    }

    fn return_resp(&mut self) {
        self.em.line("if err != nil {");
        self.em.line("return nil, err");
        self.em.line("}");
        self.em.line("return resp, nil");
        self.em.line("}");
        self.em.blank();
    }
}
