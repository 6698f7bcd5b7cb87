//! Paged calls and their iterators.
//!
//! The call clones the request and installs an `InternalFetch` that fetches one
//! page; `iterator.NewPageInfo` drives it. `Next` pops from the buffered page and
//! reports `iterator.Done` once the last page is drained. See `crate::paging` for
//! the same protocol as executable Rust.

use super::{deps, ServiceGenerator};
use crate::classify::PageElement;
use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::emit;
use crate::error::AppResult;
use crate::naming::go_field_name;

impl ServiceGenerator<'_> {
    /// Go type of one iterator element (`*pb.Book`, `float64`, ...).
    fn element_type(&mut self, element: &PageElement) -> AppResult<String> {
        match element {
            PageElement::Message { type_name, .. } => Ok(format!("*{}", self.go_type(type_name)?)),
            PageElement::Primitive { go_type, .. } => Ok(go_type.to_string()),
        }
    }

    pub(super) fn paging_call(
        &mut self,
        method: &MethodDescriptor,
        field: &FieldDescriptor,
        element: &PageElement,
    ) -> AppResult<()> {
        self.import(deps::context());
        self.import(deps::gax());
        self.import(deps::math());
        self.import(deps::proto());
        self.import(deps::iterator());
        let req = self.go_type(&method.input_type)?;
        let resp = self.go_type(&method.output_type)?;
        let elem = self.element_type(element)?;
        let iter = element.iterator_name();
        let client = self.client_type();
        let slot = format!("c.CallOptions.{}", method.name);

        let full_name = format!("{}.{}", self.full_name, method.name);
        self.doc_comment(&full_name, &method.name);
        emit!(
            self.em,
            "func (c *{}) {}(ctx context.Context, req *{}, opts ...gax.CallOption) *{} {{",
            client,
            method.name,
            req,
            iter
        );
        self.em.line("ctx = insertMetadata(ctx, c.xGoogMetadata)");
        emit!(self.em, "opts = append({0}[0:len({0}):len({0})], opts...)", slot);
        emit!(self.em, "it := &{}{{}}", iter);
        emit!(self.em, "req = proto.Clone(req).(*{})", req);
        emit!(
            self.em,
            "it.InternalFetch = func(pageSize int, pageToken string) ([]{}, string, error) {{",
            elem
        );
        emit!(self.em, "var resp *{}", resp);
        self.em.line("req.PageToken = pageToken");
        self.em.line("if pageSize > math.MaxInt32 {");
        self.em.line("req.PageSize = math.MaxInt32");
        self.em.line("} else {");
        self.em.line("req.PageSize = int32(pageSize)");
        self.em.line("}");
        self.em.line("err := gax.Invoke(ctx, func(ctx context.Context, settings gax.CallSettings) error {");
        self.em.line("var err error");
        emit!(
            self.em,
            "resp, err = c.{}.{}(ctx, req, settings.GRPC...)",
            self.stub_field(),
            method.name
        );
        self.em.line("return err");
        self.em.line("}, opts...)");
        self.em.line("if err != nil {");
        self.em.line("return nil, \"\", err");
        self.em.line("}");
        emit!(
            self.em,
            "return resp.Get{}(), resp.GetNextPageToken(), nil",
            go_field_name(&field.name)
        );
        self.em.line("}");
        self.em.line("fetch := func(pageSize int, pageToken string) (string, error) {");
        self.em.line("items, nextPageToken, err := it.InternalFetch(pageSize, pageToken)");
        self.em.line("if err != nil {");
        self.em.line("return \"\", err");
        self.em.line("}");
        self.em.line("it.items = append(it.items, items...)");
        self.em.line("return nextPageToken, nil");
        self.em.line("}");
        self.em.line("it.pageInfo, it.nextFunc = iterator.NewPageInfo(fetch, it.bufLen, it.takeBuf)");
        self.em.line("it.pageInfo.MaxSize = int(req.GetPageSize())");
        self.em.line("return it");
        self.em.line("}");
        self.em.blank();
        Ok(())
    }

    pub(super) fn paging_iterator(&mut self, element: &PageElement) -> AppResult<()> {
        self.import(deps::iterator());
        let elem = self.element_type(element)?;
        let iter = element.iterator_name();

        emit!(self.em, "// {} manages a stream of {}.", iter, elem);
        emit!(self.em, "type {} struct {{", iter);
        emit!(self.em, "items    []{}", elem);
        self.em.line("pageInfo *iterator.PageInfo");
        self.em.line("nextFunc func() error");
        self.em.blank();
        self.em.line("// InternalFetch is for use by the Google Cloud Libraries only.");
        self.em.line("// It is not part of the stable interface of this package.");
        self.em.line("//");
        self.em.line("// InternalFetch returns results from a single call to the underlying RPC.");
        self.em.line("// The number of results is no greater than pageSize.");
        self.em.line("// If there are no more results, nextPageToken is empty and err is nil.");
        emit!(
            self.em,
            "InternalFetch func(pageSize int, pageToken string) (results []{}, nextPageToken string, err error)",
            elem
        );
        self.em.line("}");
        self.em.blank();

        self.em.line("// PageInfo supports pagination. See the google.golang.org/api/iterator package for details.");
        emit!(self.em, "func (it *{}) PageInfo() *iterator.PageInfo {{", iter);
        self.em.line("return it.pageInfo");
        self.em.line("}");
        self.em.blank();

        self.em.line("// Next returns the next result. Its second return value is iterator.Done if there are no more");
        self.em.line("// results. Once Next returns Done, all subsequent calls will return Done.");
        emit!(self.em, "func (it *{}) Next() ({}, error) {{", iter, elem);
        emit!(self.em, "var item {}", elem);
        self.em.line("if err := it.nextFunc(); err != nil {");
        self.em.line("return item, err");
        self.em.line("}");
        self.em.line("item = it.items[0]");
        self.em.line("it.items = it.items[1:]");
        self.em.line("return item, nil");
        self.em.line("}");
        self.em.blank();

        emit!(self.em, "func (it *{}) bufLen() int {{", iter);
        self.em.line("return len(it.items)");
        self.em.line("}");
        self.em.blank();

        emit!(self.em, "func (it *{}) takeBuf() interface{{}} {{", iter);
        self.em.line("b := it.items");
        self.em.line("it.items = nil");
        self.em.line("return b");
        self.em.line("}");
        self.em.blank();
        Ok(())
    }
}
