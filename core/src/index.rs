#![deny(missing_docs)]

//! # Descriptor Index
//!
//! Lookup tables built once per generation run from the complete descriptor set:
//! full name → schema node, full name → owning file, full name → leading comment.
//!
//! The index is immutable after `build` and is passed by reference into every
//! generator call. It covers every input file, not just the ones marked for
//! generation, so cross-file type references resolve.

use crate::descriptor::{
    EnumDescriptor, FileDescriptor, MessageDescriptor, Node, ServiceDescriptor,
    FILE_SERVICE_FIELD, SERVICE_METHOD_FIELD,
};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    node: Node<'a>,
    file: &'a FileDescriptor,
}

/// Read-only lookup tables over a descriptor set.
#[derive(Debug, Default)]
pub struct DescriptorIndex<'a> {
    files: IndexMap<&'a str, &'a FileDescriptor>,
    entries: IndexMap<String, Entry<'a>>,
    comments: HashMap<String, String>,
}

impl<'a> DescriptorIndex<'a> {
    /// Builds the index over every file of the request.
    pub fn build(files: &'a [FileDescriptor]) -> Self {
        let mut index = Self::default();

        for file in files {
            index.files.insert(file.name.as_str(), file);
            let prefix = package_prefix(&file.package);

            for msg in &file.messages {
                index.insert_message(file, &prefix, msg);
            }
            for en in &file.enums {
                index.insert_enum(file, &prefix, en);
            }
            for svc in &file.services {
                index.insert_service(file, &prefix, svc);
            }
            index.collect_comments(file, &prefix);
        }

        tracing::debug!(
            files = index.files.len(),
            elements = index.entries.len(),
            comments = index.comments.len(),
            "descriptor index built"
        );
        index
    }

    fn insert(&mut self, full_name: String, node: Node<'a>, file: &'a FileDescriptor) {
        if let Some(prev) = self.entries.insert(full_name.clone(), Entry { node, file }) {
            tracing::warn!(
                name = %full_name,
                previous = %prev.file.name,
                current = %file.name,
                "duplicate element name, keeping the last declaration"
            );
        }
    }

    fn insert_message(&mut self, file: &'a FileDescriptor, scope: &str, msg: &'a MessageDescriptor) {
        let full_name = format!("{}.{}", scope, msg.name);
        for field in &msg.fields {
            self.insert(
                format!("{}.{}", full_name, field.name),
                Node::Field(field),
                file,
            );
        }
        for nested in &msg.nested_messages {
            self.insert_message(file, &full_name, nested);
        }
        for en in &msg.nested_enums {
            self.insert_enum(file, &full_name, en);
        }
        self.insert(full_name, Node::Message(msg), file);
    }

    fn insert_enum(&mut self, file: &'a FileDescriptor, scope: &str, en: &'a EnumDescriptor) {
        self.insert(format!("{}.{}", scope, en.name), Node::Enum(en), file);
    }

    fn insert_service(&mut self, file: &'a FileDescriptor, scope: &str, svc: &'a ServiceDescriptor) {
        let full_name = format!("{}.{}", scope, svc.name);
        for method in &svc.methods {
            self.insert(
                format!("{}.{}", full_name, method.name),
                Node::Method(method),
                file,
            );
        }
        self.insert(full_name, Node::Service(svc), file);
    }

    /// Only service (`[6, s]`) and method (`[6, s, 2, m]`) paths are recognized;
    /// every other location shape is skipped.
    fn collect_comments(&mut self, file: &'a FileDescriptor, prefix: &str) {
        for loc in &file.locations {
            let Some(comment) = loc.leading_comments.as_deref() else {
                continue;
            };
            let key = match loc.path.as_slice() {
                [FILE_SERVICE_FIELD, s] => service_at(file, *s).map(|svc| format!("{}.{}", prefix, svc.name)),
                [FILE_SERVICE_FIELD, s, SERVICE_METHOD_FIELD, m] => service_at(file, *s).and_then(|svc| {
                    usize::try_from(*m)
                        .ok()
                        .and_then(|m| svc.methods.get(m))
                        .map(|method| format!("{}.{}.{}", prefix, svc.name, method.name))
                }),
                _ => None,
            };
            if let Some(key) = key {
                self.comments.insert(key, comment.to_string());
            }
        }
    }

    /// Looks up a file by its name.
    pub fn file(&self, name: &str) -> Option<&'a FileDescriptor> {
        self.files.get(name).copied()
    }

    /// Looks up any schema node by its fully qualified name.
    pub fn node(&self, full_name: &str) -> Option<Node<'a>> {
        self.entries.get(full_name).map(|e| e.node)
    }

    /// Resolves a fully qualified message name.
    ///
    /// A missing name, or a name that is not a message, is an unresolved reference.
    pub fn message(&self, full_name: &str) -> AppResult<&'a MessageDescriptor> {
        match self.node(full_name) {
            Some(Node::Message(msg)) => Ok(msg),
            Some(other) => Err(AppError::UnresolvedReference(format!(
                "{} is a {}, expected a message",
                full_name,
                other.kind_label()
            ))),
            None => Err(AppError::UnresolvedReference(format!(
                "type {} not found in descriptor set",
                full_name
            ))),
        }
    }

    /// Returns the file declaring the given element.
    pub fn owning_file(&self, full_name: &str) -> AppResult<&'a FileDescriptor> {
        self.entries
            .get(full_name)
            .map(|e| e.file)
            .ok_or_else(|| {
                AppError::UnresolvedReference(format!("no file declares {}", full_name))
            })
    }

    /// Returns the leading comment attached to a service or method, if any.
    pub fn comment(&self, full_name: &str) -> Option<&str> {
        self.comments.get(full_name).map(String::as_str)
    }
}

/// Full-name prefix for elements of a package: `.pkg` or empty.
pub fn package_prefix(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!(".{}", package)
    }
}

/// Fully qualified name of a service declared in `file`.
pub fn service_full_name(file: &FileDescriptor, svc: &ServiceDescriptor) -> String {
    format!("{}.{}", package_prefix(&file.package), svc.name)
}

fn service_at(file: &FileDescriptor, idx: i32) -> Option<&ServiceDescriptor> {
    usize::try_from(idx).ok().and_then(|i| file.services.get(i))
}
