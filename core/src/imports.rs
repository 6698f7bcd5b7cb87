#![deny(missing_docs)]

//! # Import Resolution
//!
//! Maps a declaring file to the Go import that exposes its generated types, and
//! keeps the per-file import set deduplicated and deterministically ordered.

use crate::descriptor::FileDescriptor;
use crate::error::{AppError, AppResult};
use indexmap::IndexSet;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// A single Go import: optional alias plus import path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpec {
    /// Package alias; empty when the import is unaliased.
    pub name: String,
    /// Import path.
    pub path: String,
}

impl ImportSpec {
    /// An aliased import.
    pub fn named(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    /// An unaliased import.
    pub fn path(path: &str) -> Self {
        Self::named("", path)
    }

    /// Standard-library imports have no dot in their path.
    pub fn is_std(&self) -> bool {
        !self.path.contains('.')
    }

    /// Identifier the import binds in the importing file.
    pub fn bound_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.path
            .rsplit('/')
            .find(|seg| !seg.is_empty() && !version_segment().is_match(seg))
            .unwrap_or(&self.path)
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{:?}", self.path)
        } else {
            write!(f, "{} {:?}", self.name, self.path)
        }
    }
}

/// Total order used for emitted import blocks: std first, then path, then alias.
pub fn import_order(a: &ImportSpec, b: &ImportSpec) -> Ordering {
    b.is_std()
        .cmp(&a.is_std())
        .then_with(|| a.path.cmp(&b.path))
        .then_with(|| a.name.cmp(&b.name))
}

/// Import set accumulated for one output unit.
#[derive(Debug, Default, Clone)]
pub struct ImportSet {
    specs: IndexSet<ImportSpec>,
}

impl ImportSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an import; duplicates are ignored.
    pub fn insert(&mut self, spec: ImportSpec) {
        self.specs.insert(spec);
    }

    /// Number of distinct imports.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ImportSpec> {
        self.specs.iter()
    }
}

/// Sorts an import set for emission.
///
/// Returns the ordered imports and the index of the first third-party import
/// (equal to the length when every import is from the standard library).
pub fn sort_imports(set: &ImportSet) -> (Vec<ImportSpec>, usize) {
    let mut sorted: Vec<ImportSpec> = set.iter().cloned().collect();
    sorted.sort_by(import_order);
    let boundary = sorted
        .iter()
        .position(|spec| !spec.is_std())
        .unwrap_or(sorted.len());
    (sorted, boundary)
}

fn version_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v\d").expect("static regex"))
}

/// Resolves the import exposing the generated types of `file`.
///
/// `go_package` is either `path;alias` or a bare path. A bare path derives its
/// alias from the last segment that is not a version marker (`v1`, `v2beta1`).
pub fn resolve(file: &FileDescriptor) -> AppResult<ImportSpec> {
    let hint = file.go_package.as_deref().map(str::trim).unwrap_or_default();
    if hint.is_empty() {
        return Err(AppError::UnresolvedReference(format!(
            "{} has no go_package option",
            file.name
        )));
    }

    let (path, alias) = match hint.split_once(';') {
        Some((path, alias)) => (path.trim(), alias.trim()),
        None => (hint, ""),
    };
    if path.is_empty() {
        return Err(AppError::UnresolvedReference(format!(
            "{} has an empty go_package import path",
            file.name
        )));
    }
    if !alias.is_empty() {
        return Ok(ImportSpec::named(alias, path));
    }

    let alias = path
        .rsplit('/')
        .find(|seg| !seg.is_empty() && !version_segment().is_match(seg))
        .map(|seg| seg.replace(['-', '.'], ""))
        .filter(|seg| !seg.is_empty())
        .ok_or_else(|| {
            AppError::UnresolvedReference(format!(
                "cannot derive a package name from go_package {:?} in {}",
                path, file.name
            ))
        })?;
    Ok(ImportSpec::named(&alias, path))
}
