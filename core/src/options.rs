#![deny(missing_docs)]

//! # Generator Options
//!
//! Parses the free-form plugin parameter string handed over by protoc, e.g.
//!
//! ```text
//! go-gapic-package=cloud.google.com/go/library/apiv1;library,module=cloud.google.com/go
//! ```

use crate::error::{AppError, AppResult};

/// Options controlling one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Import path of the generated Go package.
    pub pkg_path: String,
    /// Go package name of the generated package.
    pub pkg_name: String,
    /// Module prefix stripped from output file names.
    pub module: Option<String>,
    /// Year written in the license header.
    pub copyright_year: Option<i32>,
}

impl GeneratorOptions {
    /// Options for a package, with no module prefix and no explicit year.
    pub fn new(pkg_path: &str, pkg_name: &str) -> Self {
        Self {
            pkg_path: pkg_path.to_string(),
            pkg_name: pkg_name.to_string(),
            module: None,
            copyright_year: None,
        }
    }

    /// Parses a comma separated `key=value` parameter string.
    ///
    /// `go-gapic-package` is required. Unknown keys are rejected.
    pub fn parse(parameter: Option<&str>) -> AppResult<Self> {
        let mut package = None;
        let mut module = None;
        let mut copyright_year = None;

        for part in parameter
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                AppError::InvalidParameter(format!("expected key=value, got {:?}", part))
            })?;
            match key.trim() {
                "go-gapic-package" => package = Some(parse_package(value.trim())?),
                "module" => module = Some(value.trim().trim_end_matches('/').to_string()),
                "copyright-year" => {
                    let year = value.trim().parse::<i32>().map_err(|e| {
                        AppError::InvalidParameter(format!("copyright-year {:?}: {}", value, e))
                    })?;
                    copyright_year = Some(year);
                }
                other => {
                    return Err(AppError::InvalidParameter(format!(
                        "unknown parameter {:?}",
                        other
                    )))
                }
            }
        }

        let (pkg_path, pkg_name) = package.ok_or_else(|| {
            AppError::InvalidParameter(
                "need go-gapic-package parameter, e.g. go-gapic-package=path/to/pkg;name".into(),
            )
        })?;

        Ok(Self {
            pkg_path,
            pkg_name,
            module,
            copyright_year,
        })
    }

    /// Directory of generated files, relative to the protoc output root.
    pub fn output_dir(&self) -> String {
        match &self.module {
            Some(prefix) if !prefix.is_empty() => self
                .pkg_path
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.trim_start_matches('/').to_string())
                .unwrap_or_else(|| self.pkg_path.clone()),
            _ => self.pkg_path.clone(),
        }
    }

    /// Output path of a file inside the generated package.
    pub fn output_file(&self, file_name: &str) -> String {
        let dir = self.output_dir();
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }
}

fn parse_package(value: &str) -> AppResult<(String, String)> {
    match value.split_once(';') {
        Some((path, name)) if !path.trim().is_empty() && !name.trim().is_empty() => {
            Ok((path.trim().to_string(), name.trim().to_string()))
        }
        _ => Err(AppError::InvalidParameter(format!(
            "bad go-gapic-package {:?}, expected path;name",
            value
        ))),
    }
}
