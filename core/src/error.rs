//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the generator.
//!
//! Every failure is a value: generators return `AppResult` up to the per-file
//! driver, which records the first fatal error as the outcome of the run.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// A type or service name could not be found in the descriptor index,
    /// or its declaring file carries no usable package hint.
    #[from(ignore)]
    #[display("unresolved reference: {_0}")]
    UnresolvedReference(String),

    /// The method looks paginated but the response has several repeated fields.
    #[from(ignore)]
    #[display(
        "{method} looks like a paging method, but too many repeated fields in {message} ({count})"
    )]
    AmbiguousPaging {
        /// Name of the offending method.
        method: String,
        /// Name of the response message.
        message: String,
        /// Number of repeated fields found.
        count: usize,
    },

    /// The method looks paginated but the response has no repeated field.
    #[from(ignore)]
    #[display("{method} looks like a paging method, but can't find repeated field in {message}")]
    MissingPageElement {
        /// Name of the offending method.
        method: String,
        /// Name of the response message.
        message: String,
    },

    /// A schema construct the generator does not handle yet.
    #[from(ignore)]
    #[display("not yet supported: {_0}")]
    Unsupported(String),

    /// A required annotation is absent (e.g. `google.api.default_host`).
    #[from(ignore)]
    #[display("missing annotation: {_0}")]
    MissingAnnotation(String),

    /// The plugin parameter string could not be understood.
    #[from(ignore)]
    #[display("invalid parameter: {_0}")]
    InvalidParameter(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_paging_errors_name_method_and_message() {
        let err = AppError::AmbiguousPaging {
            method: "ListBooks".into(),
            message: "ListBooksResponse".into(),
            count: 2,
        };
        let text = err.to_string();
        assert!(text.contains("ListBooks "));
        assert!(text.contains("ListBooksResponse"));

        let err = AppError::MissingPageElement {
            method: "ListShelves".into(),
            message: "ListShelvesResponse".into(),
        };
        assert_eq!(
            err.to_string(),
            "ListShelves looks like a paging method, but can't find repeated field in ListShelvesResponse"
        );
    }
}
