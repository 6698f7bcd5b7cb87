#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving Go identifiers and file names from schema names.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Converts a mixed-case string (CamelCase or camelCase) to snake_case.
/// Used for output file names.
pub fn to_snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Converts a snake_case field name to the exported Go field name protoc-gen-go uses.
///
/// e.g. `next_page_token` -> `NextPageToken`
pub fn go_field_name(field: &str) -> String {
    field.to_upper_camel_case()
}

/// Lowercases the first character.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reduces a service name to the prefix used for the client type.
///
/// The `Service` suffix is dropped, and a name equal to the Go package name
/// (ignoring case) reduces to the empty string so the client is just `Client`.
///
/// e.g. `LibraryService` in package `library` -> ``, in package `admin` -> `Library`
pub fn reduce_service_name(service: &str, go_package_name: &str) -> String {
    let name = service.strip_suffix("Service").unwrap_or(service);
    if name.eq_ignore_ascii_case(go_package_name) {
        String::new()
    } else {
        name.to_string()
    }
}

/// Name of the unexported field holding the gRPC stub for a reduced service name.
///
/// e.g. `` -> `client`, `Library` -> `libraryClient`
pub fn stub_field_name(reduced: &str) -> String {
    if reduced.is_empty() {
        "client".to_string()
    } else {
        format!("{}Client", reduced.to_lower_camel_case())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_conversion() {
        assert_eq!(to_snake_case("LibraryService"), "library_service");
        assert_eq!(to_snake_case("id"), "id");
        assert_eq!(to_snake_case("camelCaseTemp"), "camel_case_temp");
    }

    #[test]
    fn test_go_field_name() {
        assert_eq!(go_field_name("next_page_token"), "NextPageToken");
        assert_eq!(go_field_name("books"), "Books");
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("Gets a book."), "gets a book.");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_reduce_service_name() {
        assert_eq!(reduce_service_name("LibraryService", "library"), "");
        assert_eq!(reduce_service_name("Library", "library"), "");
        assert_eq!(reduce_service_name("LibraryService", "admin"), "Library");
        assert_eq!(reduce_service_name("Echo", "showcase"), "Echo");
    }

    #[test]
    fn test_stub_field_name() {
        assert_eq!(stub_field_name(""), "client");
        assert_eq!(stub_field_name("Library"), "libraryClient");
    }
}
