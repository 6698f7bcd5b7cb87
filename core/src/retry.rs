#![deny(missing_docs)]

//! # Retry Policy Synthesis
//!
//! Decides which methods of a service are retried by default. A method is
//! retryable when its `google.api.http` binding uses the read verb (`GET`) and it
//! is a single request/response call; streams are never retried.
//!
//! The backoff schedule is fixed. It is not derived from any annotation.

use crate::descriptor::{MethodDescriptor, ServiceDescriptor};
use indexmap::IndexMap;
use std::time::Duration;

/// gRPC status codes that may appear in a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCode {
    /// `DEADLINE_EXCEEDED`
    DeadlineExceeded,
    /// `UNAVAILABLE`
    Unavailable,
}

impl StatusCode {
    /// The Go identifier in `google.golang.org/grpc/codes`.
    pub fn go_name(self) -> &'static str {
        match self {
            StatusCode::DeadlineExceeded => "DeadlineExceeded",
            StatusCode::Unavailable => "Unavailable",
        }
    }
}

/// Retry settings attached to a method.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Codes that trigger a retry, in emission order.
    pub codes: Vec<StatusCode>,
    /// First backoff delay.
    pub initial: Duration,
    /// Upper bound on the backoff delay.
    pub max: Duration,
    /// Growth factor between attempts.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            codes: vec![StatusCode::DeadlineExceeded, StatusCode::Unavailable],
            initial: Duration::from_millis(100),
            max: Duration::from_millis(60_000),
            multiplier: 1.3,
        }
    }
}

/// Whether a method gets the default retry policy.
pub fn is_retryable(method: &MethodDescriptor) -> bool {
    if method.client_streaming || method.server_streaming {
        return false;
    }
    method.http.as_ref().is_some_and(|rule| rule.verb.is_read())
}

/// Computes the retry policy of every retryable method, keyed by method name
/// in declaration order. Methods without a policy are simply absent.
pub fn synthesize(service: &ServiceDescriptor) -> IndexMap<String, RetryPolicy> {
    service
        .methods
        .iter()
        .filter(|m| is_retryable(m))
        .map(|m| (m.name.clone(), RetryPolicy::default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{HttpRule, HttpVerb};

    fn method(name: &str, verb: Option<HttpVerb>, server_streaming: bool) -> MethodDescriptor {
        MethodDescriptor {
            name: name.into(),
            input_type: ".pkg.Req".into(),
            output_type: ".pkg.Resp".into(),
            server_streaming,
            http: verb.map(|verb| HttpRule {
                verb,
                path: "/v1/things".into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_only_get_methods_are_retryable() {
        let service = ServiceDescriptor {
            name: "LibraryService".into(),
            methods: vec![
                method("GetBook", Some(HttpVerb::Get), false),
                method("CreateBook", Some(HttpVerb::Post), false),
                method("Noop", None, false),
                method("ListBooks", Some(HttpVerb::Get), false),
            ],
            ..Default::default()
        };
        let policies = synthesize(&service);
        let names: Vec<&str> = policies.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["GetBook", "ListBooks"]);
        assert_eq!(policies["GetBook"], RetryPolicy::default());
    }

    #[test]
    fn test_streams_are_not_retried() {
        let watch = method("Watch", Some(HttpVerb::Get), true);
        assert!(!is_retryable(&watch));
    }

    #[test]
    fn test_no_read_methods_means_no_policies() {
        let service = ServiceDescriptor {
            name: "Writer".into(),
            methods: vec![method("Write", Some(HttpVerb::Put), false)],
            ..Default::default()
        };
        assert!(synthesize(&service).is_empty());
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.initial.as_millis(), 100);
        assert_eq!(policy.max.as_millis(), 60_000);
        assert_eq!(policy.codes[0].go_name(), "DeadlineExceeded");
    }
}
