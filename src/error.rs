//! Error types for the routed read path.

use thiserror::Error;

/// Errors surfaced by the query routing layer.
///
/// Policy decisions are not errors: an unsatisfied required label or a
/// window fully covered by local storage produces an empty series set,
/// never a variant of this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// Routing configuration that can never work, such as an external
    /// label whose name cannot form a matcher. Raised once at
    /// construction time, not on every query.
    #[error("invalid label configuration: {0}")]
    Configuration(String),

    /// A matcher in the selection has no wire-level representation.
    #[error("cannot lower selection: {0}")]
    Lowering(String),

    /// A remote read or a local start-time lookup failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A regex matcher pattern failed to compile.
    #[error("invalid matcher regex: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Wrap a transport or storage failure reported by a backend
    /// collaborator.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify backend errors keep their message through the wrapper.
    #[test]
    fn test_backend_error_display() {
        let error = Error::backend("connection refused");

        assert_eq!(error.to_string(), "backend error: connection refused");
    }

    /// Verify regex compilation failures convert into the error type.
    #[test]
    fn test_regex_error_conversion() {
        let result = regex::Regex::new("(unclosed");

        let error: Error = result.expect_err("pattern must not compile").into();
        assert!(matches!(error, Error::Regex(_)));
    }
}
