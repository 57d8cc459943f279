//! Common error types used throughout psperf.
//!
//! Every failure that can reach a caller of the catalog is funnelled into
//! [`Error`]. The transport layer derives an HTTP status from it via
//! [`Error::http_status`].

/// Common error type for psperf.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A specific record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record identifier could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A lookup produced nothing after every source was exhausted.
    #[error("No results: {0}")]
    NoResults(String),

    /// The record store could not be reached or a query failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The external metadata provider failed (network, auth, status, decode).
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidIdentifier error.
    pub fn invalid_identifier<S: Into<String>>(msg: S) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new NoResults error.
    pub fn no_results<S: Into<String>>(msg: S) -> Self {
        Self::NoResults(msg.into())
    }

    /// Create a new StorageUnavailable error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create a new ProviderUnavailable error.
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) | Error::NoResults(_) => 404,
            Error::InvalidIdentifier(_) | Error::InvalidInput(_) => 400,
            Error::ProviderUnavailable(_) => 502,
            Error::StorageUnavailable(_) | Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidIdentifier(_) => "invalid_identifier",
            Error::InvalidInput(_) => "invalid_input",
            Error::NoResults(_) => "no_results",
            Error::StorageUnavailable(_) => "storage_unavailable",
            Error::ProviderUnavailable(_) => "provider_unavailable",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("game 42");
        assert_eq!(err.to_string(), "Not found: game 42");

        let err = Error::invalid_identifier("xyz");
        assert_eq!(err.to_string(), "Invalid identifier: xyz");

        let err = Error::storage("connection refused");
        assert_eq!(err.to_string(), "Storage unavailable: connection refused");

        let err = Error::provider("status 503");
        assert_eq!(err.to_string(), "Provider unavailable: status 503");

        let err = Error::no_results("catalog is empty");
        assert_eq!(err.to_string(), "No results: catalog is empty");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::not_found("x").http_status(), 404);
        assert_eq!(Error::no_results("x").http_status(), 404);
        assert_eq!(Error::invalid_identifier("x").http_status(), 400);
        assert_eq!(Error::invalid_input("x").http_status(), 400);
        assert_eq!(Error::provider("x").http_status(), 502);
        assert_eq!(Error::storage("x").http_status(), 500);
        assert_eq!(Error::internal("x").http_status(), 500);
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            Error::not_found("x"),
            Error::invalid_identifier("x"),
            Error::invalid_input("x"),
            Error::no_results("x"),
            Error::storage("x"),
            Error::provider("x"),
            Error::internal("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
