//! Engine error taxonomy
//!
//! A single root error kind with distinguishable subkinds, each carrying
//! only the extra fields it needs. Stable string codes and an advisory
//! HTTP mapping are exposed for callers that adapt the engine to a
//! transport; the engine itself never recovers from an error except
//! swallowed audit-sink failures.

use idemgate_store::StoreError;
use thiserror::Error;

/// Boxed failure produced by a caller-supplied handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by engine construction and [`execute`].
///
/// [`execute`]: crate::IdempotencyEngine::execute
#[derive(Debug, Error)]
pub enum IdempotencyError {
    /// Key was empty or whitespace-only.
    #[error("invalid idempotency key: {message}")]
    InvalidKey { message: String },

    /// Retention (default or per-call override) below the 24 h
    /// compliance minimum.
    #[error("retention {retention_ms}ms is below the {minimum_ms}ms compliance minimum")]
    InvalidRetention { retention_ms: u64, minimum_ms: u64 },

    /// Lock TTL or handler timeout outside its permitted range.
    #[error("{parameter} out of range: {value_ms}ms not within [{min_ms}ms, {max_ms}ms]")]
    InvalidDuration {
        parameter: &'static str,
        value_ms: u64,
        min_ms: u64,
        max_ms: u64,
    },

    /// A committed record exists for this key with a different payload
    /// fingerprint. Security-relevant: always audited as
    /// `fingerprint_mismatch`.
    #[error("fingerprint mismatch for key {key}: committed record was created from a different payload")]
    FingerprintMismatch {
        key: String,
        stored_fingerprint: String,
    },

    /// A concurrent holder owns the processing lock for this key.
    #[error("operation already in progress for key {key}")]
    OperationInProgress { key: String },

    /// The handler did not settle within its timeout.
    #[error("handler did not settle within {timeout_ms}ms for key {key}")]
    HandlerTimeout { key: String, timeout_ms: u64 },

    /// The store primitive or commit failed; wraps the original cause.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The handler itself failed; the original failure is the source.
    #[error("handler failure: {source}")]
    Handler { #[source] source: BoxError },
}

impl IdempotencyError {
    pub fn invalid_key(message: impl Into<String>) -> Self {
        IdempotencyError::InvalidKey {
            message: message.into(),
        }
    }

    pub fn handler(source: BoxError) -> Self {
        IdempotencyError::Handler { source }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            IdempotencyError::InvalidKey { .. } => "INVALID_KEY",
            IdempotencyError::InvalidRetention { .. } => "INVALID_RETENTION",
            IdempotencyError::InvalidDuration { .. } => "INVALID_DURATION",
            IdempotencyError::FingerprintMismatch { .. } => "FINGERPRINT_MISMATCH",
            IdempotencyError::OperationInProgress { .. } => "OPERATION_IN_PROGRESS",
            IdempotencyError::HandlerTimeout { .. } => "HANDLER_TIMEOUT",
            IdempotencyError::Store(_) => "STORE_ERROR",
            IdempotencyError::Handler { .. } => "HANDLER_ERROR",
        }
    }

    /// Advisory HTTP status for transport adapters.
    pub fn http_status(&self) -> u16 {
        match self {
            IdempotencyError::InvalidKey { .. }
            | IdempotencyError::InvalidRetention { .. }
            | IdempotencyError::InvalidDuration { .. } => 400,
            IdempotencyError::FingerprintMismatch { .. } => 422,
            IdempotencyError::OperationInProgress { .. } => 409,
            IdempotencyError::HandlerTimeout { .. } | IdempotencyError::Store(_) => 503,
            IdempotencyError::Handler { .. } => 500,
        }
    }

    /// Whether the same call could succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        match self {
            IdempotencyError::OperationInProgress { .. } => true,
            IdempotencyError::Store(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error should be escalated as a possible replay attack.
    pub fn is_security_event(&self) -> bool {
        matches!(self, IdempotencyError::FingerprintMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            IdempotencyError::invalid_key("empty").code(),
            "INVALID_KEY"
        );
        assert_eq!(
            IdempotencyError::FingerprintMismatch {
                key: "k".into(),
                stored_fingerprint: "aa".into(),
            }
            .code(),
            "FINGERPRINT_MISMATCH"
        );
        assert_eq!(
            IdempotencyError::Store(StoreError::backend("down")).code(),
            "STORE_ERROR"
        );
    }

    #[test]
    fn http_mapping() {
        assert_eq!(IdempotencyError::invalid_key("empty").http_status(), 400);
        assert_eq!(
            IdempotencyError::OperationInProgress { key: "k".into() }.http_status(),
            409
        );
        assert_eq!(
            IdempotencyError::FingerprintMismatch {
                key: "k".into(),
                stored_fingerprint: "aa".into(),
            }
            .http_status(),
            422
        );
        assert_eq!(
            IdempotencyError::HandlerTimeout {
                key: "k".into(),
                timeout_ms: 50,
            }
            .http_status(),
            503
        );
    }

    #[test]
    fn mismatch_is_the_only_security_event() {
        assert!(IdempotencyError::FingerprintMismatch {
            key: "k".into(),
            stored_fingerprint: "aa".into(),
        }
        .is_security_event());
        assert!(!IdempotencyError::invalid_key("x").is_security_event());
        assert!(!IdempotencyError::OperationInProgress { key: "k".into() }.is_security_event());
    }

    #[test]
    fn in_progress_is_retryable_validation_is_not() {
        assert!(IdempotencyError::OperationInProgress { key: "k".into() }.is_retryable());
        assert!(IdempotencyError::Store(StoreError::backend("down")).is_retryable());
        assert!(!IdempotencyError::invalid_key("x").is_retryable());
        assert!(!IdempotencyError::HandlerTimeout {
            key: "k".into(),
            timeout_ms: 50,
        }
        .is_retryable());
    }

    #[test]
    fn handler_error_keeps_original_as_source() {
        let original: BoxError = "payment gateway refused".into();
        let err = IdempotencyError::handler(original);
        assert!(err.to_string().contains("payment gateway refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn duration_error_names_parameter() {
        let err = IdempotencyError::InvalidDuration {
            parameter: "lock_ttl",
            value_ms: 10,
            min_ms: 50,
            max_ms: 300_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("lock_ttl"));
        assert!(msg.contains("10ms"));
    }
}
