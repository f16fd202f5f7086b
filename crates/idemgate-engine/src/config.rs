//! Engine configuration

use crate::error::IdempotencyError;
use idemgate_core::AuditSink;
use idemgate_fingerprint::FingerprintAlgorithm;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Smallest permitted lock TTL.
pub const MIN_LOCK_TTL: Duration = Duration::from_millis(50);
/// Largest permitted lock TTL.
pub const MAX_LOCK_TTL: Duration = Duration::from_millis(300_000);
/// Smallest permitted handler timeout.
pub const MIN_HANDLER_TIMEOUT: Duration = Duration::from_millis(50);
/// Largest permitted handler timeout.
pub const MAX_HANDLER_TIMEOUT: Duration = Duration::from_millis(300_000);
/// Compliance floor for retention (PCI-DSS 24 hours).
pub const MIN_RETENTION: Duration = Duration::from_millis(86_400_000);

/// Default lock TTL.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_millis(30_000);
/// Default handler timeout.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_millis(30_000);
/// Default retention (the compliance floor).
pub const DEFAULT_RETENTION: Duration = MIN_RETENTION;

/// Engine configuration, immutable after construction.
///
/// The audit sink is required — every execution path reports to it — so
/// it is a constructor argument rather than an optional field.
#[derive(Clone)]
pub struct EngineConfig {
    /// Maximum time a processing record survives uncommitted.
    pub lock_ttl: Duration,
    /// How long a committed record remains queryable after creation.
    pub retention: Duration,
    /// Destination of the compliance audit stream.
    pub audit_sink: Arc<dyn AuditSink>,
    /// Hash used by [`IdempotencyEngine::fingerprint`].
    ///
    /// [`IdempotencyEngine::fingerprint`]: crate::IdempotencyEngine::fingerprint
    pub fingerprint_algorithm: FingerprintAlgorithm,
    /// Namespace prepended to every key.
    pub key_prefix: String,
}

impl EngineConfig {
    /// Configuration with defaults: 30 s lock TTL, 24 h retention,
    /// SHA-256 fingerprints, empty key prefix.
    pub fn new(audit_sink: Arc<dyn AuditSink>) -> Self {
        Self {
            lock_ttl: DEFAULT_LOCK_TTL,
            retention: DEFAULT_RETENTION,
            audit_sink,
            fingerprint_algorithm: FingerprintAlgorithm::default(),
            key_prefix: String::new(),
        }
    }

    pub fn with_lock_ttl(mut self, lock_ttl: Duration) -> Self {
        self.lock_ttl = lock_ttl;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_fingerprint_algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.fingerprint_algorithm = algorithm;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Check the numeric bounds. Called by engine construction.
    pub fn validate(&self) -> Result<(), IdempotencyError> {
        check_duration("lock_ttl", self.lock_ttl, MIN_LOCK_TTL, MAX_LOCK_TTL)?;
        check_retention(self.retention)?;
        Ok(())
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("lock_ttl", &self.lock_ttl)
            .field("retention", &self.retention)
            .field("fingerprint_algorithm", &self.fingerprint_algorithm)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_duration(
    parameter: &'static str,
    value: Duration,
    min: Duration,
    max: Duration,
) -> Result<(), IdempotencyError> {
    if value < min || value > max {
        return Err(IdempotencyError::InvalidDuration {
            parameter,
            value_ms: value.as_millis() as u64,
            min_ms: min.as_millis() as u64,
            max_ms: max.as_millis() as u64,
        });
    }
    Ok(())
}

pub(crate) fn check_retention(value: Duration) -> Result<(), IdempotencyError> {
    if value < MIN_RETENTION {
        return Err(IdempotencyError::InvalidRetention {
            retention_ms: value.as_millis() as u64,
            minimum_ms: MIN_RETENTION.as_millis() as u64,
        });
    }
    Ok(())
}
