//! Store contract
//!
//! The atomic check-or-lock interface the engine drives. Implementable
//! over any backend providing conditional writes: Redis with server-side
//! scripting, SQL with row-level locking, conditional-write KV stores.
//! Cross-task coordination happens only here; the engine holds no locks
//! of its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use idemgate_core::AuditEvent;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend operation failed (connection, script, transaction).
    #[error("store backend failure: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Commit attempted without a live processing record: the lock
    /// expired, the key was already committed, or the record was wiped.
    #[error("no processing record held for key: {key}")]
    LockNotHeld { key: String },

    /// Record could not be serialized or deserialized.
    #[error("store serialization failure: {message}")]
    Serialization { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
            source: None,
        }
    }

    pub fn backend_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn lock_not_held(key: impl Into<String>) -> Self {
        StoreError::LockNotHeld { key: key.into() }
    }

    /// Whether a retry against the same store could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Backend { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: e.to_string(),
        }
    }
}

/// Outcome of the atomic check-or-lock probe.
#[derive(Debug, Clone)]
pub enum CheckAndLock {
    /// No record existed; a processing lock was installed for the caller.
    Acquired,
    /// A live processing record belongs to another holder.
    Locked,
    /// A live committed record exists.
    Exists {
        /// Fingerprint the record was committed with.
        fingerprint: String,
        /// The memoized result, opaque to the engine.
        result: Value,
        /// When the record was committed.
        created_at: DateTime<Utc>,
    },
}

/// Atomic persistence contract for idempotency keys.
///
/// `check_and_lock` and `commit_result` are required; the rest are
/// optional and default to no-ops. The engine never inspects an
/// adapter's serialization format; results are opaque payloads returned
/// as-is.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Atomically inspect the key and, if absent, install a processing
    /// record with the given TTL.
    ///
    /// Must be a single atomic action (server-side script, conditional
    /// write, transaction + advisory lock). Corrupt or unparseable
    /// records are treated as absent and may be overwritten to acquire
    /// the lock.
    async fn check_and_lock(
        &self,
        key: &str,
        fingerprint: &str,
        lock_ttl: Duration,
    ) -> StoreResult<CheckAndLock>;

    /// Atomically replace the processing record with a committed record
    /// bearing the fingerprint, result, and a fresh creation timestamp,
    /// expiring after `retention`.
    ///
    /// Fails with [`StoreError::LockNotHeld`] if no processing record is
    /// present.
    async fn commit_result(
        &self,
        key: &str,
        fingerprint: &str,
        result: &Value,
        retention: Duration,
    ) -> StoreResult<()>;

    /// Best-effort removal of a processing record. Must never remove a
    /// committed record. Cannot fail by signature; adapters swallow
    /// their own transport errors. TTL expiry reclaims the lock if this
    /// is never called.
    async fn release_lock(&self, _key: &str) {}

    /// Persist an audit event to an append-only log. Optional; failures
    /// stay inside the adapter.
    async fn record_audit(&self, _event: &AuditEvent) {}

    /// Release adapter resources. Optional.
    async fn close(&self) {}
}
