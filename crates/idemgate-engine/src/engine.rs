//! The idempotency engine
//!
//! Drives the key lifecycle through the store's atomic primitive: one
//! atomic probe decides between returning a memoized result, rejecting a
//! concurrent duplicate, or running the handler under a timeout and
//! committing its result. Cross-task coordination happens only in the
//! store; the engine holds no lock across any suspension point.

use crate::config::{
    check_duration, check_retention, EngineConfig, DEFAULT_HANDLER_TIMEOUT, MAX_HANDLER_TIMEOUT,
    MIN_HANDLER_TIMEOUT,
};
use crate::dispatch::AuditDispatcher;
use crate::error::{BoxError, IdempotencyError};
use crate::options::ExecuteOptions;
use idemgate_core::AuditAction;
use idemgate_fingerprint::FingerprintError;
use idemgate_store::{CheckAndLock, IdempotencyStore};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// At-most-once execution engine.
///
/// Wraps an operation so that, for a given key, the handler runs at most
/// once across arbitrarily many retries: duplicates receive the memoized
/// result, concurrent duplicates are rejected, and a retry whose payload
/// fingerprint differs from the committed one is refused as a possible
/// replay attack. Every path reports to the configured audit sink.
///
/// The engine is cheap to share: clone the `Arc` it lives in and call
/// [`execute`](Self::execute) from as many tasks as needed. Multiple
/// engines may share a store provided their key prefixes do not collide.
pub struct IdempotencyEngine {
    store: Arc<dyn IdempotencyStore>,
    config: EngineConfig,
}

impl std::fmt::Debug for IdempotencyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyEngine")
            .field("lock_ttl", &self.config.lock_ttl)
            .field("retention", &self.config.retention)
            .field("fingerprint_algorithm", &self.config.fingerprint_algorithm)
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}

impl IdempotencyEngine {
    /// Create an engine over a store.
    ///
    /// Fails synchronously if the configuration violates the numeric
    /// bounds (lock TTL within 50 ms..300 s, retention at least 24 h).
    pub fn new(
        store: Arc<dyn IdempotencyStore>,
        config: EngineConfig,
    ) -> Result<Self, IdempotencyError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fingerprint a payload with the configured algorithm.
    pub fn fingerprint<T: Serialize>(&self, payload: &T) -> Result<String, FingerprintError> {
        idemgate_fingerprint::fingerprint_with(payload, self.config.fingerprint_algorithm)
    }

    /// Execute `handler` at most once for `(key, fingerprint)`.
    ///
    /// Returns the handler's result — freshly produced or memoized from a
    /// previous commit. The handler is raced against the call's timeout;
    /// if the timer wins, the handler future is dropped (tokio's
    /// cancellation) and the call fails with
    /// [`IdempotencyError::HandlerTimeout`].
    ///
    /// Audit ordering within one call: `acquired` → {`stored` | `timeout`
    /// | `error`} → `lock_released`, or exactly one of `hit`, `locked`,
    /// `fingerprint_mismatch` on the cache path.
    pub async fn execute<F, Fut>(
        &self,
        key: &str,
        fingerprint: &str,
        handler: F,
        options: ExecuteOptions,
    ) -> Result<Value, IdempotencyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, BoxError>> + Send,
    {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(IdempotencyError::invalid_key(
                "key must be a non-empty string",
            ));
        }

        let handler_timeout = options.handler_timeout.unwrap_or(DEFAULT_HANDLER_TIMEOUT);
        check_duration(
            "handler_timeout",
            handler_timeout,
            MIN_HANDLER_TIMEOUT,
            MAX_HANDLER_TIMEOUT,
        )?;
        let retention = match options.retention_override {
            Some(retention) => {
                check_retention(retention)?;
                retention
            }
            None => self.config.retention,
        };

        let full_key = format!("{}{}", self.config.key_prefix, trimmed);
        let sink = options
            .on_audit
            .unwrap_or_else(|| self.config.audit_sink.clone());
        let audit = AuditDispatcher::new(
            sink,
            self.store.clone(),
            full_key.clone(),
            fingerprint.to_string(),
            options.metadata,
        );

        let outcome = self
            .store
            .check_and_lock(&full_key, fingerprint, self.config.lock_ttl)
            .await?;

        match outcome {
            CheckAndLock::Exists {
                fingerprint: stored,
                result,
                ..
            } => {
                if stored == fingerprint {
                    debug!(key = %full_key, "idempotent replay, returning memoized result");
                    audit.emit(AuditAction::Hit).await;
                    Ok(result)
                } else {
                    warn!(key = %full_key, "fingerprint mismatch, possible replay attack");
                    audit.emit_mismatch(&stored).await;
                    Err(IdempotencyError::FingerprintMismatch {
                        key: full_key,
                        stored_fingerprint: stored,
                    })
                }
            }
            CheckAndLock::Locked => {
                audit.emit(AuditAction::Locked).await;
                Err(IdempotencyError::OperationInProgress { key: full_key })
            }
            CheckAndLock::Acquired => {
                debug!(key = %full_key, "lock acquired, running handler");
                audit.emit(AuditAction::Acquired).await;

                let outcome = self
                    .run_and_commit(
                        &full_key,
                        fingerprint,
                        handler,
                        handler_timeout,
                        retention,
                        &audit,
                    )
                    .await;

                // Best-effort: TTL expiry reclaims the lock if this fails
                // or the adapter does not implement release.
                self.store.release_lock(&full_key).await;
                audit.emit(AuditAction::LockReleased).await;

                outcome
            }
        }
    }

    async fn run_and_commit<F, Fut>(
        &self,
        full_key: &str,
        fingerprint: &str,
        handler: F,
        handler_timeout: Duration,
        retention: Duration,
        audit: &AuditDispatcher,
    ) -> Result<Value, IdempotencyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, BoxError>> + Send,
    {
        match tokio::time::timeout(handler_timeout, handler()).await {
            Err(_elapsed) => {
                let err = IdempotencyError::HandlerTimeout {
                    key: full_key.to_string(),
                    timeout_ms: handler_timeout.as_millis() as u64,
                };
                audit
                    .emit_failure(AuditAction::Timeout, err.code(), &err.to_string())
                    .await;
                Err(err)
            }
            Ok(Err(cause)) => {
                audit
                    .emit_failure(AuditAction::Error, "HANDLER_ERROR", &cause.to_string())
                    .await;
                Err(IdempotencyError::handler(cause))
            }
            Ok(Ok(result)) => {
                match self
                    .store
                    .commit_result(full_key, fingerprint, &result, retention)
                    .await
                {
                    Ok(()) => {
                        audit.emit(AuditAction::Stored).await;
                        Ok(result)
                    }
                    Err(store_err) => {
                        audit
                            .emit_failure(
                                AuditAction::Error,
                                "STORE_ERROR",
                                &store_err.to_string(),
                            )
                            .await;
                        Err(IdempotencyError::Store(store_err))
                    }
                }
            }
        }
    }
}
