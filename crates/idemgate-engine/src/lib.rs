//! Idemgate engine
//!
//! At-most-once execution for financial and regulated workloads. A
//! client-supplied idempotency key plus a canonical payload fingerprint
//! guarantee that a wrapped operation runs at most once across
//! arbitrarily many retries: duplicates receive the memoized result,
//! concurrent duplicates are rejected, and a retry with a tampered
//! payload is refused and audited as a security event.
//!
//! ```no_run
//! use idemgate_engine::{EngineConfig, ExecuteOptions, IdempotencyEngine, MemoryAuditSink};
//! use idemgate_store::MemoryIdempotencyStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryIdempotencyStore::new());
//! let sink = Arc::new(MemoryAuditSink::new());
//! let engine = IdempotencyEngine::new(store, EngineConfig::new(sink))?;
//!
//! let payload = json!({"amount": 100, "currency": "USD"});
//! let fingerprint = engine.fingerprint(&payload)?;
//! let result = engine
//!     .execute(
//!         "payment:ord-42",
//!         &fingerprint,
//!         || async { Ok(json!({"charged": true})) },
//!         ExecuteOptions::new(),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod dispatch;
pub mod engine;
pub mod error;
pub mod options;

pub use config::{
    EngineConfig, DEFAULT_HANDLER_TIMEOUT, DEFAULT_LOCK_TTL, DEFAULT_RETENTION,
    MAX_HANDLER_TIMEOUT, MAX_LOCK_TTL, MIN_HANDLER_TIMEOUT, MIN_LOCK_TTL, MIN_RETENTION,
};
pub use engine::IdempotencyEngine;
pub use error::{BoxError, IdempotencyError};
pub use options::ExecuteOptions;

pub use idemgate_core::{
    AuditAction, AuditEvent, AuditSink, AuditSinkError, FileAuditSink, MemoryAuditSink,
};
pub use idemgate_fingerprint::{fingerprint, fingerprint_with, FingerprintAlgorithm};
pub use idemgate_store::{CheckAndLock, IdempotencyStore, KeyRecord, StoreError};
