//! Audit event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Action recorded by an audit event.
///
/// The full vocabulary shared by the engine, sinks, and store adapters.
/// `Miss` is reserved for adapters that distinguish a cold probe; the
/// engine itself reports a cold probe as `Acquired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Committed record found, fingerprint matched, cached result returned.
    Hit,
    /// No record found for the key.
    Miss,
    /// Processing lock installed; the handler is about to run.
    Acquired,
    /// A concurrent holder owns the processing lock.
    Locked,
    /// Committed record found with a different fingerprint.
    FingerprintMismatch,
    /// Handler result committed.
    Stored,
    /// Handler or commit failed after the lock was acquired.
    Error,
    /// Handler did not settle within the timeout.
    Timeout,
    /// Processing lock released (best-effort).
    LockReleased,
}

impl AuditAction {
    /// Stable wire tag for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Hit => "hit",
            AuditAction::Miss => "miss",
            AuditAction::Acquired => "acquired",
            AuditAction::Locked => "locked",
            AuditAction::FingerprintMismatch => "fingerprint_mismatch",
            AuditAction::Stored => "stored",
            AuditAction::Error => "error",
            AuditAction::Timeout => "timeout",
            AuditAction::LockReleased => "lock_released",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable compliance audit record.
///
/// The wire layout is exactly these fields; optional fields are omitted
/// when absent and `metadata` is always post-redaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the engine emitted the event (UTC, RFC 3339 on the wire).
    pub timestamp: DateTime<Utc>,

    /// Full (prefixed) idempotency key.
    pub key: String,

    /// What happened.
    pub action: AuditAction,

    /// Fingerprint supplied by the current call, when one was in scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Fingerprint of the committed record; only on `fingerprint_mismatch`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_fingerprint: Option<String>,

    /// Caller-supplied context, redacted before emission.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    /// Create an event stamped with the current wall clock.
    pub fn new(key: impl Into<String>, action: AuditAction) -> Self {
        Self {
            timestamp: Utc::now(),
            key: key.into(),
            action,
            fingerprint: None,
            stored_fingerprint: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the current call's fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Set the committed record's fingerprint (mismatch events only).
    pub fn with_stored_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.stored_fingerprint = Some(fingerprint.into());
        self
    }

    /// Replace the metadata mapping.
    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}
