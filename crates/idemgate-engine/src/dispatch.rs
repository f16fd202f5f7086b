//! Audit dispatch
//!
//! Builds every event an `execute` call emits: stamps the timestamp,
//! merges per-call metadata with failure tags, redacts sensitive keys,
//! then invokes the active sink and the store's audit persistence. Sink
//! and store failures are swallowed here; monitoring them is the
//! deployer's responsibility.

use idemgate_core::{redact_metadata, AuditAction, AuditEvent, AuditSink};
use idemgate_store::IdempotencyStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub(crate) struct AuditDispatcher {
    sink: Arc<dyn AuditSink>,
    store: Arc<dyn IdempotencyStore>,
    key: String,
    fingerprint: String,
    metadata: HashMap<String, Value>,
}

impl AuditDispatcher {
    pub(crate) fn new(
        sink: Arc<dyn AuditSink>,
        store: Arc<dyn IdempotencyStore>,
        key: String,
        fingerprint: String,
        metadata: HashMap<String, Value>,
    ) -> Self {
        Self {
            sink,
            store,
            key,
            fingerprint,
            metadata,
        }
    }

    pub(crate) async fn emit(&self, action: AuditAction) {
        self.emit_event(action, None, &[]).await;
    }

    pub(crate) async fn emit_mismatch(&self, stored_fingerprint: &str) {
        self.emit_event(AuditAction::FingerprintMismatch, Some(stored_fingerprint), &[])
            .await;
    }

    /// `error` / `timeout` events carry the failure tags in metadata.
    pub(crate) async fn emit_failure(&self, action: AuditAction, code: &str, message: &str) {
        let tags = [
            ("error_code".to_string(), Value::from(code)),
            ("error_message".to_string(), Value::from(message)),
        ];
        self.emit_event(action, None, &tags).await;
    }

    async fn emit_event(
        &self,
        action: AuditAction,
        stored_fingerprint: Option<&str>,
        extra: &[(String, Value)],
    ) {
        let mut metadata = self.metadata.clone();
        metadata.extend(extra.iter().cloned());

        let mut event = AuditEvent::new(self.key.clone(), action)
            .with_fingerprint(self.fingerprint.clone())
            .with_metadata(redact_metadata(&metadata));
        if let Some(stored) = stored_fingerprint {
            event = event.with_stored_fingerprint(stored);
        }

        if let Err(e) = self.sink.record(&event).await {
            warn!(key = %self.key, action = %action, error = %e, "audit sink failure swallowed");
        }
        self.store.record_audit(&event).await;
    }
}
