//! Per-call execution options

use idemgate_core::AuditSink;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Options applying to a single [`execute`] call.
///
/// [`execute`]: crate::IdempotencyEngine::execute
#[derive(Clone, Default)]
pub struct ExecuteOptions {
    /// Replace the engine-level audit sink for this call only.
    pub on_audit: Option<Arc<dyn AuditSink>>,
    /// Replace the default handler timeout (validated 50 ms..300 s).
    pub handler_timeout: Option<Duration>,
    /// Replace engine retention for this call's commit (validated ≥ 24 h).
    pub retention_override: Option<Duration>,
    /// Merged into every audit event of this call; redacted before
    /// emission.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.on_audit = Some(sink);
        self
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    pub fn with_retention_override(mut self, retention: Duration) -> Self {
        self.retention_override = Some(retention);
        self
    }

    /// Add one metadata entry.
    pub fn with_metadata_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the metadata mapping.
    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idemgate_core::MemoryAuditSink;

    #[test]
    fn defaults_are_empty() {
        let options = ExecuteOptions::new();
        assert!(options.on_audit.is_none());
        assert!(options.handler_timeout.is_none());
        assert!(options.retention_override.is_none());
        assert!(options.metadata.is_empty());
    }

    #[test]
    fn builders_compose() {
        let options = ExecuteOptions::new()
            .with_on_audit(Arc::new(MemoryAuditSink::new()))
            .with_handler_timeout(Duration::from_millis(100))
            .with_retention_override(Duration::from_millis(86_400_000))
            .with_metadata_entry("order_id", "ord-1");

        assert!(options.on_audit.is_some());
        assert_eq!(options.handler_timeout, Some(Duration::from_millis(100)));
        assert_eq!(options.metadata["order_id"], "ord-1");
    }
}
