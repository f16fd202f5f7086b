//! Persisted key record model
//!
//! The reference wire layout is Redis-style JSON:
//!
//! ```text
//! { "status": "processing", "lockAcquiredAt": <iso8601> }
//! { "status": "committed",  "fingerprint": <hex>, "result": <opaque>, "createdAt": <iso8601> }
//! ```
//!
//! Adapters may use any on-wire representation that implements the
//! contract; `KeyRecord` serializes to the reference layout directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The persisted state for one idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyRecord {
    /// A handler is (or was, until the lock TTL lapses) in flight.
    #[serde(rename_all = "camelCase")]
    Processing {
        /// When the lock was installed.
        lock_acquired_at: DateTime<Utc>,
    },

    /// The handler completed and its result is memoized.
    #[serde(rename_all = "camelCase")]
    Committed {
        /// Fingerprint of the payload the result was produced for.
        fingerprint: String,
        /// Opaque memoized result, returned as-is on replay.
        result: Value,
        /// When the commit happened; the record expires at
        /// `created_at + retention`.
        created_at: DateTime<Utc>,
    },
}

impl KeyRecord {
    /// A fresh processing record locked now.
    pub fn processing(lock_acquired_at: DateTime<Utc>) -> Self {
        KeyRecord::Processing { lock_acquired_at }
    }

    /// A fresh committed record created now.
    pub fn committed(fingerprint: impl Into<String>, result: Value, created_at: DateTime<Utc>) -> Self {
        KeyRecord::Committed {
            fingerprint: fingerprint.into(),
            result,
            created_at,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, KeyRecord::Processing { .. })
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, KeyRecord::Committed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn processing_wire_layout() {
        let at = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = KeyRecord::processing(at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["lockAcquiredAt"], "2026-03-01T12:00:00Z");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn committed_wire_layout() {
        let at = "2026-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = KeyRecord::committed("ab".repeat(32), json!({"ok": true}), at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "committed");
        assert_eq!(json["fingerprint"], "ab".repeat(32));
        assert_eq!(json["result"], json!({"ok": true}));
        assert_eq!(json["createdAt"], "2026-03-01T12:00:00Z");
    }

    #[test]
    fn parses_reference_layout() {
        let record: KeyRecord = serde_json::from_str(
            r#"{"status":"processing","lockAcquiredAt":"2026-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(record.is_processing());

        let record: KeyRecord = serde_json::from_str(
            r#"{"status":"committed","fingerprint":"cafe","result":42,"createdAt":"2026-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(record.is_committed());
    }

    #[test]
    fn rejects_unknown_status() {
        let result = serde_json::from_str::<KeyRecord>(r#"{"status":"pending"}"#);
        assert!(result.is_err());
    }
}
