//! In-memory store adapter
//!
//! Reference implementation of the contract for development and testing.
//! Entries are kept as raw JSON text with an expiry deadline, the way a
//! Redis value with a PX expiry would be, so the corrupt-record clause of
//! the contract is a real code path here. Expiry is evaluated lazily at
//! probe time; [`MemoryIdempotencyStore::purge_expired`] sweeps eagerly.

use crate::contract::{CheckAndLock, IdempotencyStore, StoreResult};
use crate::record::KeyRecord;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use idemgate_core::AuditEvent;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct RawEntry {
    json: String,
    expires_at: DateTime<Utc>,
}

impl RawEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn deadline(now: DateTime<Utc>, after: Duration) -> DateTime<Utc> {
    now + ChronoDuration::milliseconds(after.as_millis() as i64)
}

/// In-memory idempotency store for development and testing.
#[derive(Debug, Default)]
pub struct MemoryIdempotencyStore {
    entries: RwLock<HashMap<String, RawEntry>>,
    audit_log: RwLock<Vec<AuditEvent>>,
}

impl MemoryIdempotencyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the persisted audit log.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_log.read().await.clone()
    }

    /// Parsed record for a key, if one is live.
    pub async fn get_record(&self, key: &str) -> Option<KeyRecord> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_expired(Utc::now()) {
            return None;
        }
        serde_json::from_str(&entry.json).ok()
    }

    /// Number of entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop all entries and the audit log.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.audit_log.write().await.clear();
    }

    /// Eagerly remove expired entries. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Install a raw entry verbatim, bypassing the record model.
    ///
    /// Primarily a test hook for exercising the corrupt-record path.
    pub async fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>, ttl: Duration) {
        let now = Utc::now();
        self.entries.write().await.insert(
            key.into(),
            RawEntry {
                json: json.into(),
                expires_at: deadline(now, ttl),
            },
        );
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn check_and_lock(
        &self,
        key: &str,
        _fingerprint: &str,
        lock_ttl: Duration,
    ) -> StoreResult<CheckAndLock> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(now) {
                // Corrupt entries fall through and are overwritten below.
                match serde_json::from_str::<KeyRecord>(&entry.json) {
                    Ok(KeyRecord::Processing { .. }) => return Ok(CheckAndLock::Locked),
                    Ok(KeyRecord::Committed {
                        fingerprint,
                        result,
                        created_at,
                    }) => {
                        return Ok(CheckAndLock::Exists {
                            fingerprint,
                            result,
                            created_at,
                        })
                    }
                    Err(_) => {}
                }
            }
        }

        let record = KeyRecord::processing(now);
        entries.insert(
            key.to_string(),
            RawEntry {
                json: serde_json::to_string(&record)?,
                expires_at: deadline(now, lock_ttl),
            },
        );
        Ok(CheckAndLock::Acquired)
    }

    async fn commit_result(
        &self,
        key: &str,
        fingerprint: &str,
        result: &Value,
        retention: Duration,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let holds_lock = entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| serde_json::from_str::<KeyRecord>(&entry.json).ok())
            .is_some_and(|record| record.is_processing());
        if !holds_lock {
            return Err(crate::contract::StoreError::lock_not_held(key));
        }

        let record = KeyRecord::committed(fingerprint, result.clone(), now);
        entries.insert(
            key.to_string(),
            RawEntry {
                json: serde_json::to_string(&record)?,
                expires_at: deadline(now, retention),
            },
        );
        Ok(())
    }

    async fn release_lock(&self, key: &str) {
        let mut entries = self.entries.write().await;
        let is_processing = entries
            .get(key)
            .and_then(|entry| serde_json::from_str::<KeyRecord>(&entry.json).ok())
            .is_some_and(|record| record.is_processing());
        if is_processing {
            entries.remove(key);
        }
    }

    async fn record_audit(&self, event: &AuditEvent) {
        self.audit_log.write().await.push(event.clone());
    }
}
