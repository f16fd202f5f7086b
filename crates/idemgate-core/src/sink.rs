//! Audit sinks

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Trait for audit sinks.
///
/// Sinks must be reentrant under concurrent calls; the engine may invoke
/// `record` from many in-flight executions at once. Failures are reported
/// through the `Result` and swallowed by the engine's dispatcher; a
/// panicking sink is outside the contract.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one audit event.
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError>;
}

/// In-memory audit sink for testing and short-lived tooling.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Create a new memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, in emission order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Action tags of all recorded events, in emission order.
    pub fn actions(&self) -> Vec<&'static str> {
        self.events.read().iter().map(|e| e.action.as_str()).collect()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        self.events.write().push(event.clone());
        Ok(())
    }
}

/// File-based audit sink with append-only JSON-lines writes.
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Create a new file sink, creating parent directories if needed.
    pub async fn new(path: PathBuf) -> Result<Self, AuditSinkError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read all events back from the file.
    pub async fn read_all(&self) -> Result<Vec<AuditEvent>, AuditSinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut events = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: AuditEvent = serde_json::from_str(&line)?;
            events.push(event);
        }

        Ok(events)
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), AuditSinkError> {
        let json = serde_json::to_string(event)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }
}
