//! Idemgate core
//!
//! Shared foundation for the idemgate workspace: the compliance audit
//! event model, the sink contract with reference sinks, and name-based
//! metadata redaction.
//!
//! ## Components
//!
//! - **Events**: [`AuditEvent`] and the [`AuditAction`] vocabulary
//! - **Sinks**: [`AuditSink`] contract, [`MemoryAuditSink`] for tests,
//!   [`FileAuditSink`] for append-only JSON-lines deployments
//! - **Redaction**: [`redact_metadata`] strips sensitive metadata keys
//!   before any event leaves the engine

pub mod error;
pub mod event;
pub mod redact;
pub mod sink;

pub use error::AuditSinkError;
pub use event::{AuditAction, AuditEvent};
pub use redact::{is_sensitive_key, redact_metadata};
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink};
