//! Idemgate store layer
//!
//! The atomic persistence contract idempotency keys live behind, the
//! reference wire record model, and an in-memory adapter for development
//! and testing.
//!
//! A key is in exactly one of three states as observed atomically by
//! [`IdempotencyStore::check_and_lock`]: absent, processing, or
//! committed. Adapters own persistence and expiry; the engine owns the
//! lifecycle driven through this contract.

pub mod contract;
pub mod memory;
pub mod record;

pub use contract::{CheckAndLock, IdempotencyStore, StoreError, StoreResult};
pub use memory::MemoryIdempotencyStore;
pub use record::KeyRecord;
