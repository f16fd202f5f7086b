//! Canonical payload fingerprinting
//!
//! Produces a deterministic hex digest of an arbitrary structured payload.
//! Two payloads that differ only in mapping-key insertion order hash to the
//! same fingerprint; array order is significant. The committed fingerprint
//! is what lets the engine distinguish a legitimate retry from a replay
//! with a tampered payload.
//!
//! Volatile fields (wall-clock timestamps, per-request nonces) must be
//! excluded by the caller; payloads are hashed as given.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fingerprinting failures.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Algorithm name not provided by this build.
    #[error("unknown fingerprint algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// Payload could not be serialized into a canonical tree.
    #[error("payload serialization failed: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for FingerprintError {
    fn from(e: serde_json::Error) -> Self {
        FingerprintError::Serialization {
            message: e.to_string(),
        }
    }
}

/// Hash algorithm used for fingerprints.
///
/// The SHA-2 family; `Sha256` is the default and the wire name is the
/// lowercase form (`"sha256"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl FingerprintAlgorithm {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintAlgorithm::Sha256 => "sha256",
            FingerprintAlgorithm::Sha384 => "sha384",
            FingerprintAlgorithm::Sha512 => "sha512",
        }
    }

    /// Hex digest length for this algorithm.
    pub fn digest_hex_len(&self) -> usize {
        match self {
            FingerprintAlgorithm::Sha256 => 64,
            FingerprintAlgorithm::Sha384 => 96,
            FingerprintAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerprintAlgorithm {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(FingerprintAlgorithm::Sha256),
            "sha384" => Ok(FingerprintAlgorithm::Sha384),
            "sha512" => Ok(FingerprintAlgorithm::Sha512),
            other => Err(FingerprintError::UnknownAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

/// Rebuild a JSON tree with every mapping's keys in lexicographic order.
///
/// The sort is byte-wise on the UTF-8 key, so it is locale-agnostic.
/// Arrays keep their element order. The sort is explicit rather than
/// relying on `serde_json`'s map representation, so canonical output does
/// not change if a host build enables `preserve_order`.
fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = serde_json::Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonical_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}

/// Canonical compact-JSON text of a payload.
pub fn canonicalize(payload: &Value) -> Result<String, FingerprintError> {
    Ok(serde_json::to_string(&canonical_value(payload))?)
}

/// Fingerprint a JSON payload with an explicit algorithm.
pub fn fingerprint_value(
    payload: &Value,
    algorithm: FingerprintAlgorithm,
) -> Result<String, FingerprintError> {
    let canonical = canonicalize(payload)?;
    let digest = match algorithm {
        FingerprintAlgorithm::Sha256 => hex::encode(Sha256::digest(canonical.as_bytes())),
        FingerprintAlgorithm::Sha384 => hex::encode(Sha384::digest(canonical.as_bytes())),
        FingerprintAlgorithm::Sha512 => hex::encode(Sha512::digest(canonical.as_bytes())),
    };
    Ok(digest)
}

/// Fingerprint any serializable payload with an explicit algorithm.
pub fn fingerprint_with<T: Serialize>(
    payload: &T,
    algorithm: FingerprintAlgorithm,
) -> Result<String, FingerprintError> {
    let value = serde_json::to_value(payload)?;
    fingerprint_value(&value, algorithm)
}

/// Fingerprint any serializable payload with the default algorithm (SHA-256).
pub fn fingerprint<T: Serialize>(payload: &T) -> Result<String, FingerprintError> {
    fingerprint_with(payload, FingerprintAlgorithm::default())
}
