//! Name-based metadata redaction
//!
//! Removes metadata keys whose names suggest sensitive content before an
//! audit event is emitted. Matching is substring and case-insensitive.
//! The check is name-based only: sensitive values hidden under innocuous
//! key names are not detected, which is a documented limitation.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SENSITIVE_KEY: Regex = Regex::new(
        r"(?i)(password|token|secret|card|cvv|pin|ssn|full.?name|email|phone)"
    )
    .expect("sensitive-key pattern is valid");
}

/// Whether a metadata key name matches a sensitive pattern.
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY.is_match(key)
}

/// Copy a metadata mapping, dropping every sensitive key.
pub fn redact_metadata(
    metadata: &HashMap<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    metadata
        .iter()
        .filter(|(key, _)| !is_sensitive_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_every_pattern_family() {
        for key in [
            "password",
            "userToken",
            "client_secret",
            "cardNumber",
            "cvv",
            "pin_code",
            "ssn",
            "fullName",
            "full_name",
            "fullname",
            "email",
            "phoneNumber",
        ] {
            assert!(is_sensitive_key(key), "expected {key} to be redacted");
        }
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert!(is_sensitive_key("CUSTOMER_EMAIL_ADDRESS"));
        assert!(is_sensitive_key("x-api-TOKEN"));
        assert!(is_sensitive_key("creditCardLast4"));
    }

    #[test]
    fn innocuous_keys_survive() {
        for key in ["order_id", "amount", "currency", "retry_count", "pinned"] {
            // "pinned" contains "pin"; substring matching intentionally
            // over-redacts, so it does NOT survive.
            if key == "pinned" {
                assert!(is_sensitive_key(key));
            } else {
                assert!(!is_sensitive_key(key), "expected {key} to survive");
            }
        }
    }

    #[test]
    fn redact_drops_only_sensitive_entries() {
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), json!("ord-1"));
        metadata.insert("card_number".to_string(), json!("4111111111111111"));
        metadata.insert("customerEmail".to_string(), json!("a@example.com"));
        metadata.insert("amount".to_string(), json!(100));

        let redacted = redact_metadata(&metadata);
        assert_eq!(redacted.len(), 2);
        assert!(redacted.contains_key("order_id"));
        assert!(redacted.contains_key("amount"));
    }

    #[test]
    fn full_name_variants_are_caught() {
        assert!(is_sensitive_key("fullname"));
        assert!(is_sensitive_key("full_name"));
        assert!(is_sensitive_key("full-name"));
        assert!(is_sensitive_key("fullName"));
    }

    #[test]
    fn empty_metadata_stays_empty() {
        let redacted = redact_metadata(&HashMap::new());
        assert!(redacted.is_empty());
    }
}
