use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the payload's canonical JSON form.
///
/// Object keys are sorted recursively before hashing, so two payloads that
/// differ only in field order produce the same fingerprint. Array order is
/// significant.
pub fn fingerprint<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(payload)?;
    let canonical = serde_json::to_vec(&canonicalize(value))?;
    let digest = Sha256::digest(&canonical);
    Ok(hex::encode(digest))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            // serde_json's BTreeMap-backed Map iterates in key order once
            // rebuilt from sorted entries.
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stable_under_field_reordering() {
        let a = json!({"keyword": "mouse", "from": 0, "size": 10});
        let b = json!({"size": 10, "from": 0, "keyword": "mouse"});
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let a = json!({"outer": {"b": 1, "a": 2}});
        let b = json!({"outer": {"a": 2, "b": 1}});
        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_distinct_payloads_differ() {
        let a = json!({"keyword": "mouse"});
        let b = json!({"keyword": "keyboard"});
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = json!({"ids": [1, 2, 3]});
        let b = json!({"ids": [3, 2, 1]});
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_output_is_hex_sha256() {
        let fp = fingerprint(&json!({"x": 1})).unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
