//! Canonical JSON encoding
//!
//! Object keys sorted, no insignificant whitespace. Two equal values always
//! encode to identical bytes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CodecResult;

/// Rebuild `value` with every object's keys in sorted order
#[must_use]
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Encode any serializable value as canonical JSON text
///
/// # Errors
/// Returns [`crate::CodecError::Json`] if `value` cannot be represented as JSON
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> CodecResult<String> {
    let value = canonicalize(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_sorted_recursively() {
        let value = json!({"b": 1, "a": {"z": [ {"y": 1, "x": 2} ], "c": null}});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"a":{"c":null,"z":[{"x":2,"y":1}]},"b":1}"#
        );
    }

    #[test]
    fn struct_field_order_does_not_leak() {
        #[derive(Serialize)]
        struct Unsorted {
            zeta: u8,
            alpha: u8,
        }
        assert_eq!(
            to_canonical_string(&Unsorted { zeta: 1, alpha: 2 }).unwrap(),
            r#"{"alpha":2,"zeta":1}"#
        );
    }

    #[test]
    fn arrays_keep_order() {
        assert_eq!(to_canonical_string(&json!([3, 1, 2])).unwrap(), "[3,1,2]");
    }
}
