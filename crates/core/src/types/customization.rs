//! Canonical identity for product customizations.
//!
//! Two customized cart lines are the same line only when their chosen
//! options are structurally identical. Options arrive as arbitrary JSON
//! documents from the 3D configurator, so identity is computed over a
//! canonical encoding: object keys sorted, arrays kept in order, no
//! whitespace. The canonical text is hashed with SHA-256.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical signature of a set of customization options.
///
/// ```
/// use serde_json::json;
/// use shapeshop_core::CustomizationSignature;
///
/// let a = CustomizationSignature::from_options(&json!({"color": "red", "text": "Hi"}));
/// let b = CustomizationSignature::from_options(&json!({"text": "Hi", "color": "red"}));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomizationSignature(String);

impl CustomizationSignature {
    /// Compute the signature of an options document.
    #[must_use]
    pub fn from_options(options: &Value) -> Self {
        let mut canonical = String::new();
        write_canonical(options, &mut canonical);

        Self(format!("{:x}", Sha256::digest(canonical.as_bytes())))
    }

    /// Returns the signature as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomizationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append the canonical encoding of `value` to `out`.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical(value: &Value) -> String {
        let mut out = String::new();
        write_canonical(value, &mut out);
        out
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "a": [2, {"y": true, "x": null}]}, "a": "s"});
        assert_eq!(
            canonical(&value),
            r#"{"a":"s","b":{"a":[2,{"x":null,"y":true}],"z":1}}"#
        );
    }

    #[test]
    fn test_canonical_escapes_strings() {
        assert_eq!(canonical(&json!({"q\"k": "line\nbreak"})), r#"{"q\"k":"line\nbreak"}"#);
    }

    #[test]
    fn test_signature_ignores_key_order() {
        let a = CustomizationSignature::from_options(&json!({"color": "red", "size": {"w": 2, "h": 3}}));
        let b = CustomizationSignature::from_options(&json!({"size": {"h": 3, "w": 2}, "color": "red"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_distinguishes_values() {
        let red = CustomizationSignature::from_options(&json!({"color": "red"}));
        let blue = CustomizationSignature::from_options(&json!({"color": "blue"}));
        assert_ne!(red, blue);
    }

    #[test]
    fn test_signature_array_order_matters() {
        let a = CustomizationSignature::from_options(&json!({"layers": [1, 2]}));
        let b = CustomizationSignature::from_options(&json!({"layers": [2, 1]}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_signature_is_sha256_hex() {
        let sig = CustomizationSignature::from_options(&json!({}));
        assert_eq!(
            sig.as_str(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
