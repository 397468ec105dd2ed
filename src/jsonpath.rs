//! JSONPath checks for `*Path` fields and payload templates.

use serde_json::{Map, Value};

/// Whether a string is an acceptable JSONPath for an ASL path field.
pub fn is_json_path(s: &str) -> bool {
    s.starts_with("$.")
}

/// Check a `Parameters` / `ResultSelector` / `Result` object.
///
/// Keys ending in `".$"` declare their value to be a JSONPath; the value
/// must then be a `"$."`-prefixed string. Nested objects are checked
/// recursively. On failure, returns the offending key and a description.
pub fn check_payload_template(template: &Map<String, Value>) -> Result<(), (String, String)> {
    for (key, value) in template {
        if key.ends_with(".$") {
            let ok = value.as_str().map(is_json_path).unwrap_or(false);
            if !ok {
                return Err((
                    key.clone(),
                    format!(
                        "key {key:?} indicates its value is a JSONPath, but {value} is not"
                    ),
                ));
            }
        } else if let Value::Object(nested) = value {
            check_payload_template(nested)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_is_json_path() {
        assert!(is_json_path("$.some_path"));
        assert!(is_json_path("$.a.b[0].c"));
        assert!(!is_json_path("some_path"));
        assert!(!is_json_path("$"));
        assert!(!is_json_path(""));
    }

    #[test]
    fn test_payload_template_plain_keys() {
        let t = template(json!({"a": 1, "b": "not_a_path"}));
        assert!(check_payload_template(&t).is_ok());
    }

    #[test]
    fn test_payload_template_path_key() {
        let t = template(json!({"a_json_path.$": "$.a_json_path"}));
        assert!(check_payload_template(&t).is_ok());

        let t = template(json!({"a_json_path.$": "not_a_json_path"}));
        let (key, _) = check_payload_template(&t).unwrap_err();
        assert_eq!(key, "a_json_path.$");
    }

    #[test]
    fn test_payload_template_path_key_non_string() {
        let t = template(json!({"a_json_path.$": 42}));
        assert!(check_payload_template(&t).is_err());
    }

    #[test]
    fn test_payload_template_nested() {
        let t = template(json!({"nested": {"key.$": "not_a_json_path"}}));
        assert!(check_payload_template(&t).is_err());

        let t = template(json!({"nested": {"key.$": "$.ok"}}));
        assert!(check_payload_template(&t).is_ok());
    }
}
