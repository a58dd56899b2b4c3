//! # Model Output JSON Recovery
//!
//! Chat models wrap their JSON in prose or markdown fences more often than not.
//! These helpers pull out the first balanced object and normalise the values
//! found inside it.

use crate::errors::PromptError;
use crate::types::FieldMap;
use serde_json::{Map, Value};

/// Returns the first balanced `{...}` block in `text`, if any.
///
/// Braces inside JSON string literals do not count towards the balance.
pub fn extract_first_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses model output as JSON, preferring its first balanced object block.
pub fn parse_model_json(output: &str) -> Result<Value, PromptError> {
    let candidate = extract_first_json_block(output).unwrap_or(output);
    Ok(serde_json::from_str(candidate.trim())?)
}

/// Parses model output that must be a JSON object.
pub fn parse_model_object(output: &str) -> Result<Map<String, Value>, PromptError> {
    match parse_model_json(output)? {
        Value::Object(map) => Ok(map),
        other => Err(PromptError::UnexpectedOutput(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Converts any JSON value into the string written into the template.
///
/// `null` becomes empty; strings are kept verbatim; everything else uses its JSON text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads `object[key]` as a string map, treating a missing or non-object entry as empty.
pub fn string_map(object: &Map<String, Value>, key: &str) -> FieldMap {
    object
        .get(key)
        .and_then(Value::as_object)
        .map(|inner| {
            inner
                .iter()
                .map(|(k, v)| (k.clone(), value_to_text(v)))
                .collect()
        })
        .unwrap_or_default()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_block_from_fenced_output() {
        let output = "Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nDone.";
        assert_eq!(extract_first_json_block(output), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_block_ignores_braces_in_strings() {
        let output = r#"{"note": "use } carefully \" {", "x": 1} trailing }"#;
        assert_eq!(
            extract_first_json_block(output),
            Some(r#"{"note": "use } carefully \" {", "x": 1}"#)
        );
    }

    #[test]
    fn test_extract_block_none_when_missing_or_unbalanced() {
        assert_eq!(extract_first_json_block("no json here"), None);
        assert_eq!(extract_first_json_block("{\"open\": {"), None);
    }

    #[test]
    fn test_parse_model_json_falls_back_to_whole_output() {
        assert_eq!(parse_model_json(" [1, 2] ").unwrap(), json!([1, 2]));
        assert!(parse_model_json("not json").is_err());
    }

    #[test]
    fn test_parse_model_object_rejects_arrays() {
        let err = parse_model_object("[1]").unwrap_err();
        assert!(matches!(err, PromptError::UnexpectedOutput(_)));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&Value::Null), "");
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(12.5)), "12.5");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn test_string_map_tolerates_wrong_shapes() {
        let object = json!({"mapping": {"A": "1", "B": null}, "status": "oops"});
        let object = object.as_object().unwrap();
        let mapping = string_map(object, "mapping");
        assert_eq!(mapping.get("A").map(String::as_str), Some("1"));
        assert_eq!(mapping.get("B").map(String::as_str), Some(""));
        assert!(string_map(object, "status").is_empty());
        assert!(string_map(object, "absent").is_empty());
    }
}
