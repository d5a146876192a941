//! JSON argument decoding and the forgiving repairs applied to model output.
//!
//! ```rust
//! use etooling::{parse_json_object, repair_json, split_string_to_list};
//!
//! let repaired = repair_json(r#"{"query": "rust", }"#);
//! let args = parse_json_object(&repaired).expect("repaired object should parse");
//! assert_eq!(args["query"], "rust");
//!
//! assert_eq!(split_string_to_list("John, Doe"), serde_json::json!(["John", "Doe"]));
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::json_decode(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    into_object(parse_json_value(args_json)?)
}

pub(crate) fn into_object(value: Value) -> Result<Map<String, Value>, ToolError> {
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

/// Drops a trailing comma right before a closing brace.
pub fn repair_json(raw: &str) -> String {
    raw.replace(", }", "}").replace(",}", "}")
}

/// Reads a string that should have been a list. JSON text wins, otherwise comma separated.
pub fn split_string_to_list(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Value::Array(items),
        _ => Value::Array(
            text.split(',')
                .map(|piece| Value::String(piece.trim().to_string()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn parse_invalid_json_returns_json_decode() {
        let error = parse_json_value("{").expect_err("json should fail");
        assert_eq!(error.kind, ToolErrorKind::JsonDecode);
    }

    #[test]
    fn non_object_arguments_are_invalid() {
        let error = parse_json_object("[1, 2]").expect_err("array should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert_eq!(error.message, "expected JSON object arguments");
    }

    #[test]
    fn repair_handles_both_trailing_comma_spellings() {
        assert_eq!(repair_json(r#"{"a": 1, }"#), r#"{"a": 1}"#);
        assert_eq!(repair_json(r#"{"a": 1,}"#), r#"{"a": 1}"#);
        assert_eq!(repair_json(r#"{"a": [1, 2]}"#), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn list_strings_prefer_json_then_commas() {
        assert_eq!(split_string_to_list(r#"["John", "Doe"]"#), json!(["John", "Doe"]));
        assert_eq!(split_string_to_list("John,  Doe "), json!(["John", "Doe"]));
        assert_eq!(split_string_to_list("solo"), json!(["solo"]));
    }
}
