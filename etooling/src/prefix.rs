//! Merges a shared prefix record into a function declaration.

use etransport::FunctionSchema;
use serde_json::{Map, Value};

use crate::types::fold_name;
use crate::{Callable, ConfigError, RecordType, SchemaOptions, function_schema, to_strict_json_schema};

pub fn prefix_name(prefix: &RecordType, case_insensitive: bool) -> String {
    fold_name(prefix.name(), case_insensitive)
}

/// Leading part of a merged call name, stripped again on dispatch.
pub fn prefix_marker(prefix_name: &str) -> String {
    format!("{prefix_name}_and_")
}

/// Prepends the prefix record's fields to `schema`. Target properties win on collision.
pub fn insert_prefix(
    prefix: &Callable,
    schema: &FunctionSchema,
    include_prefix_name: bool,
    case_insensitive: bool,
) -> Result<FunctionSchema, ConfigError> {
    let record = prefix
        .as_record()
        .ok_or_else(|| ConfigError::invalid_prefix_type(prefix.name()))?;
    let prefix_parameters = function_schema(
        prefix,
        SchemaOptions::default().with_case_insensitive(case_insensitive),
    )?
    .parameters
    .unwrap_or_default();
    let target_parameters = schema.parameters.clone().unwrap_or_default();

    let mut properties = object_at(&prefix_parameters, "properties");
    for (key, property) in object_at(&target_parameters, "properties") {
        properties.insert(key, property);
    }

    let mut required: Vec<Value> = Vec::new();
    for name in array_at(&prefix_parameters, "required")
        .into_iter()
        .chain(array_at(&target_parameters, "required"))
    {
        if !required.contains(&name) {
            required.push(name);
        }
    }

    let mut definitions = object_at(&prefix_parameters, "$defs");
    definitions.extend(object_at(&target_parameters, "$defs"));

    let mut merged = schema.clone();
    if include_prefix_name {
        merged.name = format!(
            "{}{}",
            prefix_marker(&prefix_name(record, case_insensitive)),
            schema.name
        );
    }

    if properties.is_empty() {
        merged.parameters = None;
        return Ok(merged);
    }

    let mut parameters = target_parameters;
    parameters
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    parameters.insert("properties".to_string(), Value::Object(properties));
    if required.is_empty() {
        parameters.shift_remove("required");
    } else {
        parameters.insert("required".to_string(), Value::Array(required));
    }
    if !definitions.is_empty() {
        parameters.insert("$defs".to_string(), Value::Object(definitions));
    }

    if schema.is_strict() {
        parameters = match to_strict_json_schema(Value::Object(parameters)) {
            Value::Object(parameters) => parameters,
            _ => Map::new(),
        };
    }
    merged.parameters = Some(parameters);
    Ok(merged)
}

fn object_at(parameters: &Map<String, Value>, key: &str) -> Map<String, Value> {
    parameters
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn array_at(parameters: &Map<String, Value>, key: &str) -> Vec<Value> {
    parameters
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::{ConfigErrorKind, Parameter, Signature};

    /// Reasoning the model shares before acting.
    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Thoughts {
        thoughts: String,
        plan: String,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Nothing {}

    fn lookup() -> FunctionSchema {
        let tool = Callable::function(
            Signature::new("lookup")
                .with_doc("Finds a thing")
                .param(Parameter::typed::<String>("query"))
                .param(Parameter::typed::<i64>("plan").describe("overrides the prefix field"))
                .param(Parameter::typed::<i64>("limit").with_default(10)),
            |_args| Ok(()),
        );
        function_schema(&tool, SchemaOptions::default()).expect("schema builds")
    }

    #[test]
    fn prefix_fields_come_first_and_target_wins_collisions() {
        let merged = insert_prefix(&Callable::record::<Thoughts>(), &lookup(), true, false)
            .expect("prefix merges");
        let parameters = merged.parameters.expect("parameters present");

        assert_eq!(merged.name, "Thoughts_and_lookup");
        assert_eq!(merged.description, "Finds a thing");
        let keys: Vec<&str> = parameters["properties"]
            .as_object()
            .expect("properties object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["thoughts", "plan", "query", "limit"]);
        assert_eq!(parameters["properties"]["plan"]["type"], json!("integer"));
        assert_eq!(parameters["required"], json!(["thoughts", "plan", "query"]));
        assert!(!parameters.contains_key("description"));
    }

    #[test]
    fn prefix_name_can_be_left_out_or_folded() {
        let unnamed = insert_prefix(&Callable::record::<Thoughts>(), &lookup(), false, false)
            .expect("prefix merges");
        assert_eq!(unnamed.name, "lookup");

        let folded = insert_prefix(&Callable::record::<Thoughts>(), &lookup(), true, true)
            .expect("prefix merges");
        assert_eq!(folded.name, "thoughts_and_lookup");
    }

    #[test]
    fn no_properties_at_all_drops_parameters() {
        let empty = FunctionSchema::new("noop", "").with_parameters(
            json!({"type": "object", "properties": {}})
                .as_object()
                .cloned()
                .expect("object literal"),
        );
        let merged = insert_prefix(&Callable::record::<Nothing>(), &empty, true, false)
            .expect("prefix merges");

        assert_eq!(merged.name, "Nothing_and_noop");
        assert!(merged.parameters.is_none());
    }

    #[test]
    fn non_record_prefix_is_rejected() {
        let not_a_record = Callable::function(Signature::new("helper"), |_args| Ok(()));
        let error = insert_prefix(&not_a_record, &lookup(), true, false)
            .expect_err("function prefix should fail");
        assert_eq!(error.kind, ConfigErrorKind::InvalidPrefixType);
    }

    #[test]
    fn strict_target_stays_strict_after_merge() {
        let tool = Callable::function(
            Signature::new("lookup").param(Parameter::typed::<String>("query")),
            |_args| Ok(()),
        );
        let strict = function_schema(&tool, SchemaOptions::default().enable_strict())
            .expect("schema builds");
        let merged = insert_prefix(&Callable::record::<Thoughts>(), &strict, true, false)
            .expect("prefix merges");
        let parameters = merged.parameters.expect("parameters present");

        assert_eq!(merged.strict, Some(true));
        assert_eq!(parameters["additionalProperties"], json!(false));
        assert_eq!(parameters["required"], json!(["thoughts", "plan", "query"]));
    }
}
