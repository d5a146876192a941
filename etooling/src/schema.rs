//! Derives function declarations from callables.
//!
//! ```rust
//! use etooling::{Callable, Parameter, SchemaOptions, Signature, function_schema};
//!
//! let tool = Callable::function(
//!     Signature::new("lookup")
//!         .with_doc("  Looks up a word.  ")
//!         .param(Parameter::typed::<String>("word")),
//!     |_args| Ok(()),
//! );
//!
//! let schema = function_schema(&tool, SchemaOptions::default()).expect("schema should build");
//! assert_eq!(schema.name, "lookup");
//! assert_eq!(schema.description, "Looks up a word.");
//! assert_eq!(schema.parameters.as_ref().map(|p| p["required"].clone()), Some(serde_json::json!(["word"])));
//! ```

use etransport::{FunctionSchema, ToolDefinition};
use schemars::generate::SchemaSettings;
use serde_json::{Map, Value};

use crate::types::fold_name;
use crate::{Callable, ConfigError, DefaultValue, FieldSpec, RegisteredCallable, SchemaOptions};

/// Keywords whose value maps names to schemas rather than being a schema itself.
const NAMED_SCHEMA_MAPS: [&str; 4] = ["properties", "$defs", "definitions", "patternProperties"];

/// Keywords whose value is instance data.
const DATA_KEYWORDS: [&str; 4] = ["default", "const", "enum", "examples"];

pub fn tool_name(tool: &RegisteredCallable, case_insensitive: bool) -> String {
    fold_name(tool.name(), case_insensitive)
}

/// Object schema for a parameter list. Nested types land under `$defs`.
pub fn parameters_schema(title: &str, fields: &[FieldSpec]) -> Map<String, Value> {
    let mut generator = SchemaSettings::draft2020_12().into_generator();
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let mut property = match field.declared_type.schema(&mut generator) {
            Value::Object(property) => property,
            // `true` accepts anything
            _ => Map::new(),
        };
        if let Some(description) = &field.description {
            property.insert("description".to_string(), Value::String(description.clone()));
        }
        match &field.default {
            DefaultValue::Missing => required.push(Value::String(field.name.clone())),
            DefaultValue::Value(default) => {
                property.insert("default".to_string(), default.clone());
            }
        }
        properties.insert(field.name.clone(), Value::Object(property));
    }

    let mut schema = Map::new();
    schema.insert("title".to_string(), Value::String(title.to_string()));
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    let definitions = generator.definitions().clone();
    if !definitions.is_empty() {
        schema.insert("$defs".to_string(), Value::Object(definitions));
    }
    schema
}

pub fn function_schema(
    callable: &Callable,
    options: SchemaOptions,
) -> Result<FunctionSchema, ConfigError> {
    let description = callable
        .doc()
        .map(|doc| doc.trim().to_string())
        .unwrap_or_default();

    let parameters = match callable {
        Callable::Function(_) => parameters_schema(callable.name(), &callable.fields()?),
        Callable::Record(record) => {
            let mut schema = record.json_schema();
            schema.shift_remove("description");
            schema
        }
    };

    let schema = FunctionSchema::new(fold_name(callable.name(), options.case_insensitive), description);
    if options.strict {
        let parameters = match to_strict_json_schema(Value::Object(parameters)) {
            Value::Object(parameters) => parameters,
            _ => Map::new(),
        };
        let mut schema = schema.with_parameters(parameters);
        schema.strict = Some(true);
        Ok(schema)
    } else {
        let mut parameters = Value::Object(parameters);
        purge_titles(&mut parameters);
        let parameters = match parameters {
            Value::Object(parameters) => parameters,
            _ => Map::new(),
        };
        Ok(schema.with_parameters(parameters))
    }
}

pub fn schema_for(
    tool: &RegisteredCallable,
    options: SchemaOptions,
) -> Result<FunctionSchema, ConfigError> {
    match tool {
        RegisteredCallable::Plain(callable) => function_schema(callable, options),
        RegisteredCallable::Described(described) => {
            if options.case_insensitive {
                return Err(ConfigError::incompatible_options(format!(
                    "case-insensitive names are not supported for '{}' which carries a precomputed schema",
                    described.schema().name
                )));
            }
            Ok(described.schema().clone())
        }
    }
}

pub fn tool_def(schema: FunctionSchema) -> ToolDefinition {
    ToolDefinition::function(schema)
}

pub fn tool_definitions(
    tools: &[RegisteredCallable],
    options: SchemaOptions,
) -> Result<Vec<ToolDefinition>, ConfigError> {
    tools
        .iter()
        .map(|tool| schema_for(tool, options).map(tool_def))
        .collect()
}

/// Removes `title` from every node that also declares a `type`.
pub fn purge_titles(schema: &mut Value) {
    match schema {
        Value::Object(node) => {
            if node.contains_key("type") {
                node.shift_remove("title");
            }
            for (key, child) in node.iter_mut() {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                if NAMED_SCHEMA_MAPS.contains(&key.as_str()) {
                    if let Value::Object(named) = child {
                        named.values_mut().for_each(purge_titles);
                    }
                    continue;
                }
                purge_titles(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(purge_titles),
        _ => {}
    }
}

/// Closes every object node and marks all of its properties required.
pub fn to_strict_json_schema(schema: Value) -> Value {
    let Value::Object(mut node) = schema else {
        return schema;
    };

    for key in ["$defs", "definitions"] {
        if let Some(Value::Object(definitions)) = node.get_mut(key) {
            for definition in definitions.values_mut() {
                *definition = to_strict_json_schema(definition.take());
            }
        }
    }

    if node.get("type").and_then(Value::as_str) == Some("object")
        && !node.contains_key("additionalProperties")
    {
        node.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    let required = match node.get_mut("properties") {
        Some(Value::Object(properties)) => {
            for property in properties.values_mut() {
                *property = to_strict_json_schema(property.take());
            }
            Some(
                properties
                    .keys()
                    .map(|key| Value::String(key.clone()))
                    .collect(),
            )
        }
        _ => None,
    };
    if let Some(required) = required {
        node.insert("required".to_string(), Value::Array(required));
    }

    if let Some(items) = node.get_mut("items")
        && items.is_object()
    {
        *items = to_strict_json_schema(items.take());
    }

    for key in ["anyOf", "allOf"] {
        if let Some(Value::Array(branches)) = node.get_mut(key) {
            for branch in branches.iter_mut() {
                *branch = to_strict_json_schema(branch.take());
            }
        }
    }

    Value::Object(node)
}
