//! Typed records: serde structs that double as zero-method constructor tools.

use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

use schemars::generate::SchemaSettings;
use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::reflect::CoerceFn;
use crate::{DefaultValue, FieldSpec, TypeDescriptor};

type RootSchemaFn = fn() -> Schema;

fn root_schema<T: JsonSchema>() -> Schema {
    SchemaSettings::draft2020_12()
        .into_generator()
        .into_root_schema_for::<T>()
}

fn construct<T: Serialize + DeserializeOwned>(value: Value) -> Result<Value, serde_json::Error> {
    let record: T = serde_json::from_value(value)?;
    serde_json::to_value(record)
}

#[derive(Clone)]
pub struct RecordType {
    name: Cow<'static, str>,
    root_schema: RootSchemaFn,
    construct: CoerceFn,
}

impl RecordType {
    pub fn of<T>() -> Self
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        Self {
            name: T::schema_name(),
            root_schema: root_schema::<T>,
            construct: construct::<T>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The record's JSON schema with nested records under `$defs`.
    pub fn json_schema(&self) -> Map<String, Value> {
        let mut schema = match (self.root_schema)().to_value() {
            Value::Object(schema) => schema,
            _ => Map::new(),
        };
        schema.shift_remove("$schema");
        if schema.get("type").and_then(Value::as_str) == Some("object") {
            schema
                .entry("properties")
                .or_insert_with(|| Value::Object(Map::new()));
        }
        schema
    }

    /// Doc comment of the record, if it has one.
    pub fn description(&self) -> Option<String> {
        self.json_schema()
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        let schema = self.json_schema();
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };

        properties
            .iter()
            .map(|(name, property)| FieldSpec {
                name: name.clone(),
                declared_type: TypeDescriptor::from_schema(name.clone(), property.clone()),
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                default: if required.contains(&name.as_str()) {
                    DefaultValue::Missing
                } else {
                    DefaultValue::Value(property.get("default").cloned().unwrap_or(Value::Null))
                },
            })
            .collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.json_schema()
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|properties| properties.contains_key(name))
    }

    /// Validates `fields` as an instance of the record and returns the normalized instance.
    pub fn construct(&self, fields: Map<String, Value>) -> Result<Value, serde_json::Error> {
        (self.construct)(Value::Object(fields))
    }
}

impl Debug for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}
