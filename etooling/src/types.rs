//! Validated arguments, tool outputs, and the option sets that drive schema
//! building and dispatch.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{RecordType, ToolError};

/// Validated field values in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Deserializes one argument. An absent argument reads as `null`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolError> {
        let value = self.values.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| {
            ToolError::invalid_arguments(format!("invalid argument '{name}': {err}"))
        })
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Unit,
    Value(Value),
    /// An instance of a typed record built from the call's arguments.
    Record { name: String, value: Value },
}

impl ToolOutput {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_value(value)
            .map(Self::Value)
            .map_err(|err| ToolError::execution(format!("tool output is not serializable: {err}")))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Unit => None,
            Self::Value(value) | Self::Record { value, .. } => Some(value),
        }
    }

    /// Unit, `null`, `false`, zero, and empty strings or collections.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unit => true,
            Self::Record { .. } => false,
            Self::Value(value) => match value {
                Value::Null => true,
                Value::Bool(flag) => !flag,
                Value::Number(number) => number.as_f64() == Some(0.0),
                Value::String(text) => text.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(fields) => fields.is_empty(),
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Record { name, .. } => format!("`{name}` created"),
            _ if self.is_empty() => String::new(),
            Self::Value(Value::String(text)) => text.clone(),
            Self::Value(value) => value.to_string(),
            Self::Unit => String::new(),
        }
    }
}

impl From<()> for ToolOutput {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for ToolOutput {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<&str> for ToolOutput {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<bool> for ToolOutput {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for ToolOutput {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for ToolOutput {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaOptions {
    pub case_insensitive: bool,
    pub strict: bool,
}

impl SchemaOptions {
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn enable_case_insensitive(self) -> Self {
        self.with_case_insensitive(true)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn enable_strict(self) -> Self {
        self.with_strict(true)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub prefix: Option<RecordType>,
    pub fix_json_args: bool,
    pub case_insensitive: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            fix_json_args: true,
            case_insensitive: false,
        }
    }
}

impl DispatchOptions {
    pub fn with_prefix(mut self, prefix: RecordType) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn with_fix_json_args(mut self, fix_json_args: bool) -> Self {
        self.fix_json_args = fix_json_args;
        self
    }

    pub fn disable_json_fixes(self) -> Self {
        self.with_fix_json_args(false)
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn enable_case_insensitive(self) -> Self {
        self.with_case_insensitive(true)
    }
}

/// Lower-cases `name` when case-insensitive matching is on.
pub(crate) fn fold_name(name: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn arguments_read_typed_values_and_absent_as_null() {
        let mut values = Map::new();
        values.insert("count".to_string(), json!(3));
        let arguments = Arguments::new(values);

        assert_eq!(arguments.get::<i64>("count").expect("count should read"), 3);
        assert_eq!(arguments.get::<Option<String>>("missing").expect("null reads"), None);
        assert!(arguments.get::<String>("count").is_err());
    }

    #[test]
    fn falsy_outputs_render_empty() {
        for output in [
            ToolOutput::Unit,
            ToolOutput::from(json!(null)),
            ToolOutput::from(false),
            ToolOutput::from(0_i64),
            ToolOutput::from(""),
            ToolOutput::from(json!([])),
        ] {
            assert!(output.is_empty(), "{output:?} should be empty");
            assert_eq!(output.render(), "");
        }
    }

    #[test]
    fn outputs_render_text_json_and_record_confirmation() {
        assert_eq!(ToolOutput::from("done").render(), "done");
        assert_eq!(ToolOutput::from(json!({"a": 1})).render(), "{\"a\":1}");
        assert_eq!(
            ToolOutput::Record {
                name: "User".to_string(),
                value: json!({"name": "John"}),
            }
            .render(),
            "`User` created"
        );
    }

    #[test]
    fn dispatch_options_default_to_fixing_json() {
        let options = DispatchOptions::default();
        assert!(options.fix_json_args);
        assert!(!options.case_insensitive);
        assert!(!options.disable_json_fixes().fix_json_args);
    }
}
