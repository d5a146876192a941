//! The captured result of dispatching one tool call.

use etransport::ToolReply;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{RegisteredCallable, SoftError, ToolError, ToolOutput};

#[derive(Debug, Clone)]
pub struct Outcome {
    pub tool_call_id: String,
    /// Requested name with any prefix marker stripped.
    pub name: String,
    pub arguments: Option<Map<String, Value>>,
    pub output: Option<ToolOutput>,
    pub error: Option<ToolError>,
    pub soft_errors: Vec<SoftError>,
    pub prefix: Option<Value>,
    pub tool: Option<RegisteredCallable>,
}

impl Outcome {
    pub fn new(tool_call_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            arguments: None,
            output: None,
            error: None,
            soft_errors: Vec::new(),
            prefix: None,
            tool: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.error.as_ref().and_then(|error| error.trace.as_deref())
    }

    /// Typed view of the output, e.g. the record instance a constructor call produced.
    pub fn output_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.output
            .as_ref()
            .and_then(ToolOutput::as_value)
            .map(|value| serde_json::from_value(value.clone()))
    }

    pub fn prefix_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.prefix
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
    }

    pub fn content(&self) -> String {
        if let Some(error) = &self.error {
            return error.to_string();
        }
        self.output
            .as_ref()
            .map(ToolOutput::render)
            .unwrap_or_default()
    }

    pub fn to_message(&self) -> ToolReply {
        ToolReply::new(self.tool_call_id.clone(), self.name.clone(), self.content())
    }
}

#[cfg(test)]
mod tests {
    use etransport::Role;
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn error_takes_precedence_in_content() {
        let mut outcome = Outcome::new("call_1", "explode");
        outcome.output = Some(ToolOutput::from("unused"));
        outcome.error = Some(
            ToolError::execution("This is an error").with_trace("caused by: the tool"),
        );

        let reply = outcome.to_message();
        assert_eq!(reply.role, Role::Tool);
        assert_eq!(reply.tool_call_id, "call_1");
        assert!(reply.content.contains("This is an error"));
        assert_eq!(outcome.stack_trace(), Some("caused by: the tool"));
        assert!(!outcome.is_success());
        assert_eq!(outcome.error.map(|error| error.kind), Some(ToolErrorKind::Execution));
    }

    #[test]
    fn missing_or_empty_output_renders_empty_content() {
        let mut outcome = Outcome::new("call_1", "noop");
        assert_eq!(outcome.content(), "");

        outcome.output = Some(ToolOutput::Unit);
        assert_eq!(outcome.to_message().content, "");
    }

    #[test]
    fn record_output_reads_back_typed() {
        let mut outcome = Outcome::new("call_1", "Point");
        outcome.output = Some(ToolOutput::Record {
            name: "Point".to_string(),
            value: json!([1, 2]),
        });

        assert_eq!(outcome.content(), "`Point` created");
        let point: (i32, i32) = outcome
            .output_as()
            .expect("output present")
            .expect("output deserializes");
        assert_eq!(point, (1, 2));
        assert!(outcome.prefix_as::<String>().is_none());
    }
}
