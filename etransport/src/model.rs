//! Chat-completion payloads exchanged with a tool-calling model API.
//!
//! ```rust
//! use etransport::{AssistantMessage, ChatCompletion, ToolCall};
//!
//! let completion = ChatCompletion::from_message(
//!     "gpt-4o-mini",
//!     AssistantMessage::with_tool_calls(vec![ToolCall::new("call_1", "lookup", "{}")]),
//! );
//!
//! let calls = completion.choice_message(0).expect("choice should exist").calls();
//! assert_eq!(calls.len(), 1);
//! assert_eq!(calls[0].name(), "lookup");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TransportError;

const FUNCTION_TYPE: &str = "function";

fn function_type() -> String {
    FUNCTION_TYPE.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text as produced by the model. It is not guaranteed to parse.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn with_json_arguments(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: &Value,
    ) -> Self {
        Self::new(id, name, arguments.to_string())
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Older single-call shape, superseded by `tool_calls`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl AssistantMessage {
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::default()
        }
    }

    pub fn with_function_call(function_call: FunctionCall) -> Self {
        Self {
            function_call: Some(function_call),
            ..Self::default()
        }
    }

    /// Every call carried by this message, in the order the model emitted them.
    ///
    /// A legacy `function_call` is normalized into a list of one with an empty id.
    pub fn calls(&self) -> Vec<ToolCall> {
        match (&self.tool_calls, &self.function_call) {
            (Some(tool_calls), _) if !tool_calls.is_empty() => tool_calls.clone(),
            (_, Some(function_call)) => vec![ToolCall {
                id: String::new(),
                call_type: function_type(),
                function: function_call.clone(),
            }],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: AssistantMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
}

impl ChatCompletion {
    pub fn from_message(model: impl Into<String>, message: AssistantMessage) -> Self {
        Self {
            id: String::new(),
            model: model.into(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some("tool_calls".to_string()),
            }],
        }
    }

    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn choice_message(&self, index: usize) -> Result<&AssistantMessage, TransportError> {
        self.choices
            .get(index)
            .map(|choice| &choice.message)
            .ok_or_else(|| TransportError::missing_choice(index))
    }
}

/// Function declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl FunctionSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
            strict: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.parameters
            .as_ref()
            .and_then(|parameters| parameters.get("properties"))
            .and_then(Value::as_object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    pub function: FunctionSchema,
}

impl ToolDefinition {
    pub fn function(schema: FunctionSchema) -> Self {
        Self {
            tool_type: function_type(),
            function: schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReply {
    pub role: Role,
    pub tool_call_id: String,
    pub name: String,
    pub content: String,
}

impl ToolReply {
    pub fn new(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_call_parses_wire_shape_and_defaults_type() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_7",
            "function": {"name": "search", "arguments": "{\"q\":\"rust\"}"}
        }))
        .expect("tool call should parse");

        assert_eq!(call.id, "call_7");
        assert_eq!(call.call_type, "function");
        assert_eq!(call.name(), "search");
        assert_eq!(call.arguments(), "{\"q\":\"rust\"}");
    }

    #[test]
    fn legacy_function_call_normalizes_to_single_call() {
        let message = AssistantMessage::with_function_call(FunctionCall {
            name: "legacy".to_string(),
            arguments: "{}".to_string(),
        });

        let calls = message.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "");
        assert_eq!(calls[0].name(), "legacy");
    }

    #[test]
    fn message_without_calls_yields_empty_list() {
        assert!(AssistantMessage::default().calls().is_empty());
        assert!(AssistantMessage::with_tool_calls(Vec::new()).calls().is_empty());
    }

    #[test]
    fn function_schema_omits_absent_parameters_and_strict_flag() {
        let definition = ToolDefinition::function(FunctionSchema::new("noop", ""));
        let rendered = serde_json::to_value(&definition).expect("definition should serialize");

        assert_eq!(
            rendered,
            json!({"type": "function", "function": {"name": "noop", "description": ""}})
        );
    }

    #[test]
    fn tool_reply_serializes_with_tool_role() {
        let reply = ToolReply::new("call_1", "lookup", "done");
        let rendered = serde_json::to_value(&reply).expect("reply should serialize");

        assert_eq!(
            rendered,
            json!({"role": "tool", "tool_call_id": "call_1", "name": "lookup", "content": "done"})
        );
    }

    #[test]
    fn missing_choice_is_reported() {
        let completion = ChatCompletion::from_message("gpt", AssistantMessage::default());
        let error = completion
            .choice_message(3)
            .expect_err("choice 3 should be missing");
        assert_eq!(error.kind, crate::TransportErrorKind::MissingChoice);
    }
}
