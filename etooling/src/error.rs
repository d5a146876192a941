//! Registration errors, per-call hard errors, and soft (recovered) errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Setup mistakes detected while reflecting signatures or building schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    MissingAnnotation,
    UnresolvedType,
    IncompatibleOptions,
    InvalidPrefixType,
    ConflictingOverrides,
    DuplicateName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_annotation(parameter: &str) -> Self {
        Self::new(
            ConfigErrorKind::MissingAnnotation,
            format!("Parameter '{parameter}' has no type annotation"),
        )
    }

    pub fn unresolved_type(type_name: &str, parameter: &str) -> Self {
        Self::new(
            ConfigErrorKind::UnresolvedType,
            format!(
                "Type '{type_name}' for parameter '{parameter}' could not be resolved in the namespace"
            ),
        )
    }

    pub fn incompatible_options(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::IncompatibleOptions, message)
    }

    pub fn invalid_prefix_type(name: &str) -> Self {
        Self::new(
            ConfigErrorKind::InvalidPrefixType,
            format!("prefix '{name}' is not a record type"),
        )
    }

    pub fn conflicting_overrides() -> Self {
        Self::new(
            ConfigErrorKind::ConflictingOverrides,
            "Cannot specify name or description when providing a complete schema",
        )
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            ConfigErrorKind::DuplicateName,
            format!("Trying to register {name} which is already registered"),
        )
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    JsonDecode,
    InvalidArguments,
    NoMatchingTool,
    Validation,
    Execution,
    /// A registration problem surfaced while dispatching.
    Configuration,
}

/// A failure that aborted one call. Captured in the outcome, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
    pub trace: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
            tool_call_id: None,
            trace: None,
        }
    }

    pub fn json_decode(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::JsonDecode, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn no_matching_tool(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NoMatchingTool, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Validation, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    /// Wraps an arbitrary error raised by a tool, keeping its `source()` chain as the trace.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        let mut tool_error = Self::execution(error.to_string());
        if !trace.is_empty() {
            tool_error.trace = Some(trace.join("\n"));
        }
        tool_error
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Errors caused by the model's output rather than by the tool itself.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::JsonDecode
                | ToolErrorKind::InvalidArguments
                | ToolErrorKind::NoMatchingTool
                | ToolErrorKind::Validation
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(
                f,
                "{:?} [tool={}, call_id={}]: {}",
                self.kind, tool_name, tool_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

impl From<ConfigError> for ToolError {
    fn from(value: ConfigError) -> Self {
        Self::new(ToolErrorKind::Configuration, value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftErrorKind {
    JsonRepaired,
    PrefixValidation,
    PrefixNameMismatch,
    ListArgumentRepaired,
}

/// Something that went wrong but was recovered from while processing a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftError {
    pub kind: SoftErrorKind,
    pub message: String,
}

impl SoftError {
    pub fn new(kind: SoftErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for SoftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SoftError {}
