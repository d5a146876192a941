//! Common imports for most easytools applications.

pub use crate::{tool_param, tool_signature};
pub use crate::{
    Arguments, AssistantMessage, Callable, ChatCompletion, ConfigError, DescribeOptions,
    DescribedCallable, DispatchHooks, DispatchOptions, MetricsDispatchHooks, Outcome, Parameter,
    RegisteredCallable, SafeDispatchHooks, SchemaOptions, SequentialDistributor, Signature,
    ThreadPoolDistributor, ToolCall, ToolDefinition, ToolDispatcher, ToolError, ToolErrorKind,
    ToolOutput, ToolRegistry, ToolReply, TracingDispatchHooks,
};
