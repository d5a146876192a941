//! Unified facade over the easytools workspace crates.
//!
//! Most applications only need this crate. It re-exports the wire types,
//! the schema and dispatch machinery, and the observability hooks, and adds
//! macros for declaring tool signatures.

mod macros;

pub mod prelude;

pub use eobserve;
pub use etooling;
pub use etransport;
pub use serde_json;

pub use eobserve::{MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};
pub use etooling::{
    Arguments, Callable, ConfigError, ConfigErrorKind, DescribeOptions, DescribedCallable,
    DispatchHooks, DispatchOptions, NoopDispatchHooks, Outcome, Parameter, RecordType,
    RegisteredCallable, SchemaOptions, SequentialDistributor, Signature, SoftError, SoftErrorKind,
    ThreadPoolDistributor, ToolDispatcher, ToolError, ToolErrorKind, ToolOutput, ToolRegistry,
    WorkDistributor, function_schema, insert_prefix, process_message, process_one_tool_call,
    process_response, process_tool_call, tool_def, tool_definitions,
};
pub use etransport::{
    AssistantMessage, ChatCompletion, Choice, FunctionCall, FunctionSchema, Role, ToolCall,
    ToolDefinition, ToolReply, TransportError, TransportErrorKind,
};
