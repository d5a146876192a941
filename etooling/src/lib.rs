//! Schema derivation and tool-call dispatch.
//!
//! Callables describe their parameters through a [`Signature`] (or are typed
//! records), get turned into function declarations for the model, and the
//! model's tool calls are routed back, validated, and run.
//!
//! ```rust
//! use etooling::prelude::*;
//! use etransport::{AssistantMessage, ToolCall};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_fn(
//!         Signature::new("shout").param(Parameter::typed::<String>("text")),
//!         |args| Ok::<_, ToolError>(args.get::<String>("text")?.to_uppercase()),
//!     )
//!     .expect("shout should register");
//!
//! let message = AssistantMessage::with_tool_calls(vec![ToolCall::new(
//!     "call_1",
//!     "shout",
//!     r#"{"text": "hi"}"#,
//! )]);
//! let outcomes = ToolDispatcher::new(registry.into()).dispatch_message(&message);
//!
//! assert_eq!(outcomes[0].to_message().content, "HI");
//! ```

mod args;
mod dispatch;
mod error;
mod hooks;
mod outcome;
mod prefix;
mod record;
mod reflect;
mod registry;
mod runtime;
mod schema;
mod tool;
mod types;
mod validate;

pub mod prelude {
    pub use crate::{
        Arguments, Callable, ConfigError, ConfigErrorKind, DescribeOptions, DescribedCallable,
        DispatchHooks, DispatchOptions, Outcome, Parameter, RecordType, RegisteredCallable,
        SchemaOptions, SequentialDistributor, Signature, SoftError, SoftErrorKind,
        ThreadPoolDistributor, ToolDispatcher, ToolError, ToolErrorKind, ToolOutput, ToolRegistry,
        WorkDistributor,
    };
}

pub use args::{parse_json_object, parse_json_value, repair_json, split_string_to_list};
pub use dispatch::process_tool_call;
pub use error::{ConfigError, ConfigErrorKind, SoftError, SoftErrorKind, ToolError, ToolErrorKind};
pub use hooks::{DispatchHooks, NoopDispatchHooks};
pub use outcome::Outcome;
pub use prefix::{insert_prefix, prefix_marker, prefix_name};
pub use record::RecordType;
pub use reflect::{
    CoerceFn, DeclaredType, DefaultValue, FieldSpec, Parameter, Signature, TypeDescriptor,
    TypeNamespace, reflect,
};
pub use registry::ToolRegistry;
pub use runtime::{
    DispatchJob, SequentialDistributor, ThreadPoolDistributor, ToolDispatcher, WorkDistributor,
    process_message, process_one_tool_call, process_response,
};
pub use schema::{
    function_schema, parameters_schema, purge_titles, schema_for, to_strict_json_schema,
    tool_def, tool_definitions, tool_name,
};
pub use tool::{
    Callable, DescribeOptions, DescribedCallable, FunctionTool, RegisteredCallable, ToolHandler,
};
pub use types::{Arguments, DispatchOptions, SchemaOptions, ToolOutput};
pub use validate::validate_arguments;
