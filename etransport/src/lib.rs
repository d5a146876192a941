//! Wire types for tool-calling chat completions: the calls a model emits,
//! the function declarations it is offered, and the replies sent back.

mod error;
mod model;

pub mod prelude {
    pub use crate::{
        AssistantMessage, ChatCompletion, Choice, FunctionCall, FunctionSchema, Role, ToolCall,
        ToolDefinition, ToolReply, TransportError, TransportErrorKind,
    };
}

pub use error::{TransportError, TransportErrorKind};
pub use model::{
    AssistantMessage, ChatCompletion, Choice, FunctionCall, FunctionSchema, Role, ToolCall,
    ToolDefinition, ToolReply,
};
