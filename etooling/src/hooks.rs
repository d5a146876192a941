//! Lifecycle hooks fired around every dispatched tool call.
//!
//! ```rust
//! use etooling::{DispatchHooks, NoopDispatchHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = NoopDispatchHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use etransport::ToolCall;

use crate::Outcome;

pub trait DispatchHooks: Send + Sync {
    fn on_dispatch_start(&self, _tool_call: &ToolCall) {}

    /// Fired for failed calls too; inspect `outcome.error`.
    fn on_dispatch_complete(&self, _tool_call: &ToolCall, _outcome: &Outcome, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
