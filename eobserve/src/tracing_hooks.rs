//! Tracing events for every dispatched tool call.
//!
//! ```rust
//! use eobserve::TracingDispatchHooks;
//! use etooling::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = TracingDispatchHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use etooling::{DispatchHooks, Outcome};
use etransport::ToolCall;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatchHooks;

impl DispatchHooks for TracingDispatchHooks {
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        tracing::info!(
            phase = "tool",
            event = "dispatch_start",
            tool_name = tool_call.name(),
            tool_call_id = tool_call.id
        );
    }

    fn on_dispatch_complete(&self, tool_call: &ToolCall, outcome: &Outcome, elapsed: Duration) {
        for soft_error in &outcome.soft_errors {
            tracing::warn!(
                phase = "tool",
                event = "soft_error",
                tool_name = outcome.name,
                tool_call_id = tool_call.id,
                soft_error_kind = ?soft_error.kind,
                soft_error = %soft_error.message
            );
        }

        match &outcome.error {
            None => tracing::info!(
                phase = "tool",
                event = "dispatch_success",
                tool_name = outcome.name,
                tool_call_id = tool_call.id,
                soft_errors = outcome.soft_errors.len(),
                elapsed_ms = elapsed.as_millis() as u64
            ),
            Some(error) => tracing::error!(
                phase = "tool",
                event = "dispatch_failure",
                tool_name = outcome.name,
                tool_call_id = tool_call.id,
                soft_errors = outcome.soft_errors.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                model_error = error.is_model_error(),
                error = %error
            ),
        }
    }
}
