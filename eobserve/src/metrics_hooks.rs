//! Counters and timings for dispatched tool calls.
//!
//! ```rust
//! use eobserve::MetricsDispatchHooks;
//! use etooling::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = MetricsDispatchHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use etooling::{DispatchHooks, Outcome};
use etransport::ToolCall;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsDispatchHooks;

impl DispatchHooks for MetricsDispatchHooks {
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        metrics::counter!(
            "easytools_dispatch_start_total",
            "tool_name" => tool_call.name().to_string()
        )
        .increment(1);
    }

    fn on_dispatch_complete(&self, _tool_call: &ToolCall, outcome: &Outcome, elapsed: Duration) {
        for soft_error in &outcome.soft_errors {
            metrics::counter!(
                "easytools_dispatch_soft_error_total",
                "tool_name" => outcome.name.clone(),
                "soft_error_kind" => format!("{:?}", soft_error.kind)
            )
            .increment(1);
        }

        match &outcome.error {
            None => {
                metrics::counter!(
                    "easytools_dispatch_success_total",
                    "tool_name" => outcome.name.clone()
                )
                .increment(1);
            }
            Some(error) => {
                metrics::counter!(
                    "easytools_dispatch_failure_total",
                    "tool_name" => outcome.name.clone(),
                    "error_kind" => format!("{:?}", error.kind)
                )
                .increment(1);
            }
        }

        metrics::histogram!(
            "easytools_dispatch_duration_seconds",
            "tool_name" => outcome.name.clone()
        )
        .record(elapsed.as_secs_f64());
    }
}
