//! Panic isolation for dispatch hooks.
//!
//! ```rust
//! use eobserve::{SafeDispatchHooks, TracingDispatchHooks};
//! use etooling::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = SafeDispatchHooks::new(TracingDispatchHooks);
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use etooling::{DispatchHooks, Outcome};
use etransport::ToolCall;

/// Keeps a panicking hook from taking the dispatch down with it.
pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_dispatch_start(tool_call)));
    }

    fn on_dispatch_complete(&self, tool_call: &ToolCall, outcome: &Outcome, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_complete(tool_call, outcome, elapsed)
        }));
    }
}
