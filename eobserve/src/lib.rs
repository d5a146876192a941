//! Observability hooks for tool-call dispatch.
//!
//! ```rust
//! use eobserve::{MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};
//!
//! let _hooks = SafeDispatchHooks::new(TracingDispatchHooks);
//! let _metrics = MetricsDispatchHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsDispatchHooks;
pub use safe_hooks::SafeDispatchHooks;
pub use tracing_hooks::TracingDispatchHooks;

pub mod prelude {
    pub use crate::{MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};
}

#[cfg(test)]
mod tests;
