use std::sync::{Arc, Mutex};
use std::time::Duration;

use etooling::{
    DispatchHooks, DispatchOptions, Outcome, SoftError, SoftErrorKind, ToolDispatcher, ToolError,
    ToolRegistry,
};
use etransport::ToolCall;

use crate::{MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};

fn sample_tool_call() -> ToolCall {
    ToolCall::new("call-1", "echo", "{}")
}

fn failed_outcome() -> Outcome {
    let mut outcome = Outcome::new("call-1", "echo");
    outcome.error = Some(ToolError::execution("tool failed"));
    outcome
        .soft_errors
        .push(SoftError::new(SoftErrorKind::JsonRepaired, "trailing comma"));
    outcome
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    let hooks = TracingDispatchHooks;

    hooks.on_dispatch_start(&sample_tool_call());
    hooks.on_dispatch_complete(
        &sample_tool_call(),
        &Outcome::new("call-1", "echo"),
        Duration::from_millis(20),
    );
    hooks.on_dispatch_complete(&sample_tool_call(), &failed_outcome(), Duration::from_millis(20));
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    let hooks = MetricsDispatchHooks;

    hooks.on_dispatch_start(&sample_tool_call());
    hooks.on_dispatch_complete(
        &sample_tool_call(),
        &Outcome::new("call-1", "echo"),
        Duration::from_millis(20),
    );
    hooks.on_dispatch_complete(&sample_tool_call(), &failed_outcome(), Duration::from_millis(20));
}

#[derive(Default, Clone)]
struct RecordingDispatchHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl DispatchHooks for RecordingDispatchHooks {
    fn on_dispatch_start(&self, _tool_call: &ToolCall) {
        self.events.lock().expect("events lock").push("start");
    }

    fn on_dispatch_complete(&self, _tool_call: &ToolCall, outcome: &Outcome, _elapsed: Duration) {
        let event = if outcome.is_success() {
            "success"
        } else {
            "failure"
        };
        self.events.lock().expect("events lock").push(event);
    }
}

struct PanicDispatchHooks;

impl DispatchHooks for PanicDispatchHooks {
    fn on_dispatch_start(&self, _tool_call: &ToolCall) {
        panic!("start panic");
    }

    fn on_dispatch_complete(&self, _tool_call: &ToolCall, _outcome: &Outcome, _elapsed: Duration) {
        panic!("complete panic");
    }
}

#[test]
fn safe_dispatch_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingDispatchHooks::default();
    let events = Arc::clone(&inner.events);
    let hooks = SafeDispatchHooks::new(inner);

    hooks.on_dispatch_start(&sample_tool_call());
    hooks.on_dispatch_complete(&sample_tool_call(), &failed_outcome(), Duration::from_millis(20));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec!["start", "failure"]
    );
}

#[test]
fn safe_dispatch_hooks_swallow_panics() {
    let hooks = SafeDispatchHooks::new(PanicDispatchHooks);

    hooks.on_dispatch_start(&sample_tool_call());
    hooks.on_dispatch_complete(&sample_tool_call(), &failed_outcome(), Duration::from_millis(20));
}

#[test]
fn dispatcher_survives_panicking_hooks() {
    let mut registry = ToolRegistry::new();
    registry
        .register_fn(etooling::Signature::new("echo"), |_args| {
            Ok::<_, ToolError>("echoed")
        })
        .expect("echo registers");
    let dispatcher = ToolDispatcher::new(Arc::new(registry))
        .with_options(DispatchOptions::default())
        .with_hooks(Arc::new(SafeDispatchHooks::new(PanicDispatchHooks)));

    let outcome = dispatcher.dispatch(&sample_tool_call());

    assert!(outcome.is_success());
    assert_eq!(outcome.content(), "echoed");
}
