//! Batch entry points, work distributors, and the registry-backed dispatcher.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use etransport::{AssistantMessage, ChatCompletion, ToolCall};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    DispatchHooks, DispatchOptions, NoopDispatchHooks, Outcome, RegisteredCallable, ToolRegistry,
    process_tool_call,
};

pub type DispatchJob<'a> = Box<dyn FnOnce() -> Outcome + Send + 'a>;

/// Runs independent jobs. Results come back in submission order.
pub trait WorkDistributor: Send + Sync {
    fn distribute<'a>(&self, jobs: Vec<DispatchJob<'a>>) -> Vec<Outcome>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDistributor;

impl WorkDistributor for SequentialDistributor {
    fn distribute<'a>(&self, jobs: Vec<DispatchJob<'a>>) -> Vec<Outcome> {
        jobs.into_iter().map(|job| job()).collect()
    }
}

/// Runs jobs on a dedicated rayon pool. Falls back to sequential when the pool can't start.
#[derive(Debug, Clone)]
pub struct ThreadPoolDistributor {
    workers: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl ThreadPoolDistributor {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("etooling-dispatch-{index}"))
            .build()
            .ok()
            .map(Arc::new);
        Self { workers, pool }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadPoolDistributor {
    fn default() -> Self {
        let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new((cores + 4).min(32))
    }
}

impl WorkDistributor for ThreadPoolDistributor {
    fn distribute<'a>(&self, jobs: Vec<DispatchJob<'a>>) -> Vec<Outcome> {
        match &self.pool {
            Some(pool) if jobs.len() > 1 && self.workers > 1 => {
                pool.install(|| jobs.into_par_iter().map(|job| job()).collect())
            }
            _ => SequentialDistributor.distribute(jobs),
        }
    }
}

fn dispatch_calls(
    calls: &[ToolCall],
    tools: &[RegisteredCallable],
    options: &DispatchOptions,
    hooks: &dyn DispatchHooks,
    distributor: &dyn WorkDistributor,
) -> Vec<Outcome> {
    let jobs: Vec<DispatchJob<'_>> = calls
        .iter()
        .map(|call| {
            Box::new(move || {
                hooks.on_dispatch_start(call);
                let started_at = Instant::now();
                let outcome = process_tool_call(call, tools, options);
                hooks.on_dispatch_complete(call, &outcome, started_at.elapsed());
                outcome
            }) as DispatchJob<'_>
        })
        .collect();

    distributor.distribute(jobs)
}

/// One outcome per call on the message, in order.
pub fn process_message(
    message: &AssistantMessage,
    tools: &[RegisteredCallable],
    options: &DispatchOptions,
    distributor: &dyn WorkDistributor,
) -> Vec<Outcome> {
    dispatch_calls(&message.calls(), tools, options, &NoopDispatchHooks, distributor)
}

/// Like [`process_message`] for the message of one choice. A missing choice yields no outcomes.
pub fn process_response(
    response: &ChatCompletion,
    tools: &[RegisteredCallable],
    choice: usize,
    options: &DispatchOptions,
    distributor: &dyn WorkDistributor,
) -> Vec<Outcome> {
    match response.choice_message(choice) {
        Ok(message) => process_message(message, tools, options, distributor),
        Err(_) => Vec::new(),
    }
}

/// Dispatches only the call at `index` on the first choice.
pub fn process_one_tool_call(
    response: &ChatCompletion,
    tools: &[RegisteredCallable],
    index: usize,
    options: &DispatchOptions,
) -> Option<Outcome> {
    let message = response.choice_message(0).ok()?;
    let call = message.calls().into_iter().nth(index)?;
    Some(process_tool_call(&call, tools, options))
}

/// Registry-backed dispatcher bundling options, hooks, and a distributor.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    options: DispatchOptions,
    hooks: Arc<dyn DispatchHooks>,
    distributor: Arc<dyn WorkDistributor>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        let options = DispatchOptions::default().with_case_insensitive(registry.is_case_insensitive());
        Self {
            registry,
            options,
            hooks: Arc::new(NoopDispatchHooks),
            distributor: Arc::new(SequentialDistributor),
        }
    }

    /// Replaces the dispatch options. A case-insensitive registry keeps matching case-insensitively.
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        let case_insensitive = options.case_insensitive || self.registry.is_case_insensitive();
        self.options = options.with_case_insensitive(case_insensitive);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_distributor(mut self, distributor: Arc<dyn WorkDistributor>) -> Self {
        self.distributor = distributor;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn dispatch(&self, call: &ToolCall) -> Outcome {
        self.hooks.on_dispatch_start(call);
        let started_at = Instant::now();
        let outcome = process_tool_call(call, self.registry.tools(), &self.options);
        self.hooks
            .on_dispatch_complete(call, &outcome, started_at.elapsed());
        outcome
    }

    pub fn dispatch_message(&self, message: &AssistantMessage) -> Vec<Outcome> {
        dispatch_calls(
            &message.calls(),
            self.registry.tools(),
            &self.options,
            self.hooks.as_ref(),
            self.distributor.as_ref(),
        )
    }

    pub fn dispatch_response(&self, response: &ChatCompletion, choice: usize) -> Vec<Outcome> {
        match response.choice_message(choice) {
            Ok(message) => self.dispatch_message(message),
            Err(_) => Vec::new(),
        }
    }

    pub fn dispatch_one(&self, response: &ChatCompletion, index: usize) -> Option<Outcome> {
        let message = response.choice_message(0).ok()?;
        let call = message.calls().into_iter().nth(index)?;
        Some(self.dispatch(&call))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use etransport::ToolCall;

    use super::*;
    use crate::{Callable, Parameter, Signature, ToolError, ToolErrorKind};

    #[derive(Default)]
    struct RecordingHooks {
        starts: AtomicUsize,
        failures: AtomicUsize,
    }

    impl DispatchHooks for RecordingHooks {
        fn on_dispatch_start(&self, _tool_call: &ToolCall) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_dispatch_complete(&self, _tool_call: &ToolCall, outcome: &Outcome, _elapsed: Duration) {
            if outcome.error.is_some() {
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn echo_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(
                Signature::new("echo").param(Parameter::typed::<String>("text")),
                |args| args.get::<String>("text"),
            )
            .expect("echo registers");
        Arc::new(registry)
    }

    fn echo_calls(count: usize) -> Vec<ToolCall> {
        (0..count)
            .map(|index| {
                ToolCall::new(format!("call_{index}"), "echo", format!(r#"{{"text": "{index}"}}"#))
            })
            .collect()
    }

    #[test]
    fn thread_pool_keeps_submission_order() {
        let message = AssistantMessage::with_tool_calls(echo_calls(20));
        let registry = echo_registry();

        let outcomes = process_message(
            &message,
            registry.tools(),
            &DispatchOptions::default(),
            &ThreadPoolDistributor::new(4),
        );

        let contents: Vec<String> = outcomes.iter().map(Outcome::content).collect();
        let expected: Vec<String> = (0..20).map(|index| index.to_string()).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn default_pool_size_is_bounded() {
        let workers = ThreadPoolDistributor::default().workers();
        assert!((5..=32).contains(&workers));
        assert_eq!(ThreadPoolDistributor::new(0).workers(), 1);
    }

    #[test]
    fn dispatcher_fires_hooks_for_every_call() {
        let hooks = Arc::new(RecordingHooks::default());
        let dispatcher = ToolDispatcher::new(echo_registry())
            .with_hooks(hooks.clone())
            .with_distributor(Arc::new(ThreadPoolDistributor::new(2)));

        let mut calls = echo_calls(3);
        calls.push(ToolCall::new("call_missing", "shout", "{}"));
        let outcomes = dispatcher.dispatch_message(&AssistantMessage::with_tool_calls(calls));

        assert_eq!(outcomes.len(), 4);
        assert_eq!(hooks.starts.load(Ordering::SeqCst), 4);
        assert_eq!(hooks.failures.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcomes[3].error.as_ref().map(|error| error.kind),
            Some(ToolErrorKind::NoMatchingTool)
        );
    }

    #[test]
    fn dispatcher_uses_registry_case_mode() {
        let mut registry = ToolRegistry::new()
            .with_schema_options(crate::SchemaOptions::default().enable_case_insensitive());
        registry
            .register(Callable::function(Signature::new("Echo"), |_args| {
                Ok::<_, ToolError>("ok")
            }))
            .expect("echo registers");
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        assert!(dispatcher.options().case_insensitive);
        let outcome = dispatcher.dispatch(&ToolCall::new("call_1", "ECHO", "{}"));
        assert_eq!(outcome.content(), "ok");
        assert_eq!(outcome.name, "ECHO");
    }

    #[test]
    fn missing_choice_yields_no_outcomes() {
        let response = ChatCompletion::from_message(
            "test-model",
            AssistantMessage::with_tool_calls(echo_calls(1)),
        );
        let registry = echo_registry();

        assert!(
            process_response(
                &response,
                registry.tools(),
                3,
                &DispatchOptions::default(),
                &SequentialDistributor
            )
            .is_empty()
        );
        assert!(ToolDispatcher::new(registry).dispatch_response(&response, 1).is_empty());
    }

    #[test]
    fn replaced_options_keep_registry_case_mode() {
        #[derive(Debug, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
        struct Thoughts {
            thoughts: String,
        }

        #[derive(Debug, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
        struct User {
            name: String,
        }

        let mut registry = ToolRegistry::new()
            .with_schema_options(crate::SchemaOptions::default().enable_case_insensitive());
        registry.register_record::<User>().expect("record registers");
        let prefix = Callable::record::<Thoughts>();
        let advertised = registry.definitions(Some(&prefix)).expect("definitions build")[0]
            .name()
            .to_string();
        assert_eq!(advertised, "thoughts_and_user");

        let dispatcher = ToolDispatcher::new(Arc::new(registry)).with_options(
            DispatchOptions::default().with_prefix(crate::RecordType::of::<Thoughts>()),
        );
        assert!(dispatcher.options().case_insensitive);

        let outcome = dispatcher.dispatch(&ToolCall::new(
            "call_1",
            advertised,
            r#"{"thoughts": "look them up", "name": "John"}"#,
        ));
        assert!(outcome.is_success(), "{:?}", outcome.error);
        assert!(outcome.soft_errors.is_empty());
        assert_eq!(outcome.name, "user");
        assert_eq!(outcome.content(), "`User` created");
    }
}
