//! Matches one incoming tool call to a registered callable and runs it.
//!
//! ```rust
//! use etooling::{
//!     Callable, DispatchOptions, Parameter, RegisteredCallable, Signature, ToolError,
//!     process_tool_call,
//! };
//! use etransport::ToolCall;
//!
//! let tools: Vec<RegisteredCallable> = vec![
//!     Callable::function(
//!         Signature::new("add")
//!             .param(Parameter::typed::<i64>("a"))
//!             .param(Parameter::typed::<i64>("b")),
//!         |args| Ok::<_, ToolError>(args.get::<i64>("a")? + args.get::<i64>("b")?),
//!     )
//!     .into(),
//! ];
//!
//! let call = ToolCall::new("call_1", "add", r#"{"a": 2, "b": 3,}"#);
//! let outcome = process_tool_call(&call, &tools, &DispatchOptions::default());
//!
//! assert!(outcome.is_success());
//! assert_eq!(outcome.content(), "5");
//! assert_eq!(outcome.soft_errors.len(), 1);
//! ```

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use etransport::ToolCall;
use serde_json::{Map, Value};

use crate::args::into_object;
use crate::types::fold_name;
use crate::{
    DispatchOptions, Outcome, RegisteredCallable, SoftError, SoftErrorKind, ToolError,
    ToolOutput, parse_json_value, prefix_marker, prefix_name, repair_json, split_string_to_list,
    tool_name, validate_arguments,
};

/// Never fails: every problem ends up in the returned outcome.
pub fn process_tool_call(
    call: &ToolCall,
    tools: &[RegisteredCallable],
    options: &DispatchOptions,
) -> Outcome {
    let mut outcome = Outcome::new(call.id.clone(), call.name());

    match run_call(call, tools, options, &mut outcome) {
        Ok(output) => outcome.output = Some(output),
        Err(mut error) => {
            if error.tool_name.is_none() {
                error.tool_name = Some(outcome.name.clone());
            }
            if error.tool_call_id.is_none() {
                error.tool_call_id = Some(call.id.clone());
            }
            outcome.error = Some(error);
        }
    }

    outcome
}

fn run_call(
    call: &ToolCall,
    tools: &[RegisteredCallable],
    options: &DispatchOptions,
    outcome: &mut Outcome,
) -> Result<ToolOutput, ToolError> {
    let case_insensitive = options.case_insensitive;
    let mut arguments = decode_arguments(call.arguments(), options, &mut outcome.soft_errors)?;

    if let Some(prefix) = &options.prefix {
        let mut prefix_values = Map::new();
        for field in prefix.fields() {
            if let Some(value) = arguments.shift_remove(&field.name) {
                prefix_values.insert(field.name, value);
            }
        }
        match prefix.construct(prefix_values) {
            Ok(instance) => outcome.prefix = Some(instance),
            Err(err) => outcome.soft_errors.push(SoftError::new(
                SoftErrorKind::PrefixValidation,
                format!("validation error for {}: {err}", prefix.name()),
            )),
        }

        let expected_prefix = prefix_name(prefix, case_insensitive);
        match strip_marker(&outcome.name, &prefix_marker(&expected_prefix), case_insensitive) {
            Some(stripped) => outcome.name = stripped,
            None => outcome.soft_errors.push(SoftError::new(
                SoftErrorKind::PrefixNameMismatch,
                format!(
                    "Function name '{}' does not match prefix '{expected_prefix}'",
                    outcome.name
                ),
            )),
        }
    }
    outcome.arguments = Some(arguments.clone());

    let requested = fold_name(&outcome.name, case_insensitive);
    let tool = tools
        .iter()
        .find(|tool| tool_name(tool, case_insensitive) == requested)
        .ok_or_else(|| ToolError::no_matching_tool(format!("Function {} not found", outcome.name)))?;
    outcome.tool = Some(tool.clone());

    let callable = tool.callable();
    let fields = callable.fields()?;

    if options.fix_json_args {
        for field in fields.iter().filter(|field| field.declared_type.is_list_like()) {
            let repaired = match arguments.get(&field.name) {
                Some(Value::String(text)) => split_string_to_list(text),
                _ => continue,
            };
            arguments.insert(field.name.clone(), repaired);
            outcome.soft_errors.push(SoftError::new(
                SoftErrorKind::ListArgumentRepaired,
                format!("Fixed JSON decode error for field {}", field.name),
            ));
        }
        outcome.arguments = Some(arguments.clone());
    }

    let validated = validate_arguments(callable, &fields, &arguments)?;

    match catch_unwind(AssertUnwindSafe(|| callable.call(validated))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            Err(ToolError::execution(format!("tool panicked: {message}"))
                .with_trace(format!("panicked at tool '{}': {message}", callable.name())))
        }
    }
}

fn decode_arguments(
    raw: &str,
    options: &DispatchOptions,
    soft_errors: &mut Vec<SoftError>,
) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(raw) {
        Ok(value) => into_object(value),
        Err(error) if options.fix_json_args => {
            soft_errors.push(SoftError::new(SoftErrorKind::JsonRepaired, error.message));
            into_object(parse_json_value(&repair_json(raw))?)
        }
        Err(error) => Err(error),
    }
}

/// The part of `name` after `marker`, comparing case-folded when asked.
fn strip_marker(name: &str, marker: &str, case_insensitive: bool) -> Option<String> {
    if !case_insensitive {
        return name.strip_prefix(marker).map(str::to_string);
    }

    let mut folded = String::new();
    for (index, ch) in name.char_indices() {
        if folded == marker {
            return Some(name[index..].to_string());
        }
        if !marker.starts_with(folded.as_str()) {
            return None;
        }
        folded.extend(ch.to_lowercase());
    }
    (folded == marker).then(String::new)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
