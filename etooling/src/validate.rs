//! Checks decoded arguments against a callable's declared fields.

use serde_json::{Map, Value};

use crate::{Arguments, Callable, DefaultValue, FieldSpec, ToolError};

/// Coerces `values` field by field, in declaration order. Unknown keys are ignored.
pub fn validate_arguments(
    callable: &Callable,
    fields: &[FieldSpec],
    values: &Map<String, Value>,
) -> Result<Arguments, ToolError> {
    if let Callable::Record(record) = callable {
        return match record.construct(values.clone()) {
            Ok(Value::Object(instance)) => Ok(Arguments::new(instance)),
            Ok(_) => Err(ToolError::validation(format!(
                "validation error for {}: expected an object",
                record.name()
            ))),
            Err(err) => Err(ToolError::validation(format!(
                "validation error for {}: {err}",
                record.name()
            ))),
        };
    }

    let mut validated = Map::new();
    let mut problems = Vec::new();

    for field in fields {
        let value = match (values.get(&field.name), &field.default) {
            (Some(value), _) => match field.declared_type.coerce(value.clone()) {
                Ok(value) => value,
                Err(err) => {
                    problems.push(format!("{}: {err}", field.name));
                    continue;
                }
            },
            (None, DefaultValue::Value(default)) => default.clone(),
            (None, DefaultValue::Missing) => {
                problems.push(format!("{}: field required", field.name));
                continue;
            }
        };
        validated.insert(field.name.clone(), value);
    }

    if problems.is_empty() {
        Ok(Arguments::new(validated))
    } else {
        Err(ToolError::validation(format!(
            "{} validation error(s) for {}: {}",
            problems.len(),
            callable.name(),
            problems.join("; ")
        )))
    }
}
