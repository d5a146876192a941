//! Call targets: plain callables with a reflectable signature, and callables
//! wrapped with a precomputed schema.
//!
//! ```rust
//! use etooling::{Callable, Parameter, Signature, ToolError};
//!
//! let add = Callable::function(
//!     Signature::new("add")
//!         .with_doc("Adds two integers")
//!         .param(Parameter::typed::<i64>("a"))
//!         .param(Parameter::typed::<i64>("b")),
//!     |args| {
//!         let a: i64 = args.get("a")?;
//!         let b: i64 = args.get("b")?;
//!         Ok::<_, ToolError>(a + b)
//!     },
//! );
//!
//! assert_eq!(add.name(), "add");
//! assert_eq!(add.doc().as_deref(), Some("Adds two integers"));
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use etransport::FunctionSchema;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    Arguments, ConfigError, FieldSpec, RecordType, SchemaOptions, Signature, ToolError,
    ToolOutput, function_schema, reflect,
};

pub type ToolHandler = dyn Fn(Arguments) -> Result<ToolOutput, ToolError> + Send + Sync;

#[derive(Clone)]
pub struct FunctionTool {
    signature: Signature,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, O>(signature: Signature, handler: F) -> Self
    where
        F: Fn(Arguments) -> Result<O, ToolError> + Send + Sync + 'static,
        O: Into<ToolOutput>,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args: Arguments| -> Result<ToolOutput, ToolError> {
                handler(args).map(Into::into)
            });

        Self { signature, handler }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        (self.handler)(arguments)
    }
}

impl Debug for FunctionTool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Callable {
    Function(FunctionTool),
    /// A typed record invoked as its own constructor.
    Record(RecordType),
}

impl Callable {
    pub fn function<F, O>(signature: Signature, handler: F) -> Self
    where
        F: Fn(Arguments) -> Result<O, ToolError> + Send + Sync + 'static,
        O: Into<ToolOutput>,
    {
        Self::Function(FunctionTool::new(signature, handler))
    }

    pub fn record<T>() -> Self
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        Self::Record(RecordType::of::<T>())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Function(function) => &function.signature.name,
            Self::Record(record) => record.name(),
        }
    }

    pub fn doc(&self) -> Option<String> {
        match self {
            Self::Function(function) => function.signature.doc.clone(),
            Self::Record(record) => record.description(),
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(record) => Some(record),
            Self::Function(_) => None,
        }
    }

    pub fn fields(&self) -> Result<Vec<FieldSpec>, ConfigError> {
        match self {
            Self::Function(function) => reflect(&function.signature),
            Self::Record(record) => Ok(record.fields()),
        }
    }

    pub fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        match self {
            Self::Function(function) => function.call(arguments),
            Self::Record(record) => record
                .construct(arguments.into_map())
                .map(|value| ToolOutput::Record {
                    name: record.name().to_string(),
                    value,
                })
                .map_err(|err| {
                    ToolError::validation(format!("validation error for {}: {err}", record.name()))
                }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DescribeOptions {
    pub schema: Option<FunctionSchema>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub strict: bool,
}

impl DescribeOptions {
    pub fn with_schema(mut self, schema: FunctionSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enable_strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// A callable advertised under an explicit schema instead of its reflected one.
#[derive(Debug, Clone)]
pub struct DescribedCallable {
    callable: Callable,
    schema: FunctionSchema,
}

impl DescribedCallable {
    pub fn new(callable: Callable, options: DescribeOptions) -> Result<Self, ConfigError> {
        let schema = match options.schema {
            Some(schema) => {
                if options.name.is_some() || options.description.is_some() {
                    return Err(ConfigError::conflicting_overrides());
                }
                schema
            }
            None => {
                let mut schema = function_schema(
                    &callable,
                    SchemaOptions::default().with_strict(options.strict),
                )?;
                if let Some(name) = options.name {
                    schema.name = name;
                }
                if let Some(description) = options.description {
                    schema.description = description;
                }
                schema
            }
        };

        Ok(Self { callable, schema })
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn schema(&self) -> &FunctionSchema {
        &self.schema
    }
}

#[derive(Debug, Clone)]
pub enum RegisteredCallable {
    Plain(Callable),
    Described(DescribedCallable),
}

impl RegisteredCallable {
    pub fn callable(&self) -> &Callable {
        match self {
            Self::Plain(callable) => callable,
            Self::Described(described) => described.callable(),
        }
    }

    /// The name the model is told to call.
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(callable) => callable.name(),
            Self::Described(described) => &described.schema.name,
        }
    }
}

impl From<Callable> for RegisteredCallable {
    fn from(value: Callable) -> Self {
        Self::Plain(value)
    }
}

impl From<DescribedCallable> for RegisteredCallable {
    fn from(value: DescribedCallable) -> Self {
        Self::Described(value)
    }
}
