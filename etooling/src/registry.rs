//! Ordered tool registry with name-based lookup.
//!
//! ```rust
//! use etooling::{Parameter, Signature, ToolError, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_fn(
//!         Signature::new("echo").param(Parameter::typed::<String>("text")),
//!         |args| args.get::<String>("text"),
//!     )
//!     .expect("echo should register");
//!
//! assert!(registry.contains("echo"));
//! assert_eq!(registry.definitions(None).expect("definitions build").len(), 1);
//! ```

use etransport::ToolDefinition;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::fold_name;
use crate::{
    Arguments, Callable, ConfigError, RegisteredCallable, SchemaOptions, Signature, ToolError,
    ToolOutput, insert_prefix, schema_for, tool_def, tool_name,
};

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<RegisteredCallable>,
    schema_options: SchemaOptions,
    include_prefix_name: bool,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            schema_options: SchemaOptions::default(),
            include_prefix_name: true,
        }
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_options(mut self, schema_options: SchemaOptions) -> Self {
        self.schema_options = schema_options;
        self
    }

    pub fn with_include_prefix_name(mut self, include_prefix_name: bool) -> Self {
        self.include_prefix_name = include_prefix_name;
        self
    }

    pub fn schema_options(&self) -> SchemaOptions {
        self.schema_options
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.schema_options.case_insensitive
    }

    /// Builds the tool's schema up front so setup mistakes surface here.
    pub fn register<T>(&mut self, tool: T) -> Result<(), ConfigError>
    where
        T: Into<RegisteredCallable>,
    {
        let tool = tool.into();
        schema_for(&tool, self.schema_options)?;

        let name = tool_name(&tool, self.schema_options.case_insensitive);
        if self.position(&name).is_some() {
            return Err(ConfigError::duplicate_name(tool.name()));
        }

        self.tools.push(tool);
        Ok(())
    }

    pub fn register_fn<F, O>(&mut self, signature: Signature, handler: F) -> Result<(), ConfigError>
    where
        F: Fn(Arguments) -> Result<O, ToolError> + Send + Sync + 'static,
        O: Into<ToolOutput>,
    {
        self.register(Callable::function(signature, handler))
    }

    pub fn register_record<T>(&mut self) -> Result<(), ConfigError>
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        self.register(Callable::record::<T>())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCallable> {
        self.position(name).map(|index| &self.tools[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<RegisteredCallable> {
        self.position(name).map(|index| self.tools.remove(index))
    }

    pub fn names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|tool| tool_name(tool, self.schema_options.case_insensitive))
            .collect()
    }

    pub fn tools(&self) -> &[RegisteredCallable] {
        &self.tools
    }

    /// Declarations for every tool, each merged with `prefix` when one is given.
    pub fn definitions(&self, prefix: Option<&Callable>) -> Result<Vec<ToolDefinition>, ConfigError> {
        let case_insensitive = self.schema_options.case_insensitive;
        self.tools
            .iter()
            .map(|tool| {
                let schema = schema_for(tool, self.schema_options)?;
                let schema = match prefix {
                    Some(prefix) => {
                        insert_prefix(prefix, &schema, self.include_prefix_name, case_insensitive)?
                    }
                    None => schema,
                };
                Ok(tool_def(schema))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let case_insensitive = self.schema_options.case_insensitive;
        let name = fold_name(name, case_insensitive);
        self.tools
            .iter()
            .position(|tool| tool_name(tool, case_insensitive) == name)
    }
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{ConfigErrorKind, DescribeOptions, DescribedCallable, Parameter};

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct User {
        name: String,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Thoughts {
        thoughts: String,
    }

    fn echo() -> Callable {
        Callable::function(
            Signature::new("echo").param(Parameter::typed::<String>("text")),
            |args| args.get::<String>("text"),
        )
    }

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(echo()).expect("echo registers");
        registry.register_record::<User>().expect("record registers");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["echo", "User"]);
        assert!(registry.contains("User"));
        assert!(!registry.contains("user"));

        let removed = registry.remove("echo");
        assert!(removed.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).expect("echo registers");

        let error = registry.register(echo()).expect_err("second echo should fail");
        assert_eq!(error.kind, ConfigErrorKind::DuplicateName);
        assert_eq!(error.message, "Trying to register echo which is already registered");
    }

    #[test]
    fn case_insensitive_registry_folds_lookups_and_duplicates() {
        let mut registry = ToolRegistry::new()
            .with_schema_options(SchemaOptions::default().enable_case_insensitive());
        registry.register_record::<User>().expect("record registers");

        assert!(registry.contains("USER"));
        assert_eq!(registry.names(), vec!["user"]);

        let shouting = Callable::function(Signature::new("USER"), |_args| Ok(()));
        let error = registry.register(shouting).expect_err("folded duplicate should fail");
        assert_eq!(error.kind, ConfigErrorKind::DuplicateName);
    }

    #[test]
    fn registration_fails_fast_on_bad_signatures() {
        let mut registry = ToolRegistry::new();
        let untyped = Callable::function(
            Signature::new("untyped").param(Parameter::untyped("param")),
            |_args| Ok(()),
        );

        let error = registry.register(untyped).expect_err("untyped should fail");
        assert_eq!(error.kind, ConfigErrorKind::MissingAnnotation);
        assert!(registry.is_empty());
    }

    #[test]
    fn precomputed_schemas_cannot_join_case_insensitive_registries() {
        let mut registry = ToolRegistry::new()
            .with_schema_options(SchemaOptions::default().enable_case_insensitive());
        let described = DescribedCallable::new(echo(), DescribeOptions::default().with_name("say"))
            .expect("override applies");

        let error = registry.register(described).expect_err("should be incompatible");
        assert_eq!(error.kind, ConfigErrorKind::IncompatibleOptions);
    }

    #[test]
    fn definitions_apply_prefix_to_every_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).expect("echo registers");
        registry.register_record::<User>().expect("record registers");

        let prefix = Callable::record::<Thoughts>();
        let definitions = registry.definitions(Some(&prefix)).expect("definitions build");
        let names: Vec<&str> = definitions.iter().map(ToolDefinition::name).collect();
        assert_eq!(names, vec!["Thoughts_and_echo", "Thoughts_and_User"]);

        let unnamed = registry
            .clone()
            .with_include_prefix_name(false)
            .definitions(Some(&prefix))
            .expect("definitions build");
        assert_eq!(unnamed[0].name(), "echo");
    }
}
