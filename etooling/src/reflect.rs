//! Reflects a callable's declared parameters into ordered field specifications.
//!
//! ```rust
//! use etooling::{Parameter, Signature, reflect};
//!
//! let signature = Signature::new("resize")
//!     .param(Parameter::typed::<u32>("width").describe("new width in pixels"))
//!     .param(Parameter::typed::<Option<u32>>("height").with_default(serde_json::Value::Null));
//!
//! let fields = reflect(&signature).expect("signature should reflect");
//! assert_eq!(fields[0].name, "width");
//! assert_eq!(fields[0].description.as_deref(), Some("new width in pixels"));
//! assert!(fields[0].is_required());
//! assert!(!fields[1].is_required());
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ConfigError;

/// Deserializes a JSON value into a concrete type and serializes it back.
pub type CoerceFn = fn(Value) -> Result<Value, serde_json::Error>;

type SchemaFn = fn(&mut SchemaGenerator) -> Schema;

#[derive(Clone)]
enum SchemaSource {
    Generated(SchemaFn),
    Fixed(Value),
}

fn subschema<T: JsonSchema>(generator: &mut SchemaGenerator) -> Schema {
    generator.subschema_for::<T>()
}

fn coerce_into<T: Serialize + DeserializeOwned>(value: Value) -> Result<Value, serde_json::Error> {
    let typed: T = serde_json::from_value(value)?;
    serde_json::to_value(typed)
}

/// A fully resolved static type that a parameter can be declared with.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    source: SchemaSource,
    coerce: Option<CoerceFn>,
}

impl TypeDescriptor {
    pub fn of<T>() -> Self
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        Self {
            name: T::schema_name(),
            source: SchemaSource::Generated(subschema::<T>),
            coerce: Some(coerce_into::<T>),
        }
    }

    /// A type known only by its schema. Values are accepted as-is.
    pub fn from_schema(name: impl Into<Cow<'static, str>>, schema: Value) -> Self {
        Self {
            name: name.into(),
            source: SchemaSource::Fixed(schema),
            coerce: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema for this type. Named definitions it needs are registered in `generator`.
    pub fn schema(&self, generator: &mut SchemaGenerator) -> Value {
        match &self.source {
            SchemaSource::Generated(schema_fn) => schema_fn(generator).to_value(),
            SchemaSource::Fixed(schema) => schema.clone(),
        }
    }

    pub fn coerce(&self, value: Value) -> Result<Value, serde_json::Error> {
        match self.coerce {
            Some(coerce) => coerce(value),
            None => Ok(value),
        }
    }

    /// True for arrays and for unions that admit an array (`Option<Vec<_>>` and friends).
    pub fn is_list_like(&self) -> bool {
        let mut generator = SchemaGenerator::default();
        is_list_schema(&self.schema(&mut generator))
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

fn is_list_schema(schema: &Value) -> bool {
    let Some(object) = schema.as_object() else {
        return false;
    };

    let typed_as_array = match object.get("type") {
        Some(Value::String(type_name)) => type_name == "array",
        Some(Value::Array(type_names)) => type_names.iter().any(|type_name| type_name == "array"),
        _ => false,
    };

    typed_as_array
        || ["anyOf", "oneOf"].iter().any(|key| {
            object
                .get(*key)
                .and_then(Value::as_array)
                .is_some_and(|branches| branches.iter().any(is_list_schema))
        })
}

/// Types that deferred annotations are resolved against.
#[derive(Debug, Clone, Default)]
pub struct TypeNamespace {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its schema name.
    pub fn with_type<T>(mut self) -> Self
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        let descriptor = TypeDescriptor::of::<T>();
        self.types.insert(descriptor.name().to_string(), descriptor);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) {
        self.types.insert(name.into(), descriptor);
    }

    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum DeclaredType {
    Resolved(TypeDescriptor),
    /// Referenced by name, looked up in the signature's namespace.
    Deferred(String),
    Annotated {
        inner: Box<DeclaredType>,
        metadata: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    #[default]
    Missing,
    Value(Value),
}

impl DefaultValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<DeclaredType>,
    pub default: DefaultValue,
}

impl Parameter {
    pub fn typed<T>(name: impl Into<String>) -> Self
    where
        T: JsonSchema + Serialize + DeserializeOwned,
    {
        Self::declared(name, DeclaredType::Resolved(TypeDescriptor::of::<T>()))
    }

    pub fn declared(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            annotation: Some(declared),
            default: DefaultValue::Missing,
        }
    }

    pub fn deferred(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::declared(name, DeclaredType::Deferred(type_name.into()))
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: DefaultValue::Missing,
        }
    }

    /// Attaches a human description as annotation metadata.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.annotation = match self.annotation.take() {
            Some(DeclaredType::Annotated { inner, mut metadata }) => {
                metadata.push(description);
                Some(DeclaredType::Annotated { inner, metadata })
            }
            Some(declared) => Some(DeclaredType::Annotated {
                inner: Box::new(declared),
                metadata: vec![description],
            }),
            None => None,
        };
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }
}

/// The reflectable signature of a plain callable.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub name: String,
    pub doc: Option<String>,
    pub parameters: Vec<Parameter>,
    pub namespace: Option<Arc<TypeNamespace>>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Namespace of the module that defines the callable (or, for methods, its owner).
    pub fn with_namespace(mut self, namespace: Arc<TypeNamespace>) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub declared_type: TypeDescriptor,
    pub description: Option<String>,
    pub default: DefaultValue,
}

impl FieldSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_missing()
    }
}

pub fn reflect(signature: &Signature) -> Result<Vec<FieldSpec>, ConfigError> {
    signature
        .parameters
        .iter()
        .map(|parameter| reflect_parameter(parameter, signature.namespace.as_deref()))
        .collect()
}

fn reflect_parameter(
    parameter: &Parameter,
    namespace: Option<&TypeNamespace>,
) -> Result<FieldSpec, ConfigError> {
    let annotation = parameter
        .annotation
        .as_ref()
        .ok_or_else(|| ConfigError::missing_annotation(&parameter.name))?;
    let (declared_type, description) = resolve_declared(annotation, namespace, &parameter.name)?;

    Ok(FieldSpec {
        name: parameter.name.clone(),
        declared_type,
        description,
        default: parameter.default.clone(),
    })
}

fn resolve_declared(
    declared: &DeclaredType,
    namespace: Option<&TypeNamespace>,
    parameter: &str,
) -> Result<(TypeDescriptor, Option<String>), ConfigError> {
    match declared {
        DeclaredType::Resolved(descriptor) => Ok((descriptor.clone(), None)),
        DeclaredType::Deferred(type_name) => namespace
            .and_then(|namespace| namespace.resolve(type_name))
            .map(|descriptor| (descriptor.clone(), None))
            .ok_or_else(|| ConfigError::unresolved_type(type_name, parameter)),
        DeclaredType::Annotated { inner, metadata } => {
            let (descriptor, nested) = resolve_declared(inner, namespace, parameter)?;
            Ok((descriptor, metadata.first().cloned().or(nested)))
        }
    }
}
