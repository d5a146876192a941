/// Declares one typed [`Parameter`](crate::Parameter), optionally with a JSON default.
///
/// The default is a single JSON token tree, so negative numbers need parentheses.
///
/// ```rust
/// use easytools::tool_param;
///
/// let size = tool_param!(size: Option<f64> = null);
/// assert_eq!(size.name, "size");
/// assert!(!size.default.is_missing());
///
/// let offset = tool_param!(offset: i64 = (-1));
/// assert!(!offset.default.is_missing());
/// ```
#[macro_export]
macro_rules! tool_param {
    ($name:ident : $ty:ty = $default:tt) => {
        $crate::etooling::Parameter::typed::<$ty>(stringify!($name))
            .with_default($crate::serde_json::json!($default))
    };
    ($name:ident : $ty:ty) => {
        $crate::etooling::Parameter::typed::<$ty>(stringify!($name))
    };
}

/// Builds a [`Signature`](crate::Signature) from a name, an optional doc, and typed parameters.
///
/// ```rust
/// use easytools::tool_signature;
///
/// let signature = tool_signature!(
///     "simple_function",
///     doc = "simple function does something",
///     { count: i64, size: Option<f64> = null },
/// );
///
/// assert_eq!(signature.name, "simple_function");
/// assert_eq!(signature.parameters.len(), 2);
/// assert!(!signature.parameters[1].default.is_missing());
/// ```
#[macro_export]
macro_rules! tool_signature {
    (
        $name:expr $(, doc = $doc:expr)?,
        { $($param:ident : $ty:ty $(= $default:tt)?),* $(,)? } $(,)?
    ) => {{
        let signature = $crate::etooling::Signature::new($name);
        $(let signature = signature.with_doc($doc);)?
        $(let signature = signature.param($crate::tool_param!($param : $ty $(= $default)?));)*
        signature
    }};
    ($name:expr $(, doc = $doc:expr)? $(,)?) => {{
        let signature = $crate::etooling::Signature::new($name);
        $(let signature = signature.with_doc($doc);)?
        signature
    }};
}
