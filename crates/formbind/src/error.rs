//! Error types for formbind operations.

use serde::Serialize;
use thiserror::Error;

/// An invalid accessor combination, detected when a field is declared.
///
/// Configuration errors are fatal: they surface from [`FieldBuilder::build`]
/// before any submission can run, and are never caught by the mapper.
///
/// [`FieldBuilder::build`]: crate::FieldBuilder::build
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// An adder was configured without a matching remover.
    #[error("cannot use an adder without a remover")]
    AdderWithoutRemover,

    /// A remover was configured without a matching adder.
    #[error("cannot use a remover without an adder")]
    RemoverWithoutAdder,

    /// Both a single-value updater and an adder were configured.
    #[error("cannot use a single-value updater together with an adder and remover")]
    AmbiguousWriteStrategy,

    /// An updater, adder or remover was configured without a getter to diff against.
    #[error("an updater, adder or remover requires a getter")]
    WriterWithoutGetter,

    /// A getter was configured with nothing to write through.
    #[error("a getter requires an updater, or an adder and remover")]
    GetterWithoutWriter,
}

/// A fatal mismatch between a factory's declared arguments and the field group.
///
/// Unlike an [`AccessError`] raised *inside* a factory, an unresolvable
/// argument name is a wiring bug: it is re-raised to the caller and never
/// converted into a group-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// A declared argument names a field that does not exist in the group.
    #[error(
        "factory argument {name:?} does not match any field; \
         make sure your factory signature matches form fields"
    )]
    UnknownField {
        /// The argument name that failed to resolve.
        name: String,
    },
}

impl FactoryError {
    /// Create an unknown-field error.
    #[inline]
    pub fn unknown_field(name: impl Into<String>) -> Self {
        FactoryError::UnknownField { name: name.into() }
    }
}

/// Why an accessor invocation was rejected.
///
/// Accessors report failure through explicit variants instead of unwinding,
/// so the mapper can classify each rejection without inspecting message
/// text. All three variants are recovered locally during a submission.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessError {
    /// The bound data does not exist yet or has the wrong shape.
    ///
    /// During the read phase this is the "object is being created for the
    /// first time" case; the field's value becomes null.
    #[error("bound data is not ready")]
    NotReady,

    /// The bound-object argument itself was unusable.
    ///
    /// Raised by [`Target::object`] when no object is bound. The mapper
    /// absorbs this silently: a group-level error already covers it.
    ///
    /// [`Target::object`]: crate::Target::object
    #[error("the bound object argument was rejected")]
    BoundObjectRejected,

    /// The value argument could not be accepted.
    #[error("value argument rejected: {reason}")]
    ArgumentRejected {
        /// What the accessor expected and what it got instead.
        reason: String,
    },
}

impl AccessError {
    /// Create an argument rejection with the given reason.
    #[inline]
    pub fn rejected(reason: impl Into<String>) -> Self {
        AccessError::ArgumentRejected {
            reason: reason.into(),
        }
    }

    /// Create an argument rejection describing a type mismatch.
    #[inline]
    pub fn expected(what: &str, found: &serde_json::Value) -> Self {
        Self::rejected(format!("expected {what}, found {}", value_type_name(found)))
    }
}

/// An error attached to a field or a field group during a submission.
///
/// This is the error-sink entry: a user-visible (possibly translated)
/// message plus the rejection that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingError {
    /// The user-visible message.
    pub message: String,
    /// The rejection that produced this error, when one exists.
    pub cause: Option<AccessError>,
}

impl BindingError {
    /// Create an error with a message and no cause.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an error carrying the rejection that produced it.
    #[inline]
    pub fn caused(message: impl Into<String>, cause: AccessError) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause),
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
