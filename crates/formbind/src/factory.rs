//! Construction of a group's bound object from sibling field values.
//!
//! A [`Factory`] replaces per-field mutation for groups whose object must
//! be built whole: arguments are declared as an explicit ordered list of
//! sibling field names (no runtime reflection), resolved against the
//! group, and handed to the constructor closure as [`ResolvedArgs`].

use crate::error::{value_type_name, AccessError, FactoryError};
use crate::field::Field;
use serde_json::Value;

/// Name used for the sentinel slot bound to the form itself.
const FORM_SLOT: &str = "form";

/// One declared factory argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactoryArg {
    /// Bind the named sibling field's current data.
    Field(String),
    /// Bind a read-only view of the sibling fields instead of a value.
    ///
    /// This is the explicit stand-in for "the constructor wants the form
    /// itself"; there is no type-driven magic.
    Form,
}

impl FactoryArg {
    /// Declare a field-value argument.
    #[inline]
    pub fn field(name: impl Into<String>) -> Self {
        FactoryArg::Field(name.into())
    }

    /// Declare the form-view argument.
    #[inline]
    pub fn form() -> Self {
        FactoryArg::Form
    }
}

impl From<&str> for FactoryArg {
    fn from(name: &str) -> Self {
        FactoryArg::Field(name.to_owned())
    }
}

impl From<String> for FactoryArg {
    fn from(name: String) -> Self {
        FactoryArg::Field(name)
    }
}

type BuildFn<T> = Box<dyn Fn(&ResolvedArgs<'_, T>) -> Result<T, AccessError>>;

/// Constructs the bound object for a field group.
///
/// ```
/// use formbind::{AccessError, Factory};
///
/// struct Post { subject: String, body: String }
///
/// let factory = Factory::new(["first", "second"], |args| {
///     Ok(Post {
///         subject: args.str(0)?.to_owned(),
///         body: args.str(1)?.to_owned(),
///     })
/// });
/// ```
pub struct Factory<T> {
    args: Vec<FactoryArg>,
    build: BuildFn<T>,
}

impl<T> Factory<T> {
    /// Declare a factory from an ordered argument list and a constructor.
    pub fn new<I, A, F>(args: I, build: F) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<FactoryArg>,
        F: Fn(&ResolvedArgs<'_, T>) -> Result<T, AccessError> + 'static,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            build: Box::new(build),
        }
    }

    /// The declared arguments, in order.
    #[inline]
    pub fn args(&self) -> &[FactoryArg] {
        &self.args
    }

    /// Resolve the declared arguments against the sibling fields and invoke
    /// the constructor.
    ///
    /// The outer error is fatal (an argument named a missing field); the
    /// inner one is the constructor's own rejection, which the mapper
    /// absorbs into a group-level error.
    pub(crate) fn invoke<'a>(
        &'a self,
        fields: &'a [Field<T>],
    ) -> Result<Result<T, AccessError>, FactoryError> {
        let mut slots = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg {
                FactoryArg::Form => slots.push(Slot {
                    name: FORM_SLOT,
                    kind: SlotKind::Form(fields),
                }),
                FactoryArg::Field(name) => {
                    let field = fields
                        .iter()
                        .find(|f| f.name() == name.as_str())
                        .ok_or_else(|| FactoryError::unknown_field(name.as_str()))?;
                    slots.push(Slot {
                        name: name.as_str(),
                        kind: SlotKind::Value(field.data()),
                    });
                }
            }
        }

        Ok((self.build)(&ResolvedArgs { slots }))
    }
}

struct Slot<'a, T> {
    name: &'a str,
    kind: SlotKind<'a, T>,
}

enum SlotKind<'a, T> {
    Value(&'a Value),
    Form(&'a [Field<T>]),
}

/// The factory's declared arguments, resolved against the sibling fields.
///
/// Typed accessors fail with [`AccessError::ArgumentRejected`] naming the
/// argument and the value type actually found, so a constructor given a
/// null where it expected a string degrades into one group-level error
/// instead of a crash.
pub struct ResolvedArgs<'a, T> {
    slots: Vec<Slot<'a, T>>,
}

impl<'a, T> ResolvedArgs<'a, T> {
    /// Number of resolved arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no arguments were declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, index: usize) -> Result<&Slot<'a, T>, AccessError> {
        self.slots.get(index).ok_or_else(|| {
            AccessError::rejected(format!(
                "argument {index} is out of range; {} arguments were declared",
                self.slots.len()
            ))
        })
    }

    /// The raw value of the argument at `index`.
    pub fn value(&self, index: usize) -> Result<&'a Value, AccessError> {
        let slot = self.slot(index)?;
        match &slot.kind {
            SlotKind::Value(value) => Ok(*value),
            SlotKind::Form(_) => Err(AccessError::rejected(format!(
                "argument {index} ({}) is the form itself, not a field value",
                slot.name
            ))),
        }
    }

    /// The argument at `index` as a string.
    pub fn str(&self, index: usize) -> Result<&'a str, AccessError> {
        let value = self.value(index)?;
        value
            .as_str()
            .ok_or_else(|| self.mismatch(index, "string", value))
    }

    /// The argument at `index` as a signed integer.
    pub fn i64(&self, index: usize) -> Result<i64, AccessError> {
        let value = self.value(index)?;
        value
            .as_i64()
            .ok_or_else(|| self.mismatch(index, "integer", value))
    }

    /// The argument at `index` as a float.
    pub fn f64(&self, index: usize) -> Result<f64, AccessError> {
        let value = self.value(index)?;
        value
            .as_f64()
            .ok_or_else(|| self.mismatch(index, "number", value))
    }

    /// The argument at `index` as a boolean.
    pub fn bool(&self, index: usize) -> Result<bool, AccessError> {
        let value = self.value(index)?;
        value
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "boolean", value))
    }

    /// The argument at `index` as the form view.
    pub fn form(&self, index: usize) -> Result<FormView<'a, T>, AccessError> {
        let slot = self.slot(index)?;
        match &slot.kind {
            SlotKind::Form(fields) => Ok(FormView { fields: *fields }),
            SlotKind::Value(_) => Err(AccessError::rejected(format!(
                "argument {index} ({}) is a field value, not the form",
                slot.name
            ))),
        }
    }

    fn mismatch(&self, index: usize, expected: &str, found: &Value) -> AccessError {
        let name = self.slots[index].name;
        AccessError::rejected(format!(
            "argument {index} ({name}): expected {expected}, found {}",
            value_type_name(found)
        ))
    }
}

/// Read-only view of a group's fields, bound via [`FactoryArg::Form`].
pub struct FormView<'a, T> {
    fields: &'a [Field<T>],
}

impl<'a, T> FormView<'a, T> {
    /// Look up a sibling field by name.
    pub fn field(&self, name: &str) -> Option<&'a Field<T>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Look up a sibling field's current data by name.
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.field(name).map(Field::data)
    }

    /// Number of sibling fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the group has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
