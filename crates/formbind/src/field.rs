//! Field declarations, accessor configuration, and field groups.
//!
//! A [`Field`] is one leaf of the submission tree. Its accessor
//! configuration is chosen once, at declaration time, through
//! [`FieldBuilder::build`], which validates the combination and collapses
//! the four optional slots into a single tagged [`Accessor`] strategy.

use crate::error::{value_type_name, AccessError, BindingError, ConfigError};
use crate::factory::Factory;
use serde_json::Value;

/// Default user-visible message for a rejected write.
pub const DEFAULT_WRITE_ERROR_MESSAGE: &str = "Cannot write this type";

/// Default user-visible message for a rejected factory invocation.
pub const DEFAULT_FACTORY_ERROR_MESSAGE: &str =
    "Some fields are not valid, please correct them.";

/// Reads a field's value out of the bound object.
pub type Getter<T> = Box<dyn Fn(&T) -> Result<Value, AccessError>>;

/// Writes a submitted value (or one collection entry) into the bound object.
pub type Writer<T> = Box<dyn Fn(&Value, &mut Target<'_, T>) -> Result<(), AccessError>>;

/// Handle to the bound object passed to write accessors.
///
/// The object may be absent: a factory that rejected its arguments leaves
/// the group without data, and the write phase still invokes accessors so
/// value rejections can surface. Accessors convert the value first, then
/// claim the object:
///
/// ```
/// use formbind::{AccessError, Target, Value};
///
/// struct Post { subject: String }
///
/// fn update(value: &Value, target: &mut Target<'_, Post>) -> Result<(), AccessError> {
///     let subject = value.as_str().ok_or_else(|| AccessError::expected("string", value))?;
///     target.object()?.subject = subject.to_owned();
///     Ok(())
/// }
/// ```
pub struct Target<'a, T> {
    inner: Option<&'a mut T>,
}

impl<'a, T> Target<'a, T> {
    pub(crate) fn present(object: &'a mut T) -> Self {
        Self {
            inner: Some(object),
        }
    }

    pub(crate) fn absent() -> Self {
        Self { inner: None }
    }

    /// Claim the bound object, or fail with [`AccessError::BoundObjectRejected`].
    pub fn object(&mut self) -> Result<&mut T, AccessError> {
        self.inner
            .as_deref_mut()
            .ok_or(AccessError::BoundObjectRejected)
    }

    /// Whether an object is bound.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.inner.is_some()
    }
}

/// The write strategy a field was declared with.
///
/// Exactly one variant holds per field, chosen at declaration time; the
/// mapper never re-checks slot combinations during a submission.
pub enum Accessor<T> {
    /// No custom accessors; the field is delegated to the fallback mapper.
    None,
    /// Read with `get`, replace the whole value with `update`.
    Replace {
        /// Reads the current value.
        get: Getter<T>,
        /// Writes the submitted value when it differs.
        update: Writer<T>,
    },
    /// Read with `get`, reconcile collection membership with `add`/`remove`.
    SetDiff {
        /// Reads the current collection.
        get: Getter<T>,
        /// Adds one entry missing from the original collection.
        add: Writer<T>,
        /// Removes one entry missing from the submission.
        remove: Writer<T>,
    },
}

impl<T> Accessor<T> {
    pub(crate) fn getter(&self) -> Option<&Getter<T>> {
        match self {
            Accessor::None => None,
            Accessor::Replace { get, .. } | Accessor::SetDiff { get, .. } => Some(get),
        }
    }
}

/// One named leaf of the submission tree.
///
/// A field carries its accessor configuration (immutable after
/// [`FieldBuilder::build`]), its current data, and the errors attached to
/// it during the running submission.
pub struct Field<T> {
    name: String,
    accessor: Accessor<T>,
    multiple: bool,
    write_error_message: Option<String>,
    not_null: bool,
    data: Value,
    transformation_failure: Option<String>,
    errors: Vec<BindingError>,
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("multiple", &self.multiple)
            .field("write_error_message", &self.write_error_message)
            .field("not_null", &self.not_null)
            .field("data", &self.data)
            .field("transformation_failure", &self.transformation_failure)
            .field("errors", &self.errors)
            .finish()
    }
}

impl<T> Field<T> {
    /// Start declaring a field.
    pub fn builder(name: impl Into<String>) -> FieldBuilder<T> {
        FieldBuilder::new(name)
    }

    /// Declare a field with no custom accessors.
    ///
    /// Such a field is always delegated to the fallback mapper.
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessor: Accessor::None,
            multiple: false,
            write_error_message: Some(DEFAULT_WRITE_ERROR_MESSAGE.to_owned()),
            not_null: false,
            data: Value::Null,
            transformation_failure: None,
            errors: Vec::new(),
        }
    }

    /// The field's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared write strategy.
    #[inline]
    pub fn accessor(&self) -> &Accessor<T> {
        &self.accessor
    }

    /// Whether the field represents a collection.
    #[inline]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Whether a not-null constraint is attached to the field.
    #[inline]
    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    /// The message attached on a rejected write, when one is configured.
    #[inline]
    pub fn write_error_message(&self) -> Option<&str> {
        self.write_error_message.as_deref()
    }

    /// The field's current data.
    ///
    /// The read phase fills this from the bound object; a submission
    /// overwrites it with the submitted value.
    #[inline]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Set the field's current data.
    #[inline]
    pub fn set_data(&mut self, value: Value) {
        self.data = value;
    }

    /// Record a transformation failure reported by the view layer.
    ///
    /// A field with a transformation failure never receives an additional
    /// write error for the same submission.
    pub fn set_transformation_failure(&mut self, message: impl Into<String>) {
        self.transformation_failure = Some(message.into());
    }

    /// The transformation failure, when one was recorded.
    #[inline]
    pub fn transformation_failure(&self) -> Option<&str> {
        self.transformation_failure.as_deref()
    }

    /// Errors attached to this field during the running submission.
    #[inline]
    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    /// Whether the field has neither errors nor a transformation failure.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.transformation_failure.is_none()
    }

    pub(crate) fn is_unmapped(&self) -> bool {
        matches!(self.accessor, Accessor::None)
    }

    pub(crate) fn read(&self, object: &T) -> Result<Value, AccessError> {
        match self.accessor.getter() {
            Some(get) => get(object),
            None => Err(AccessError::NotReady),
        }
    }

    /// The value a missing bound object reads as.
    pub(crate) fn empty_value(&self) -> Value {
        if self.multiple {
            Value::Array(Vec::new())
        } else {
            Value::Null
        }
    }

    pub(crate) fn record_error(&mut self, error: BindingError) {
        self.errors.push(error);
    }
}

/// Declares a field and validates its accessor combination.
///
/// The four accessor slots are independently optional here; [`build`]
/// rejects every combination other than none, getter + updater, and
/// getter + adder + remover.
///
/// [`build`]: FieldBuilder::build
pub struct FieldBuilder<T> {
    name: String,
    get: Option<Getter<T>>,
    update: Option<Writer<T>>,
    add: Option<Writer<T>>,
    remove: Option<Writer<T>>,
    multiple: bool,
    write_error_message: Option<String>,
    not_null: bool,
}

impl<T> FieldBuilder<T> {
    /// Start declaring a field with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            get: None,
            update: None,
            add: None,
            remove: None,
            multiple: false,
            write_error_message: Some(DEFAULT_WRITE_ERROR_MESSAGE.to_owned()),
            not_null: false,
        }
    }

    /// Configure the getter.
    pub fn get_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<Value, AccessError> + 'static,
    {
        self.get = Some(Box::new(f));
        self
    }

    /// Configure the single-value updater.
    pub fn update_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &mut Target<'_, T>) -> Result<(), AccessError> + 'static,
    {
        self.update = Some(Box::new(f));
        self
    }

    /// Configure the collection adder.
    pub fn add_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &mut Target<'_, T>) -> Result<(), AccessError> + 'static,
    {
        self.add = Some(Box::new(f));
        self
    }

    /// Configure the collection remover.
    pub fn remove_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &mut Target<'_, T>) -> Result<(), AccessError> + 'static,
    {
        self.remove = Some(Box::new(f));
        self
    }

    /// Mark the field as collection-valued.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Replace the default write error message.
    pub fn write_error_message(mut self, message: impl Into<String>) -> Self {
        self.write_error_message = Some(message.into());
        self
    }

    /// Suppress the write error message entirely.
    ///
    /// Rejected writes on this field stay silent; used when a child field
    /// already shows its own error.
    pub fn without_write_error_message(mut self) -> Self {
        self.write_error_message = None;
        self
    }

    /// Mark the field as carrying a not-null constraint.
    ///
    /// A rejected write of a null value on such a field is absorbed: the
    /// constraint layer reports it instead.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Validate the accessor combination and build the field.
    pub fn build(self) -> Result<Field<T>, ConfigError> {
        if self.add.is_some() && self.remove.is_none() {
            return Err(ConfigError::AdderWithoutRemover);
        }
        if self.remove.is_some() && self.add.is_none() {
            return Err(ConfigError::RemoverWithoutAdder);
        }
        if self.update.is_some() && self.add.is_some() {
            return Err(ConfigError::AmbiguousWriteStrategy);
        }
        let has_writer = self.update.is_some() || self.add.is_some();
        if has_writer && self.get.is_none() {
            return Err(ConfigError::WriterWithoutGetter);
        }
        if self.get.is_some() && !has_writer {
            return Err(ConfigError::GetterWithoutWriter);
        }

        let accessor = match (self.get, self.update, self.add, self.remove) {
            (None, None, None, None) => Accessor::None,
            (Some(get), Some(update), None, None) => Accessor::Replace { get, update },
            (Some(get), None, Some(add), Some(remove)) => {
                Accessor::SetDiff { get, add, remove }
            }
            _ => unreachable!("accessor combinations are validated above"),
        };

        Ok(Field {
            name: self.name,
            accessor,
            multiple: self.multiple,
            write_error_message: self.write_error_message,
            not_null: self.not_null,
            data: Value::Null,
            transformation_failure: None,
            errors: Vec::new(),
        })
    }
}

/// An ordered group of sibling fields bound to one object.
///
/// The group owns the fields, an optional [`Factory`] that constructs the
/// bound object from sibling values, and the group-level error sink.
pub struct FieldGroup<T> {
    fields: Vec<Field<T>>,
    factory: Option<Factory<T>>,
    factory_error_message: Option<String>,
    errors: Vec<BindingError>,
}

impl<T> FieldGroup<T> {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            factory: None,
            factory_error_message: Some(DEFAULT_FACTORY_ERROR_MESSAGE.to_owned()),
            errors: Vec::new(),
        }
    }

    /// Append a field, keeping declaration order.
    pub fn with_field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Configure a factory that constructs the bound object.
    pub fn with_factory(mut self, factory: Factory<T>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Replace the default factory error message.
    pub fn with_factory_error_message(mut self, message: impl Into<String>) -> Self {
        self.factory_error_message = Some(message.into());
        self
    }

    /// Suppress the factory error message entirely.
    pub fn without_factory_error_message(mut self) -> Self {
        self.factory_error_message = None;
        self
    }

    /// The fields, in declaration order.
    #[inline]
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Iterate over the fields mutably, in declaration order.
    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field<T>> + '_ {
        self.fields.iter_mut()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Look up a field by name, mutably.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field<T>> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    /// Whether a factory is configured.
    #[inline]
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// The factory error message, when one is configured.
    #[inline]
    pub fn factory_error_message(&self) -> Option<&str> {
        self.factory_error_message.as_deref()
    }

    /// Distribute a submission to the fields by name.
    ///
    /// Each field receives the same-named entry of the submitted object;
    /// fields without an entry receive null, as does every field when the
    /// submission is not an object.
    pub fn submit(&mut self, values: Value) {
        let map = match values {
            Value::Object(map) => map,
            other => {
                tracing::warn!(
                    found = value_type_name(&other),
                    "submission is not an object; fields receive null"
                );
                serde_json::Map::new()
            }
        };
        for field in &mut self.fields {
            let value = map.get(field.name()).cloned().unwrap_or(Value::Null);
            field.set_data(value);
        }
    }

    /// Group-level errors attached during the running submission.
    #[inline]
    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    /// Whether the group and all its fields are error-free.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.fields.iter().all(Field::is_valid)
    }

    pub(crate) fn factory(&self) -> Option<&Factory<T>> {
        self.factory.as_ref()
    }

    pub(crate) fn record_error(&mut self, error: BindingError) {
        self.errors.push(error);
    }
}

impl<T> Default for FieldGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
