//! The reconciler: maps bound data into fields and submitted values back.
//!
//! [`StrictMapper`] walks a [`FieldGroup`] in declaration order. Fields
//! with custom accessors are handled here; every other field is delegated
//! to the configured [`FallbackMapper`], preserving relative order. No
//! accessor rejection escapes a submission: each one is classified and
//! either absorbed or converted into a field- or group-level error.

use crate::diff::{extra_values, keyed_entries};
use crate::error::{value_type_name, AccessError, BindingError, FactoryError};
use crate::field::{Accessor, Field, FieldGroup, Target, Writer};
use crate::value;
use crate::voter::ValueVoter;
use serde_json::Value;

/// Maps the fields this mapper does not handle itself.
///
/// Any field declared without custom accessors is handed over, in
/// declaration order, for both phases. The contract and behavior of the
/// implementation are entirely the caller's business.
pub trait FallbackMapper<T> {
    /// Read phase for delegated fields.
    fn map_data_to_fields(&self, data: Option<&T>, fields: &mut [&mut Field<T>]);

    /// Write phase for delegated fields.
    fn map_fields_to_data(&self, fields: &mut [&mut Field<T>], data: &mut Option<T>);
}

/// A fallback that leaves delegated fields untouched.
pub struct NoopFallback;

impl<T> FallbackMapper<T> for NoopFallback {
    fn map_data_to_fields(&self, _data: Option<&T>, _fields: &mut [&mut Field<T>]) {}

    fn map_fields_to_data(&self, _fields: &mut [&mut Field<T>], _data: &mut Option<T>) {}
}

/// Localizes user-visible messages before they reach the error sink.
///
/// Without a translator, raw messages are attached verbatim.
pub trait Translator {
    /// Map a raw message to its localized form.
    fn translate(&self, message: &str) -> String;
}

/// Reconciles submitted field values against a bound object.
///
/// Construction takes the fallback mapper; a translator and any number of
/// [`ValueVoter`]s are optional. One mapper serves any number of
/// sequential submissions; it never stores the bound object.
pub struct StrictMapper<T> {
    fallback: Box<dyn FallbackMapper<T>>,
    voters: Vec<Box<dyn ValueVoter>>,
    translator: Option<Box<dyn Translator>>,
}

impl<T> StrictMapper<T> {
    /// Create a mapper delegating unhandled fields to `fallback`.
    pub fn new(fallback: impl FallbackMapper<T> + 'static) -> Self {
        Self {
            fallback: Box::new(fallback),
            voters: Vec::new(),
            translator: None,
        }
    }

    /// Localize error messages with `translator`.
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Box::new(translator));
        self
    }

    /// Register a comparison voter. Voters are consulted in registration
    /// order before the built-in equality rule.
    pub fn with_voter(mut self, voter: impl ValueVoter + 'static) -> Self {
        self.voters.push(Box::new(voter));
        self
    }

    /// Read phase: fill each field's data from the bound object.
    ///
    /// A field whose getter rejects the object, or an absent object,
    /// reads as null: that is the "no data yet" case of an object still
    /// being created, not a failure.
    pub fn map_data_to_fields(&self, data: Option<&T>, group: &mut FieldGroup<T>) {
        let mut delegated: Vec<&mut Field<T>> = Vec::new();

        for field in group.fields_mut() {
            if field.is_unmapped() {
                delegated.push(field);
                continue;
            }
            let current = match data {
                Some(object) => match field.read(object) {
                    Ok(value) => value,
                    Err(cause) => {
                        tracing::debug!(
                            field = field.name(),
                            %cause,
                            "reader rejected the bound data; field reads as null"
                        );
                        Value::Null
                    }
                },
                None => Value::Null,
            };
            field.set_data(current);
        }

        self.fallback.map_data_to_fields(data, &mut delegated);
    }

    /// Write phase: apply each field's submitted value to the bound object.
    ///
    /// Single-value fields are written only when the submitted value
    /// differs from the original; collection fields receive remover calls
    /// for vanished entries before adder calls for new ones. Rejections
    /// are classified and recorded per field, never propagated.
    pub fn map_fields_to_data(&self, group: &mut FieldGroup<T>, data: &mut Option<T>) {
        let mut delegated: Vec<&mut Field<T>> = Vec::new();

        for field in group.fields_mut() {
            if field.is_unmapped() {
                delegated.push(field);
                continue;
            }
            self.write_field(field, data);
        }

        self.fallback.map_fields_to_data(&mut delegated, data);
    }

    /// Run one submission end to end.
    ///
    /// When the group has a factory and no bound object exists yet, the
    /// factory runs first; whatever object results (possibly none, if the
    /// factory rejected its arguments) then receives the write phase. The
    /// only error is a fatal factory-signature mismatch.
    pub fn submit(
        &self,
        group: &mut FieldGroup<T>,
        data: &mut Option<T>,
    ) -> Result<(), FactoryError> {
        if data.is_none() && group.has_factory() {
            *data = self.construct(group)?;
        }
        self.map_fields_to_data(group, data);
        Ok(())
    }

    /// Invoke the group's factory, if any, against the sibling fields.
    ///
    /// A constructor rejection is absorbed: the group records one error
    /// with its configured factory message (none when the message was
    /// cleared) and the result is `None`, so the write phase proceeds
    /// against an absent object.
    pub fn construct(&self, group: &mut FieldGroup<T>) -> Result<Option<T>, FactoryError> {
        let invoked = match group.factory() {
            None => return Ok(None),
            Some(factory) => factory.invoke(group.fields())?,
        };

        match invoked {
            Ok(object) => Ok(Some(object)),
            Err(cause) => {
                tracing::debug!(%cause, "factory rejected its arguments; group keeps no data");
                let message = group
                    .factory_error_message()
                    .map(|message| self.translate(message));
                if let Some(message) = message {
                    group.record_error(BindingError::caused(message, cause));
                }
                Ok(None)
            }
        }
    }

    /// The equality rule: voters first, then strict structural equality
    /// with the date/time instant fallback.
    pub fn values_equal(&self, left: &Value, right: &Value) -> bool {
        for voter in &self.voters {
            if let Some(verdict) = voter.vote(left, right) {
                return verdict;
            }
        }
        value::values_equal(left, right)
    }

    fn write_field(&self, field: &mut Field<T>, data: &mut Option<T>) {
        let original = match data.as_ref() {
            Some(object) => match field.read(object) {
                Ok(value) => value,
                Err(cause) => {
                    tracing::debug!(
                        field = field.name(),
                        %cause,
                        "reader rejected the bound data; diffing against the empty value"
                    );
                    field.empty_value()
                }
            },
            None => field.empty_value(),
        };
        let submitted = field.data().clone();

        let outcome = match field.accessor() {
            Accessor::None => return,
            Accessor::Replace { update, .. } => {
                self.write_single(field.name(), update, &submitted, &original, data)
            }
            Accessor::SetDiff { add, remove, .. } => {
                self.write_collection(field.name(), add, remove, &submitted, &original, data)
            }
        };

        if let Err(cause) = outcome {
            self.record_rejection(field, cause, &submitted);
        }
    }

    fn write_single(
        &self,
        name: &str,
        update: &Writer<T>,
        submitted: &Value,
        original: &Value,
        data: &mut Option<T>,
    ) -> Result<(), AccessError> {
        match data.as_mut() {
            // Without an object the updater still runs once, so an
            // inherent value rejection surfaces on the field.
            None => update(submitted, &mut Target::absent()),
            Some(object) => {
                if self.values_equal(submitted, original) {
                    tracing::debug!(field = name, "submitted value unchanged; skipping update");
                    Ok(())
                } else {
                    update(submitted, &mut Target::present(object))
                }
            }
        }
    }

    fn write_collection(
        &self,
        name: &str,
        add: &Writer<T>,
        remove: &Writer<T>,
        submitted: &Value,
        original: &Value,
        data: &mut Option<T>,
    ) -> Result<(), AccessError> {
        if !submitted.is_null() && !value::is_collection(submitted) {
            tracing::warn!(
                field = name,
                found = value_type_name(submitted),
                "submitted value is not a collection; treating it as empty"
            );
        }

        let original_entries = keyed_entries(original);
        let submitted_entries = keyed_entries(submitted);
        let added = extra_values(&original_entries, &submitted_entries, |a, b| {
            self.values_equal(a, b)
        });
        let removed = extra_values(&submitted_entries, &original_entries, |a, b| {
            self.values_equal(a, b)
        });

        // Removals run first: an updated entry may reuse a removed key.
        for entry in removed.values() {
            invoke(remove, entry, data)?;
        }
        for entry in added.values() {
            invoke(add, entry, data)?;
        }
        Ok(())
    }

    fn record_rejection(&self, field: &mut Field<T>, cause: AccessError, submitted: &Value) {
        if matches!(cause, AccessError::BoundObjectRejected) {
            tracing::debug!(
                field = field.name(),
                "bound object rejected the write; a group-level error covers it"
            );
            return;
        }
        if submitted.is_null() && field.is_not_null() {
            tracing::debug!(
                field = field.name(),
                "null submitted on a not-null field; the constraint layer reports it"
            );
            return;
        }
        // Collection rejections surface on the entry fields, and a field
        // that already failed transformation keeps its single error.
        if value::is_collection(submitted) || field.transformation_failure().is_some() {
            return;
        }
        let Some(message) = field.write_error_message() else {
            return;
        };
        let message = self.translate(message);
        field.record_error(BindingError::caused(message, cause));
    }

    fn translate(&self, message: &str) -> String {
        match &self.translator {
            Some(translator) => translator.translate(message),
            None => message.to_owned(),
        }
    }
}

fn invoke<T>(
    writer: &Writer<T>,
    entry: &Value,
    data: &mut Option<T>,
) -> Result<(), AccessError> {
    match data.as_mut() {
        Some(object) => writer(entry, &mut Target::present(object)),
        None => writer(entry, &mut Target::absent()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Note {
        text: String,
    }

    fn text_field(calls: Rc<RefCell<usize>>) -> Field<Note> {
        Field::builder("text")
            .get_value(|note: &Note| Ok(json!(note.text)))
            .update_value(move |value, target| {
                *calls.borrow_mut() += 1;
                let text = value
                    .as_str()
                    .ok_or_else(|| AccessError::expected("string", value))?;
                target.object()?.text = text.to_owned();
                Ok(())
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_equal_value_skips_the_updater() {
        let calls = Rc::new(RefCell::new(0));
        let mut group = FieldGroup::new().with_field(text_field(calls.clone()));
        let mapper = StrictMapper::new(NoopFallback);
        let mut data = Some(Note {
            text: "same".to_owned(),
        });

        group.submit(json!({"text": "same"}));
        mapper.map_fields_to_data(&mut group, &mut data);

        assert_eq!(*calls.borrow(), 0);
        assert!(group.is_valid());
    }

    #[test]
    fn test_changed_value_runs_the_updater() {
        let calls = Rc::new(RefCell::new(0));
        let mut group = FieldGroup::new().with_field(text_field(calls.clone()));
        let mapper = StrictMapper::new(NoopFallback);
        let mut data = Some(Note {
            text: "old".to_owned(),
        });

        group.submit(json!({"text": "new"}));
        mapper.map_fields_to_data(&mut group, &mut data);

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(data.unwrap().text, "new");
    }

    #[test]
    fn test_voter_verdict_overrides_the_builtin_rule() {
        struct AlwaysEqual;
        impl ValueVoter for AlwaysEqual {
            fn vote(&self, _: &Value, _: &Value) -> Option<bool> {
                Some(true)
            }
        }

        let calls = Rc::new(RefCell::new(0));
        let mut group = FieldGroup::new().with_field(text_field(calls.clone()));
        let mapper = StrictMapper::new(NoopFallback).with_voter(AlwaysEqual);
        let mut data = Some(Note {
            text: "old".to_owned(),
        });

        group.submit(json!({"text": "new"}));
        mapper.map_fields_to_data(&mut group, &mut data);

        // The voter declared the values equal, so the write was skipped.
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(data.unwrap().text, "old");
    }

    #[test]
    fn test_equal_instants_in_different_offsets_skip_the_updater() {
        let calls = Rc::new(RefCell::new(0));
        let field = Field::builder("at")
            .get_value(|_: &Note| Ok(json!("2020-01-01T00:00:00Z")))
            .update_value({
                let calls = calls.clone();
                move |_, _| {
                    *calls.borrow_mut() += 1;
                    Ok(())
                }
            })
            .build()
            .unwrap();
        let mut group = FieldGroup::new().with_field(field);
        let mapper = StrictMapper::new(NoopFallback);
        let mut data = Some(Note {
            text: String::new(),
        });

        group.submit(json!({"at": "2019-12-31T19:00:00-05:00"}));
        mapper.map_fields_to_data(&mut group, &mut data);

        assert_eq!(*calls.borrow(), 0);
    }
}
