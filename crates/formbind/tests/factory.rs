//! Factory resolution and invocation through the mapper.

use formbind::{
    AccessError, Factory, FactoryArg, FactoryError, Field, FieldGroup, NoopFallback,
    StrictMapper, Translator,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, PartialEq)]
struct Ticket {
    title: String,
    seats: i64,
}

fn ticket_group(factory: Factory<Ticket>) -> FieldGroup<Ticket> {
    FieldGroup::new()
        .with_field(Field::unmapped("title"))
        .with_field(Field::unmapped("seats"))
        .with_factory(factory)
}

#[test]
fn test_factory_receives_typed_sibling_values() {
    let factory = Factory::new(["title", "seats"], |args| {
        Ok(Ticket {
            title: args.str(0)?.to_owned(),
            seats: args.i64(1)?,
        })
    });
    let mut group = ticket_group(factory);
    let mapper = StrictMapper::new(NoopFallback);
    let mut data: Option<Ticket> = None;

    group.submit(json!({"title": "Opening night", "seats": 2}));
    mapper.submit(&mut group, &mut data).unwrap();

    assert_eq!(
        data,
        Some(Ticket {
            title: "Opening night".to_owned(),
            seats: 2,
        })
    );
}

#[test]
fn test_form_sentinel_binds_a_view_of_the_siblings() {
    let factory = Factory::new([FactoryArg::form()], |args| {
        let form = args.form(0)?;
        let title = form
            .value("title")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AccessError::rejected("title must be a string"))?;
        let seats = form.len() as i64;
        Ok(Ticket {
            title: title.to_owned(),
            seats,
        })
    });
    let mut group = ticket_group(factory);
    let mapper = StrictMapper::new(NoopFallback);
    let mut data: Option<Ticket> = None;

    group.submit(json!({"title": "Opening night", "seats": 2}));
    mapper.submit(&mut group, &mut data).unwrap();

    let ticket = data.unwrap();
    assert_eq!(ticket.title, "Opening night");
    assert_eq!(ticket.seats, 2);
}

#[test]
fn test_an_unresolvable_argument_is_fatal() {
    let factory = Factory::new(["headline"], |args| {
        Ok(Ticket {
            title: args.str(0)?.to_owned(),
            seats: 0,
        })
    });
    let mut group = ticket_group(factory);
    let mapper = StrictMapper::new(NoopFallback);
    let mut data: Option<Ticket> = None;

    group.submit(json!({"title": "Opening night"}));
    let err = mapper.submit(&mut group, &mut data).unwrap_err();

    assert_eq!(err, FactoryError::unknown_field("headline"));
    assert!(err.to_string().contains("factory signature matches form fields"));
    // Fatal errors are not converted into group errors.
    assert!(group.errors().is_empty());
}

#[test]
fn test_factory_is_skipped_when_data_already_exists() {
    let invocations = Rc::new(RefCell::new(0));
    let factory = {
        let invocations = invocations.clone();
        Factory::new(["title"], move |args| {
            *invocations.borrow_mut() += 1;
            Ok(Ticket {
                title: args.str(0)?.to_owned(),
                seats: 0,
            })
        })
    };
    let mut group = ticket_group(factory);
    let mapper = StrictMapper::new(NoopFallback);
    let mut data = Some(Ticket {
        title: "existing".to_owned(),
        seats: 1,
    });

    group.submit(json!({"title": "ignored"}));
    mapper.submit(&mut group, &mut data).unwrap();

    assert_eq!(*invocations.borrow(), 0);
    assert_eq!(data.unwrap().title, "existing");
}

#[test]
fn test_rejection_uses_the_default_factory_message() {
    let factory = Factory::new(["title"], |args| {
        Ok(Ticket {
            title: args.str(0)?.to_owned(),
            seats: 0,
        })
    });
    let mut group = ticket_group(factory);
    let mapper = StrictMapper::new(NoopFallback);
    let mut data: Option<Ticket> = None;

    group.submit(json!({"title": null}));
    mapper.submit(&mut group, &mut data).unwrap();

    assert!(data.is_none());
    assert_eq!(group.errors().len(), 1);
    assert_eq!(
        group.errors()[0].message,
        "Some fields are not valid, please correct them."
    );
}

struct Shouting;

impl Translator for Shouting {
    fn translate(&self, message: &str) -> String {
        message.to_uppercase()
    }
}

#[test]
fn test_factory_errors_are_translated() {
    let factory = Factory::new(["title"], |args| {
        Ok(Ticket {
            title: args.str(0)?.to_owned(),
            seats: 0,
        })
    });
    let mut group = ticket_group(factory).with_factory_error_message("cannot create ticket");
    let mapper = StrictMapper::new(NoopFallback).with_translator(Shouting);
    let mut data: Option<Ticket> = None;

    group.submit(json!({"title": null}));
    mapper.submit(&mut group, &mut data).unwrap();

    assert_eq!(group.errors()[0].message, "CANNOT CREATE TICKET");
}
