//! Strict form data binding: per-field accessor callbacks instead of
//! reflection.
//!
//! `formbind` reconciles submitted form values against a caller-owned
//! domain object. Each field declares how it reads and writes its value
//! (a getter plus either a single-value updater or an adder/remover pair),
//! and the mapper applies the minimal set of mutations, turning every
//! accessor rejection into a field-level error instead of a crash.
//!
//! # Core Concepts
//!
//! - **Field**: one named leaf of the submission tree, declared through
//!   [`FieldBuilder`], which validates the accessor combination up front
//! - **Accessor**: the field's write strategy, fixed at declaration time:
//!   none (delegated), replace, or collection set-difference
//! - **FieldGroup**: ordered sibling fields bound to one object, plus the
//!   group-level error sink and an optional [`Factory`]
//! - **StrictMapper**: the reconciler: read phase, write phase, and the
//!   submit driver
//! - **Factory**: constructs the bound object from sibling field values
//!   through an explicit declarative argument list
//! - **FallbackMapper**: receives every field that declares no custom
//!   accessor, in declaration order
//!
//! # Quick Start
//!
//! ```
//! use formbind::{AccessError, Field, FieldGroup, NoopFallback, StrictMapper};
//! use serde_json::json;
//!
//! struct Post {
//!     subject: String,
//! }
//!
//! let field = Field::builder("subject")
//!     .get_value(|post: &Post| Ok(json!(post.subject)))
//!     .update_value(|value, target| {
//!         let subject = value
//!             .as_str()
//!             .ok_or_else(|| AccessError::expected("string", value))?;
//!         target.object()?.subject = subject.to_owned();
//!         Ok(())
//!     })
//!     .write_error_message("Subject cannot be empty.")
//!     .build()?;
//!
//! let mut group = FieldGroup::new().with_field(field);
//! let mapper = StrictMapper::new(NoopFallback);
//!
//! let mut data = Some(Post {
//!     subject: "draft".to_owned(),
//! });
//! group.submit(json!({"subject": "final"}));
//! mapper.map_fields_to_data(&mut group, &mut data);
//!
//! assert!(group.is_valid());
//! assert_eq!(data.unwrap().subject, "final");
//! # Ok::<(), formbind::ConfigError>(())
//! ```
//!
//! # Constructing the Bound Object
//!
//! A group whose object cannot be mutated field by field declares a
//! [`Factory`]; [`StrictMapper::submit`] runs it before the write phase:
//!
//! ```
//! use formbind::{Factory, FieldGroup, Field, NoopFallback, StrictMapper};
//! use serde_json::json;
//!
//! struct Post {
//!     subject: String,
//!     body: String,
//! }
//!
//! let factory = Factory::new(["first", "second"], |args| {
//!     Ok(Post {
//!         subject: args.str(0)?.to_owned(),
//!         body: args.str(1)?.to_owned(),
//!     })
//! });
//!
//! let mut group = FieldGroup::new()
//!     .with_field(Field::unmapped("first"))
//!     .with_field(Field::unmapped("second"))
//!     .with_factory(factory);
//!
//! let mapper = StrictMapper::new(NoopFallback);
//! let mut data: Option<Post> = None;
//!
//! group.submit(json!({"first": "Subject of post", "second": "Body of post"}));
//! mapper.submit(&mut group, &mut data)?;
//!
//! assert_eq!(data.unwrap().subject, "Subject of post");
//! # Ok::<(), formbind::FactoryError>(())
//! ```
//!
//! # Error Recovery
//!
//! Accessor rejections never unwind past the mapper. A rejected write is
//! classified: a rejected bound object is absorbed (a group-level error
//! already covers it), a null value on a not-null field is left to the
//! constraint layer, and everything else attaches the field's configured
//! `write_error_message`. A factory that rejects its arguments leaves the
//! group without data and records one group-level error; only an argument
//! naming a missing field is fatal.

mod diff;
mod error;
mod factory;
mod field;
mod mapper;
mod value;
mod voter;

pub use diff::{extra_values, keyed_entries, Entries, EntryKey};
pub use error::{
    value_type_name, AccessError, BindingError, ConfigError, FactoryError,
};
pub use factory::{Factory, FactoryArg, FormView, ResolvedArgs};
pub use field::{
    Accessor, Field, FieldBuilder, FieldGroup, Getter, Target, Writer,
    DEFAULT_FACTORY_ERROR_MESSAGE, DEFAULT_WRITE_ERROR_MESSAGE,
};
pub use mapper::{FallbackMapper, NoopFallback, StrictMapper, Translator};
pub use voter::ValueVoter;

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
