//! Headless form state with schema-driven validation
//!
//! This crate keeps form values, touched state, validation errors and
//! submission gating in one controller, with no opinion about how the
//! form is rendered. A declarative [`Schema`] describes fields by
//! path, widget and validation rules; [`FormState`] revalidates the
//! whole value tree on every change and gates submission behind a
//! clean pass.
//!
//! - Values live in a `serde_json::Value` tree addressed by dotted
//!   [`FieldPath`]s (`address.city`, `hobbies.0.name`).
//! - Rules are plain data, so schemas and snapshots serialize.
//! - Errors display per field only after a blur or a failed submit.
//! - Sequences grow and shrink through the schema, never below their
//!   declared minimum.
//!
//! # Examples
//!
//! ```
//! use formwork::{FieldDef, FieldPath, FormState, Schema};
//!
//! let schema = Schema::new()
//!     .with_field(
//!         FieldDef::email(FieldPath::key("email"))
//!             .with_label("Email")
//!             .email_format("Invalid email address"),
//!     );
//! let mut form = FormState::new(schema);
//!
//! form.set_input("email", "not-an-address");
//! assert!(form.errors().contains_key("email"));
//!
//! // Nothing renders until the user leaves the field.
//! assert_eq!(form.bound("email").unwrap().visible_error(), None);
//! form.mark_touched("email");
//! assert_eq!(
//!     form.bound("email").unwrap().visible_error(),
//!     Some("Invalid email address"),
//! );
//! ```

pub mod bound;
pub mod field;
pub mod path;
pub mod registration;
pub mod rules;
pub mod schema;
pub mod snapshot;
pub mod state;

pub use bound::BoundField;
pub use field::Widget;
pub use path::{FieldPath, PathParseError, Segment};
pub use registration::{Address, Gender, Hobby, Registration};
pub use rules::Rule;
pub use schema::{Condition, ErrorMap, FieldDef, Schema};
pub use snapshot::{FieldSnapshot, FormSnapshot};
pub use state::{ALL_FIELDS_KEY, FnSubmit, FormState, SubmitHandler};
