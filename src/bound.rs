//! Per-field read view
//!
//! A [`BoundField`] packages everything a renderer needs for one
//! concrete field: definition, current value, error state, touched
//! flag and visibility. It borrows from the controller and is rebuilt
//! on demand, so it never goes stale.

use crate::field::Widget;
use crate::path::FieldPath;
use crate::rules::Rule;
use crate::schema::FieldDef;
use serde_json::Value;

/// Read-only binding of one concrete field for rendering.
///
/// Display gating lives here: [`BoundField::error`] always reports the
/// validation result, while [`BoundField::visible_error`] only reports
/// it once the field has been touched, so users are not shouted at
/// before they even reach a field.
///
/// # Examples
///
/// ```
/// use formwork::{FieldDef, FieldPath, FormState, Schema};
///
/// let schema = Schema::new().with_field(
///     FieldDef::email(FieldPath::key("email"))
///         .with_label("Email")
///         .email_format("Invalid email address"),
/// );
/// let mut form = FormState::new(schema);
/// form.set_input("email", "not-an-address");
///
/// let email = form.bound("email").unwrap();
/// assert_eq!(email.error(), Some("Invalid email address"));
/// assert_eq!(email.visible_error(), None);
///
/// form.mark_touched("email");
/// let email = form.bound("email").unwrap();
/// assert_eq!(email.visible_error(), Some("Invalid email address"));
/// ```
#[derive(Debug)]
pub struct BoundField<'a> {
	def: &'a FieldDef,
	path: FieldPath,
	value: Option<&'a Value>,
	error: Option<&'a str>,
	touched: bool,
	visible: bool,
}

impl<'a> BoundField<'a> {
	pub(crate) fn new(
		def: &'a FieldDef,
		path: FieldPath,
		value: Option<&'a Value>,
		error: Option<&'a str>,
		touched: bool,
		visible: bool,
	) -> Self {
		Self {
			def,
			path,
			value,
			error,
			touched,
			visible,
		}
	}

	/// The concrete path this binding covers.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldDef, FieldPath, FormState, Schema};
	///
	/// let schema = Schema::new()
	///     .with_field(FieldDef::text(FieldPath::key("address").child("city")));
	/// let form = FormState::new(schema);
	///
	/// let city = form.bound("address.city").unwrap();
	/// assert_eq!(city.path(), &FieldPath::key("address").child("city"));
	/// ```
	pub fn path(&self) -> &FieldPath {
		&self.path
	}

	/// Canonical path string, the `name` a renderer would put on the
	/// control.
	pub fn name(&self) -> String {
		self.path.to_string()
	}

	pub fn label(&self) -> Option<&str> {
		self.def.label.as_deref()
	}

	pub fn widget(&self) -> &Widget {
		&self.def.widget
	}

	pub fn rules(&self) -> &[Rule] {
		&self.def.rules
	}

	/// Current value at the path, `None` when the tree has no entry.
	pub fn value(&self) -> Option<&'a Value> {
		self.value
	}

	pub fn is_touched(&self) -> bool {
		self.touched
	}

	pub fn is_visible(&self) -> bool {
		self.visible
	}

	/// Validation error for this field regardless of touched state.
	pub fn error(&self) -> Option<&'a str> {
		self.error
	}

	pub fn has_error(&self) -> bool {
		self.error.is_some()
	}

	/// The error a renderer should actually show: present only when
	/// the field has both an error and a touch, and is rendered at all.
	pub fn visible_error(&self) -> Option<&'a str> {
		if self.touched && self.visible {
			self.error
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Schema;
	use crate::state::FormState;
	use rstest::rstest;
	use serde_json::json;

	fn form_with_error() -> FormState {
		let schema = Schema::new().with_field(
			FieldDef::text(FieldPath::key("name"))
				.with_label("Name")
				.required("Name is required"),
		);
		let mut form = FormState::new(schema);
		form.validate();
		form
	}

	#[rstest]
	#[case(false, None)]
	#[case(true, Some("Name is required"))]
	fn test_visible_error_gated_by_touched(
		#[case] touched: bool,
		#[case] expected: Option<&str>,
	) {
		let mut form = form_with_error();
		if touched {
			form.mark_touched("name");
		}

		let bound = form.bound("name").unwrap();
		assert_eq!(bound.error(), Some("Name is required"));
		assert!(bound.has_error());
		assert_eq!(bound.visible_error(), expected);
	}

	#[rstest]
	fn test_hidden_field_suppresses_visible_error() {
		let schema = Schema::new()
			.with_field(FieldDef::checkbox(FieldPath::key("flag")))
			.with_field(
				FieldDef::text(FieldPath::key("detail"))
					.shown_when(FieldPath::key("flag"), json!(true))
					.required("Detail is required"),
			);
		let mut form = FormState::new(schema);
		form.validate();
		form.mark_touched("detail");

		let detail = form.bound("detail").unwrap();
		assert!(!detail.is_visible());
		assert_eq!(detail.error(), Some("Detail is required"));
		assert_eq!(detail.visible_error(), None);
	}

	#[rstest]
	fn test_bound_exposes_definition_and_value() {
		let mut form = form_with_error();
		form.set_input("name", "Ada");

		let bound = form.bound("name").unwrap();
		assert_eq!(bound.name(), "name");
		assert_eq!(bound.label(), Some("Name"));
		assert_eq!(bound.value(), Some(&json!("Ada")));
		assert_eq!(bound.rules().len(), 1);
		assert!(!bound.has_error());
	}
}
