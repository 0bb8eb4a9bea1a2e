//! Serializable form snapshots
//!
//! Owned, point-in-time copies of controller state for renderers that
//! live across a boundary the borrow checker cannot cross, such as a
//! template engine or a wire protocol. Produced by
//! [`FormState::snapshot`](crate::FormState::snapshot).

use crate::field::Widget;
use crate::schema::ErrorMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Owned snapshot of the whole form.
///
/// `errors` carries every validation failure; per-field `fields`
/// entries carry only display-gated errors, mirroring what
/// [`BoundField::visible_error`](crate::BoundField::visible_error)
/// would show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSnapshot {
	pub values: Value,
	pub errors: ErrorMap,
	pub touched: Vec<String>,
	pub is_submitting: bool,
	pub submit_count: u32,
	pub is_dirty: bool,
	pub is_valid: bool,
	/// Form-wide error from a rejected submission, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub form_error: Option<String>,
	pub fields: Vec<FieldSnapshot>,
}

/// Owned snapshot of one concrete field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	pub widget: Widget,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// Display-gated error, present only when a renderer should show it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub touched: bool,
	pub visible: bool,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::path::FieldPath;
	use crate::schema::{FieldDef, Schema};
	use crate::state::FormState;
	use rstest::rstest;
	use serde_json::json;

	fn sample_form() -> FormState {
		let schema = Schema::new()
			.with_field(
				FieldDef::text(FieldPath::key("name"))
					.with_label("Name")
					.required("Name is required"),
			)
			.with_field(
				FieldDef::text(FieldPath::key("city"))
					.with_label("City")
					.required("City is required"),
			);
		FormState::new(schema)
	}

	#[rstest]
	fn test_snapshot_reflects_controller() {
		let mut form = sample_form();
		form.validate();
		form.mark_touched("name");

		let snapshot = form.snapshot();

		assert_eq!(snapshot.values, json!({ "name": "", "city": "" }));
		assert_eq!(snapshot.touched, vec!["name".to_string()]);
		assert!(!snapshot.is_valid);
		assert!(!snapshot.is_dirty);
		assert_eq!(snapshot.form_error, None);
		assert_eq!(snapshot.fields.len(), 2);

		let name = &snapshot.fields[0];
		assert_eq!(name.path, "name");
		assert_eq!(name.label.as_deref(), Some("Name"));
		assert_eq!(name.error.as_deref(), Some("Name is required"));
		assert!(name.touched);
		assert!(name.visible);

		// The full error map still lists the untouched field, but its
		// per-field entry suppresses the error until a touch.
		assert_eq!(snapshot.errors.len(), 2);
		let city = &snapshot.fields[1];
		assert_eq!(city.error, None);
		assert!(!city.touched);
	}

	#[rstest]
	fn test_snapshot_round_trips_through_json() {
		let mut form = sample_form();
		form.set_input("name", "Ada");
		form.mark_touched("name");

		let snapshot = form.snapshot();
		let encoded = serde_json::to_string(&snapshot).unwrap();
		let decoded: FormSnapshot = serde_json::from_str(&encoded).unwrap();

		assert_eq!(decoded.values, snapshot.values);
		assert_eq!(decoded.touched, snapshot.touched);
		assert_eq!(decoded.fields.len(), snapshot.fields.len());
		assert!(!encoded.contains("form_error"));
	}
}
