//! Registration demo form
//!
//! The demonstration schema the crate grew around: personal details, a
//! nested address, a dynamic hobby list with a minimum of one entry, a
//! date picker and a conditional referral field behind a newsletter
//! checkbox. Also provides [`Registration`], the typed shape of a tree
//! that passed validation.

use crate::path::FieldPath;
use crate::schema::{FieldDef, Schema};
use crate::state::FormState;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The registration schema.
///
/// Field order is render order. Every message matches the demo form
/// word for word, so tests can assert on exact strings.
///
/// # Examples
///
/// ```
/// use formwork::registration;
///
/// let errors = registration::schema().validate(&serde_json::json!({}));
/// assert_eq!(
///     errors.get("firstName").map(String::as_str),
///     Some("First Name is required"),
/// );
/// ```
pub fn schema() -> Schema {
	Schema::new()
		.with_field(
			FieldDef::text(FieldPath::key("firstName"))
				.with_label("First Name")
				.required("First Name is required"),
		)
		.with_field(
			FieldDef::text(FieldPath::key("lastName"))
				.with_label("Last Name")
				.required("Last Name is required"),
		)
		.with_field(
			FieldDef::email(FieldPath::key("email"))
				.with_label("Email")
				.email_format("Invalid email address"),
		)
		.with_field(
			FieldDef::number(FieldPath::key("age"))
				.with_label("Age")
				.with_initial(json!(18))
				.at_least(18.0, "You must be at least 18 years old"),
		)
		.with_field(
			FieldDef::select(
				FieldPath::key("gender"),
				[
					("", "Select..."),
					("male", "Male"),
					("female", "Female"),
					("other", "Other"),
				],
			)
			.with_label("Gender")
			.one_of(["male", "female", "other"], "Gender is required"),
		)
		.with_field(
			FieldDef::text(FieldPath::key("address").child("city"))
				.with_label("City")
				.required("City is required"),
		)
		.with_field(
			FieldDef::text(FieldPath::key("address").child("state"))
				.with_label("State")
				.required("State is required"),
		)
		.with_field(
			FieldDef::sequence(FieldPath::key("hobbies"), json!({ "name": "" }))
				.with_label("Hobbies")
				.with_initial(json!([{ "name": "" }]))
				.min_items(1, "At least one hobby is required"),
		)
		.with_field(
			FieldDef::text(FieldPath::key("hobbies").any().child("name"))
				.with_label("Hobby Name")
				.required("Hobby name is required"),
		)
		.with_field(
			FieldDef::date(FieldPath::key("startDate"))
				.with_label("Start Date")
				.with_initial(json!(Local::now().date_naive().to_string()))
				.valid_date("Enter a valid date"),
		)
		.with_field(
			FieldDef::checkbox(FieldPath::key("subscribe"))
				.with_label("Subscribe to Newsletter")
				.boolean("Subscribe must be true or false"),
		)
		.with_field(
			FieldDef::text(FieldPath::key("referral"))
				.with_label("Referral Source")
				.shown_when(FieldPath::key("subscribe"), json!(true)),
		)
}

/// A fresh controller over [`schema`].
///
/// # Examples
///
/// ```
/// use formwork::registration;
///
/// let form = registration::form();
/// assert_eq!(form.values()["age"], serde_json::json!(18));
/// assert!(form.errors().is_empty());
/// ```
pub fn form() -> FormState {
	FormState::new(schema())
}

/// A registration that passed validation.
///
/// Decoding the raw tree into this struct only succeeds once every
/// field holds a value of the validated shape; `gender` in particular
/// cannot represent the unselected empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub age: i64,
	pub gender: Gender,
	pub address: Address,
	pub hobbies: Vec<Hobby>,
	pub start_date: NaiveDate,
	pub subscribe: bool,
	#[serde(default)]
	pub referral: String,
}

impl Registration {
	/// Decode a validated value tree.
	pub fn from_value(values: &Value) -> serde_json::Result<Self> {
		serde_json::from_value(values.clone())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
	Male,
	Female,
	Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
	pub city: String,
	pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hobby {
	pub name: String,
}
