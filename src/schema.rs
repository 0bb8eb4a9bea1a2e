//! Field definitions and whole-tree validation
//!
//! A [`Schema`] is an ordered list of field definitions. Each definition
//! ties a path pattern to a widget, an ordered rule list and optional
//! display metadata. The schema derives the starting value tree and
//! validates a whole tree in one deterministic pass; validation output
//! is a plain map from path to message, empty when the tree is valid.

use crate::field::Widget;
use crate::path::FieldPath;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Validation output keyed by the canonical path string.
///
/// An empty map means the tree is valid. Each entry carries the message
/// of the first failing rule for that path; later rules are not checked.
pub type ErrorMap = HashMap<String, String>;

/// Display condition tying one field's visibility to another field's
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
	pub path: FieldPath,
	pub equals: Value,
}

impl Condition {
	/// Whether the watched value currently equals the expected one.
	pub fn holds(&self, values: &Value) -> bool {
		self.path.lookup(values) == Some(&self.equals)
	}
}

/// Definition of one field: a path pattern plus everything the crate
/// and a view need to know about the slot it covers.
///
/// Definitions are built with the widget constructors and chained
/// `with_*` and rule helpers:
///
/// ```
/// use formwork::{FieldDef, FieldPath};
///
/// let city = FieldDef::text(FieldPath::key("address").child("city"))
///     .with_label("City")
///     .required("City is required");
/// assert_eq!(city.rules.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
	/// Path pattern this definition covers; may contain a `*` segment.
	pub path: FieldPath,
	/// Human-readable label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Widget a view should render; also drives raw-input coercion.
	pub widget: Widget,
	/// Rules checked in order; the first failure provides the message.
	#[serde(default)]
	pub rules: Vec<Rule>,
	/// When present, the field is only shown while the condition holds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shown_when: Option<Condition>,
	/// Starting value; the widget's empty value when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub initial: Option<Value>,
	/// Template appended for each new entry of a sequence field.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub item_template: Option<Value>,
}

impl FieldDef {
	fn new(path: FieldPath, widget: Widget) -> Self {
		Self {
			path,
			label: None,
			widget,
			rules: vec![],
			shown_when: None,
			initial: None,
			item_template: None,
		}
	}

	/// Free-text field.
	pub fn text(path: FieldPath) -> Self {
		Self::new(path, Widget::TextInput)
	}

	/// Email address field.
	pub fn email(path: FieldPath) -> Self {
		Self::new(path, Widget::EmailInput)
	}

	/// Numeric field; raw input is coerced to an integer.
	pub fn number(path: FieldPath) -> Self {
		Self::new(path, Widget::NumberInput)
	}

	/// Date field holding an ISO `YYYY-MM-DD` string.
	pub fn date(path: FieldPath) -> Self {
		Self::new(path, Widget::DateInput)
	}

	/// Boolean field; raw input is coerced to a flag.
	pub fn checkbox(path: FieldPath) -> Self {
		Self::new(path, Widget::CheckboxInput)
	}

	/// Dropdown field over `(value, label)` pairs.
	pub fn select<S>(path: FieldPath, choices: impl IntoIterator<Item = (S, S)>) -> Self
	where
		S: Into<String>,
	{
		let choices = choices
			.into_iter()
			.map(|(value, label)| (value.into(), label.into()))
			.collect();
		Self::new(path, Widget::Select { choices })
	}

	/// Sequence field whose entries are copies of `item_template`.
	pub fn sequence(path: FieldPath, item_template: Value) -> Self {
		let mut def = Self::new(path, Widget::ItemList);
		def.item_template = Some(item_template);
		def
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_initial(mut self, initial: Value) -> Self {
		self.initial = Some(initial);
		self
	}

	/// Show this field only while the value at `path` equals `equals`.
	pub fn shown_when(mut self, path: FieldPath, equals: Value) -> Self {
		self.shown_when = Some(Condition { path, equals });
		self
	}

	/// Append a rule to the end of the check order.
	pub fn rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	/// Require a non-empty string.
	pub fn required(self, error_message: impl Into<String>) -> Self {
		self.rule(Rule::NonEmpty {
			error_message: error_message.into(),
		})
	}

	/// Require email syntax; an empty string fails this too.
	pub fn email_format(self, error_message: impl Into<String>) -> Self {
		self.rule(Rule::Email {
			error_message: error_message.into(),
		})
	}

	/// Require a number of at least `min`.
	pub fn at_least(self, min: f64, error_message: impl Into<String>) -> Self {
		self.rule(Rule::MinNumber {
			min,
			error_message: error_message.into(),
		})
	}

	/// Require one of the listed strings.
	pub fn one_of<S>(
		self,
		choices: impl IntoIterator<Item = S>,
		error_message: impl Into<String>,
	) -> Self
	where
		S: Into<String>,
	{
		self.rule(Rule::OneOf {
			choices: choices.into_iter().map(Into::into).collect(),
			error_message: error_message.into(),
		})
	}

	/// Require an ISO `YYYY-MM-DD` date string.
	pub fn valid_date(self, error_message: impl Into<String>) -> Self {
		self.rule(Rule::ValidDate {
			error_message: error_message.into(),
		})
	}

	/// Require a boolean value.
	pub fn boolean(self, error_message: impl Into<String>) -> Self {
		self.rule(Rule::Boolean {
			error_message: error_message.into(),
		})
	}

	/// Require at least `min` entries in a sequence.
	pub fn min_items(self, min: usize, error_message: impl Into<String>) -> Self {
		self.rule(Rule::MinItems {
			min,
			error_message: error_message.into(),
		})
	}

	/// Starting value for this field.
	pub fn initial_value(&self) -> Value {
		self.initial
			.clone()
			.unwrap_or_else(|| self.widget.empty_value())
	}

	/// Smallest number of entries a sequence field may hold, taken from
	/// its `MinItems` rule. Zero when unconstrained.
	pub fn min_entries(&self) -> usize {
		self.rules
			.iter()
			.filter_map(|rule| match rule {
				Rule::MinItems { min, .. } => Some(*min),
				_ => None,
			})
			.max()
			.unwrap_or(0)
	}
}

/// Ordered collection of field definitions over one value tree.
///
/// # Examples
///
/// ```
/// use formwork::{FieldDef, FieldPath, Schema};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .with_field(FieldDef::text(FieldPath::key("name")).required("Name is required"))
///     .with_field(FieldDef::number(FieldPath::key("age")).with_initial(json!(18)));
///
/// assert_eq!(schema.initial_values(), json!({ "name": "", "age": 18 }));
///
/// let errors = schema.validate(&schema.initial_values());
/// assert_eq!(errors.get("name").map(String::as_str), Some("Name is required"));
/// assert!(!errors.contains_key("age"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
	fields: Vec<FieldDef>,
}

impl Schema {
	pub fn new() -> Self {
		Self { fields: vec![] }
	}

	/// Append a field definition, builder style.
	pub fn with_field(mut self, field: FieldDef) -> Self {
		self.fields.push(field);
		self
	}

	/// Append a field definition in place.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldDef, FieldPath, Schema};
	///
	/// let mut schema = Schema::new();
	/// schema.add_field(FieldDef::text(FieldPath::key("name")).required("Name is required"));
	/// schema.add_field(FieldDef::checkbox(FieldPath::key("subscribe")));
	/// assert_eq!(schema.fields().len(), 2);
	/// ```
	pub fn add_field(&mut self, field: FieldDef) {
		self.fields.push(field);
	}

	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	/// The first definition whose pattern covers `path`.
	pub fn field_for(&self, path: &FieldPath) -> Option<&FieldDef> {
		self.fields.iter().find(|def| def.path.matches(path))
	}

	/// Build the tree of starting values.
	///
	/// Definitions are written in order, so later definitions may refine
	/// slots earlier ones created. Pattern definitions contribute
	/// nothing of their own; their entries come from sequence initials
	/// and templates.
	pub fn initial_values(&self) -> Value {
		let mut root = Value::Object(serde_json::Map::new());
		for def in &self.fields {
			if def.path.is_pattern() {
				continue;
			}
			def.path.write(&mut root, def.initial_value());
		}
		root
	}

	/// Validate a whole tree, returning the error map.
	///
	/// Every definition is checked on every call, pattern definitions
	/// once per covered entry. For each concrete path the first failing
	/// rule provides the message. The check is pure: the same tree
	/// always yields the same map, invalid values never panic, and
	/// hidden fields are checked like visible ones.
	pub fn validate(&self, values: &Value) -> ErrorMap {
		let mut errors = ErrorMap::new();
		for def in &self.fields {
			for concrete in def.path.expand(values) {
				let key = concrete.to_string();
				if errors.contains_key(&key) {
					continue;
				}
				let value = concrete.lookup(values);
				if let Some(message) = def.rules.iter().find_map(|rule| rule.check(value)) {
					errors.insert(key, message.to_owned());
				}
			}
		}
		errors
	}

	/// Every concrete path the schema covers in `values`, in definition
	/// order with patterns expanded against the actual tree.
	pub fn concrete_paths(&self, values: &Value) -> Vec<String> {
		let mut seen = HashSet::new();
		let mut paths = Vec::new();
		for def in &self.fields {
			for concrete in def.path.expand(values) {
				let path = concrete.to_string();
				if seen.insert(path.clone()) {
					paths.push(path);
				}
			}
		}
		paths
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	fn sample_schema() -> Schema {
		Schema::new()
			.with_field(FieldDef::text(FieldPath::key("name")).required("Name is required"))
			.with_field(
				FieldDef::email(FieldPath::key("contact").child("email"))
					.email_format("Invalid email address"),
			)
			.with_field(
				FieldDef::number(FieldPath::key("age"))
					.with_initial(json!(18))
					.at_least(18.0, "Too young"),
			)
			.with_field(
				FieldDef::sequence(FieldPath::key("tags"), json!({ "value": "" }))
					.with_initial(json!([{ "value": "" }]))
					.min_items(1, "At least one tag is required"),
			)
			.with_field(
				FieldDef::text(FieldPath::key("tags").any().child("value"))
					.required("Tag value is required"),
			)
	}

	#[rstest]
	fn test_initial_values_follow_definitions() {
		let values = sample_schema().initial_values();
		assert_eq!(
			values,
			json!({
				"name": "",
				"contact": { "email": "" },
				"age": 18,
				"tags": [{ "value": "" }],
			})
		);
	}

	#[rstest]
	fn test_validate_reports_each_failing_path() {
		let schema = sample_schema();
		let errors = schema.validate(&schema.initial_values());

		assert_eq!(errors.len(), 3);
		assert_eq!(
			errors.get("name").map(String::as_str),
			Some("Name is required")
		);
		assert_eq!(
			errors.get("contact.email").map(String::as_str),
			Some("Invalid email address")
		);
		assert_eq!(
			errors.get("tags.0.value").map(String::as_str),
			Some("Tag value is required")
		);
		assert!(!errors.contains_key("age"));
		assert!(!errors.contains_key("tags"));
	}

	#[rstest]
	fn test_first_failing_rule_wins() {
		let schema = Schema::new().with_field(
			FieldDef::email(FieldPath::key("email"))
				.required("Email is required")
				.email_format("Invalid email address"),
		);

		let errors = schema.validate(&json!({ "email": "" }));
		assert_eq!(
			errors.get("email").map(String::as_str),
			Some("Email is required")
		);

		let errors = schema.validate(&json!({ "email": "nope" }));
		assert_eq!(
			errors.get("email").map(String::as_str),
			Some("Invalid email address")
		);
	}

	#[rstest]
	fn test_validate_covers_every_sequence_entry() {
		let schema = sample_schema();
		let values = json!({
			"name": "Ada",
			"contact": { "email": "ada@example.com" },
			"age": 30,
			"tags": [{ "value": "ok" }, { "value": "" }, { "value": "also ok" }],
		});

		let errors = schema.validate(&values);
		assert_eq!(errors.len(), 1);
		assert!(errors.contains_key("tags.1.value"));
	}

	#[rstest]
	fn test_validate_flags_emptied_sequence() {
		let schema = sample_schema();
		let values = json!({
			"name": "Ada",
			"contact": { "email": "ada@example.com" },
			"age": 30,
			"tags": [],
		});

		let errors = schema.validate(&values);
		assert_eq!(errors.len(), 1);
		assert_eq!(
			errors.get("tags").map(String::as_str),
			Some("At least one tag is required")
		);
	}

	#[rstest]
	fn test_validate_treats_missing_values_as_empty() {
		let schema = sample_schema();
		let errors = schema.validate(&json!({}));

		assert!(errors.contains_key("name"));
		assert!(errors.contains_key("contact.email"));
		assert!(errors.contains_key("age"));
		assert!(errors.contains_key("tags"));
	}

	#[rstest]
	fn test_field_for_matches_patterns() {
		let schema = sample_schema();

		let concrete: FieldPath = "tags.4.value".parse().unwrap();
		let def = schema.field_for(&concrete).expect("pattern should cover");
		assert_eq!(def.path.to_string(), "tags.*.value");

		let unknown: FieldPath = "missing".parse().unwrap();
		assert!(schema.field_for(&unknown).is_none());
	}

	#[rstest]
	fn test_concrete_paths_expand_patterns() {
		let schema = sample_schema();
		let values = json!({ "tags": [{ "value": "" }, { "value": "" }] });

		let paths = schema.concrete_paths(&values);
		assert_eq!(
			paths,
			[
				"name",
				"contact.email",
				"age",
				"tags",
				"tags.0.value",
				"tags.1.value",
			]
		);
	}

	#[rstest]
	fn test_min_entries_reads_the_rule() {
		let schema = sample_schema();
		let tags: FieldPath = "tags".parse().unwrap();
		assert_eq!(schema.field_for(&tags).unwrap().min_entries(), 1);

		let unbounded = FieldDef::sequence(FieldPath::key("links"), json!({}));
		assert_eq!(unbounded.min_entries(), 0);
	}

	#[rstest]
	fn test_schema_round_trips_through_serde() {
		let schema = sample_schema();
		let json = serde_json::to_string(&schema).expect("serialize schema");
		let back: Schema = serde_json::from_str(&json).expect("deserialize schema");
		assert_eq!(back, schema);
	}

	proptest! {
		// Validation is a pure function of the tree: same input, same
		// map, and no input panics it.
		#[test]
		fn test_validation_is_pure(name in ".*", email in ".*", age in any::<i64>()) {
			let schema = sample_schema();
			let values = json!({
				"name": name,
				"contact": { "email": email },
				"age": age,
				"tags": [{ "value": "" }],
			});

			let first = schema.validate(&values);
			let second = schema.validate(&values);
			prop_assert_eq!(first, second);
		}
	}
}
