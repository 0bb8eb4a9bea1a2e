//! Declarative validation rules
//!
//! Rules are plain serializable data, one variant per kind of check,
//! each carrying the message it fails with. Evaluating a rule never
//! panics and never returns an error: a failure IS the message, a pass
//! is silence. That keeps whole-tree validation total over arbitrary
//! input.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// A single validation rule and its failure message.
///
/// The serialized form is tagged so rule tables can travel to a client
/// unchanged:
///
/// ```
/// use formwork::Rule;
///
/// let rule = Rule::MinNumber {
///     min: 18.0,
///     error_message: "You must be at least 18 years old".to_string(),
/// };
/// let json = serde_json::to_string(&rule).unwrap();
/// assert!(json.contains("\"type\":\"min_number\""));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
	/// The value must be a string with at least one character.
	NonEmpty { error_message: String },
	/// The value must be a string in email syntax.
	Email { error_message: String },
	/// The value must be a number of at least `min`.
	MinNumber { min: f64, error_message: String },
	/// The value must be one of the listed strings.
	OneOf {
		choices: Vec<String>,
		error_message: String,
	},
	/// The value must be a calendar date in ISO `YYYY-MM-DD` form.
	ValidDate { error_message: String },
	/// The value must be a boolean.
	Boolean { error_message: String },
	/// The value must be an array with at least `min` entries.
	MinItems { min: usize, error_message: String },
}

impl Rule {
	/// Check a value against this rule, returning the failure message.
	///
	/// A missing value fails like an empty one; a value of the wrong
	/// kind fails like an invalid one. Checking never panics.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::Rule;
	/// use serde_json::json;
	///
	/// let rule = Rule::NonEmpty {
	///     error_message: "First Name is required".to_string(),
	/// };
	/// assert_eq!(rule.check(Some(&json!("Ada"))), None);
	/// assert_eq!(rule.check(Some(&json!(""))), Some("First Name is required"));
	/// assert_eq!(rule.check(None), Some("First Name is required"));
	/// ```
	pub fn check(&self, value: Option<&Value>) -> Option<&str> {
		let passes = match self {
			Rule::NonEmpty { .. } => {
				matches!(value, Some(Value::String(text)) if !text.is_empty())
			}
			Rule::Email { .. } => {
				matches!(value, Some(Value::String(text)) if EMAIL_REGEX.is_match(text))
			}
			Rule::MinNumber { min, .. } => value
				.and_then(Value::as_f64)
				.is_some_and(|number| number >= *min),
			Rule::OneOf { choices, .. } => {
				matches!(value, Some(Value::String(text)) if choices.iter().any(|choice| choice == text))
			}
			Rule::ValidDate { .. } => {
				matches!(value, Some(Value::String(text)) if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok())
			}
			Rule::Boolean { .. } => matches!(value, Some(Value::Bool(_))),
			Rule::MinItems { min, .. } => {
				matches!(value, Some(Value::Array(items)) if items.len() >= *min)
			}
		};
		if passes {
			None
		} else {
			Some(self.error_message())
		}
	}

	/// The message this rule fails with.
	pub fn error_message(&self) -> &str {
		match self {
			Rule::NonEmpty { error_message }
			| Rule::Email { error_message }
			| Rule::ValidDate { error_message }
			| Rule::Boolean { error_message } => error_message,
			Rule::MinNumber { error_message, .. }
			| Rule::OneOf { error_message, .. }
			| Rule::MinItems { error_message, .. } => error_message,
		}
	}
}
