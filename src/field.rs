//! Input widget kinds and raw-input coercion
//!
//! Views deliver change events as raw strings. The widget attached to a
//! field decides how such a string becomes a tree value before it is
//! written, so number inputs stay numbers and checkboxes stay booleans
//! no matter what the transport looked like.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Input control kinds a view can render for a field.
///
/// Beyond telling the view what to draw, the widget drives two pieces of
/// behavior: which starting value an undeclared field gets
/// ([`Widget::empty_value`]) and how raw input strings are coerced into
/// tree values ([`Widget::coerce`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
	TextInput,
	EmailInput,
	NumberInput,
	DateInput,
	CheckboxInput,
	/// Dropdown with `(value, label)` pairs.
	Select { choices: Vec<(String, String)> },
	/// Container for a list of repeated entries, mutated through push
	/// and remove rather than direct input.
	ItemList,
}

impl Widget {
	/// Coerce a raw input string into a tree value.
	///
	/// Number inputs take the leading integer of the string and fall
	/// back to zero when nothing parses or the result would be negative.
	/// Checkbox inputs recognise `"true"`, `"on"` and `"1"`. Every other
	/// widget stores the string unchanged.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::Widget;
	/// use serde_json::json;
	///
	/// assert_eq!(Widget::NumberInput.coerce("25"), json!(25));
	/// assert_eq!(Widget::NumberInput.coerce("19kg"), json!(19));
	/// assert_eq!(Widget::NumberInput.coerce("abc"), json!(0));
	/// assert_eq!(Widget::CheckboxInput.coerce("on"), json!(true));
	/// assert_eq!(Widget::TextInput.coerce("  hi"), json!("  hi"));
	/// ```
	pub fn coerce(&self, raw: &str) -> Value {
		match self {
			Widget::NumberInput => json!(leading_int(raw)),
			Widget::CheckboxInput => json!(matches!(raw.trim(), "true" | "on" | "1")),
			_ => Value::String(raw.to_owned()),
		}
	}

	/// The value a field of this widget starts from when its definition
	/// carries no explicit initial.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::Widget;
	/// use serde_json::json;
	///
	/// assert_eq!(Widget::TextInput.empty_value(), json!(""));
	/// assert_eq!(Widget::NumberInput.empty_value(), json!(0));
	/// assert_eq!(Widget::CheckboxInput.empty_value(), json!(false));
	/// assert_eq!(Widget::ItemList.empty_value(), json!([]));
	/// ```
	pub fn empty_value(&self) -> Value {
		match self {
			Widget::NumberInput => json!(0),
			Widget::CheckboxInput => json!(false),
			Widget::ItemList => json!([]),
			_ => json!(""),
		}
	}
}

/// Leading integer of a raw input, clamped to zero when absent or
/// negative.
fn leading_int(raw: &str) -> i64 {
	let trimmed = raw.trim();
	let (negative, rest) = match trimmed.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
	};
	let end = rest
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(rest.len());
	let digits = &rest[..end];
	if digits.is_empty() || negative {
		return 0;
	}
	digits.parse().unwrap_or(i64::MAX)
}
