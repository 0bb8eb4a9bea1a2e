//! The form controller
//!
//! [`FormState`] owns a value tree, the touched set, the current error
//! map and the submission gate, and revalidates the whole tree against
//! its [`Schema`] after every change. All transitions run synchronously
//! in the caller's event context; the one async point is the awaited
//! submit handler.

use crate::bound::BoundField;
use crate::path::FieldPath;
use crate::schema::{ErrorMap, Schema};
use crate::snapshot::{FieldSnapshot, FormSnapshot};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;

/// Reserved error key for failures that concern the whole form rather
/// than a single field, such as a rejected submission. No field path
/// produced by a schema collides with it.
pub const ALL_FIELDS_KEY: &str = "_all";

/// Receiver of a validated value tree.
///
/// Implementations do the actual submission work, typically an API
/// call. A returned error surfaces as the form-wide entry under
/// [`ALL_FIELDS_KEY`]; what went wrong beyond the message stays opaque
/// to the form.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
	async fn on_submit(&self, values: &Value) -> anyhow::Result<()>;
}

/// Adapter letting an async closure act as a [`SubmitHandler`].
///
/// The closure receives its own copy of the value tree.
///
/// # Examples
///
/// ```
/// use formwork::FnSubmit;
///
/// let handler = FnSubmit(|values: serde_json::Value| async move {
///     println!("submitting {values}");
///     anyhow::Ok(())
/// });
/// # let _ = handler;
/// ```
pub struct FnSubmit<F>(pub F);

#[async_trait]
impl<F, Fut> SubmitHandler for FnSubmit<F>
where
	F: Fn(Value) -> Fut + Send + Sync,
	Fut: Future<Output = anyhow::Result<()>> + Send,
{
	async fn on_submit(&self, values: &Value) -> anyhow::Result<()> {
		(self.0)(values.clone()).await
	}
}

/// Headless form controller pairing a value tree with a [`Schema`].
///
/// Every interaction a view needs goes through this type: raw change
/// events, blur events, sequence mutation and the submit gate. The
/// error map is replaced wholesale on every change; display gating
/// happens per field through [`BoundField`], never here.
///
/// # Examples
///
/// ```
/// use formwork::{FieldDef, FieldPath, FormState, Schema};
///
/// let schema = Schema::new()
///     .with_field(FieldDef::text(FieldPath::key("name")).required("Name is required"));
/// let mut form = FormState::new(schema);
///
/// form.set_input("name", "Ada");
/// assert!(form.errors().is_empty());
///
/// form.set_input("name", "");
/// assert_eq!(
///     form.errors().get("name").map(String::as_str),
///     Some("Name is required"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FormState {
	schema: Schema,
	values: Value,
	initial: Value,
	errors: ErrorMap,
	touched: HashSet<String>,
	is_submitting: bool,
	submit_count: u32,
}

impl FormState {
	/// Create a controller over the schema's starting values. No
	/// validation runs until the first change, blur or submit, so a
	/// fresh form shows no errors even when its defaults are invalid.
	pub fn new(schema: Schema) -> Self {
		let initial = schema.initial_values();
		Self {
			schema,
			values: initial.clone(),
			initial,
			errors: ErrorMap::new(),
			touched: HashSet::new(),
			is_submitting: false,
			submit_count: 0,
		}
	}

	/// Create a controller over an existing value tree, for editing
	/// flows where values come from storage rather than schema defaults.
	/// The given tree also becomes the baseline for [`FormState::is_dirty`].
	pub fn with_values(schema: Schema, values: Value) -> Self {
		Self {
			schema,
			initial: values.clone(),
			values,
			errors: ErrorMap::new(),
			touched: HashSet::new(),
			is_submitting: false,
			submit_count: 0,
		}
	}

	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	pub fn values(&self) -> &Value {
		&self.values
	}

	/// Errors from the last validation pass plus any form-wide entry.
	pub fn errors(&self) -> &ErrorMap {
		&self.errors
	}

	pub fn touched(&self) -> &HashSet<String> {
		&self.touched
	}

	pub fn is_touched(&self, path: &str) -> bool {
		match path.parse::<FieldPath>() {
			Ok(parsed) => self.touched.contains(&parsed.to_string()),
			Err(_) => false,
		}
	}

	pub fn is_submitting(&self) -> bool {
		self.is_submitting
	}

	/// Number of submit attempts since creation or the last reset.
	pub fn submit_count(&self) -> u32 {
		self.submit_count
	}

	/// Whether the current tree passes validation. Checks the live
	/// tree, not the stored error map, so it is accurate even before
	/// the first validation pass.
	pub fn is_valid(&self) -> bool {
		self.schema.validate(&self.values).is_empty()
	}

	/// Whether any value differs from the starting tree.
	pub fn is_dirty(&self) -> bool {
		self.values != self.initial
	}

	/// Write a value at a path and revalidate the whole tree.
	///
	/// Returns whether the write landed; a malformed path or one that
	/// does not address the tree leaves all state untouched. Writing
	/// never marks anything touched.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldDef, FieldPath, FormState, Schema};
	/// use serde_json::json;
	///
	/// let schema = Schema::new()
	///     .with_field(FieldDef::checkbox(FieldPath::key("subscribe")));
	/// let mut form = FormState::new(schema);
	///
	/// assert!(form.set_field("subscribe", json!(true)));
	/// assert_eq!(form.values()["subscribe"], json!(true));
	/// assert!(!form.set_field("no.such.entry.0", json!(1)));
	/// ```
	pub fn set_field(&mut self, path: &str, value: Value) -> bool {
		let Ok(parsed) = path.parse::<FieldPath>() else {
			return false;
		};
		self.apply(&parsed, value)
	}

	/// Write a raw input string at a path, coerced through the widget
	/// of the field definition covering it, and revalidate.
	///
	/// Paths outside the schema store the raw string unchanged.
	pub fn set_input(&mut self, path: &str, raw: &str) -> bool {
		let Ok(parsed) = path.parse::<FieldPath>() else {
			return false;
		};
		let value = match self.schema.field_for(&parsed) {
			Some(def) => def.widget.coerce(raw),
			None => Value::String(raw.to_owned()),
		};
		self.apply(&parsed, value)
	}

	fn apply(&mut self, path: &FieldPath, value: Value) -> bool {
		if !path.write(&mut self.values, value) {
			return false;
		}
		self.errors = self.schema.validate(&self.values);
		true
	}

	/// Record that the user left a field, the blur half of the display
	/// gate. Fields only ever become touched; nothing untouches them
	/// short of [`FormState::reset`]. Unknown paths are ignored.
	pub fn mark_touched(&mut self, path: &str) {
		let Ok(parsed) = path.parse::<FieldPath>() else {
			return;
		};
		if parsed.lookup(&self.values).is_none() && self.schema.field_for(&parsed).is_none() {
			return;
		}
		self.touched.insert(parsed.to_string());
	}

	/// Mark every schema-covered path touched, so every outstanding
	/// error becomes visible. Runs on every failed submit.
	pub fn mark_all_touched(&mut self) {
		for path in self.schema.concrete_paths(&self.values) {
			self.touched.insert(path);
		}
	}

	/// Append a copy of the sequence field's item template.
	///
	/// Returns `false` without touching state when the path is not a
	/// sequence field of the schema.
	pub fn push_item(&mut self, path: &str) -> bool {
		let Ok(parsed) = path.parse::<FieldPath>() else {
			return false;
		};
		let Some(template) = self
			.schema
			.field_for(&parsed)
			.and_then(|def| def.item_template.clone())
		else {
			return false;
		};
		let Some(Value::Array(entries)) = parsed.lookup_mut(&mut self.values) else {
			return false;
		};
		entries.push(template);
		self.errors = self.schema.validate(&self.values);
		true
	}

	/// Remove the sequence entry at `index`, refusing any removal that
	/// would drop the sequence below its schema minimum.
	///
	/// A refusal is a no-op, not an error: state is unchanged and the
	/// caller gets `false`, typically to keep a remove control
	/// disabled. Out-of-range indices refuse the same way.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldDef, FieldPath, FormState, Schema};
	/// use serde_json::json;
	///
	/// let schema = Schema::new().with_field(
	///     FieldDef::sequence(FieldPath::key("hobbies"), json!({ "name": "" }))
	///         .with_initial(json!([{ "name": "" }]))
	///         .min_items(1, "At least one hobby is required"),
	/// );
	/// let mut form = FormState::new(schema);
	///
	/// assert!(!form.remove_item("hobbies", 0));
	/// assert!(form.push_item("hobbies"));
	/// assert!(form.remove_item("hobbies", 1));
	/// ```
	pub fn remove_item(&mut self, path: &str, index: usize) -> bool {
		let Ok(parsed) = path.parse::<FieldPath>() else {
			return false;
		};
		let Some(def) = self.schema.field_for(&parsed) else {
			return false;
		};
		if def.item_template.is_none() {
			return false;
		}
		let floor = def.min_entries();
		let Some(Value::Array(entries)) = parsed.lookup_mut(&mut self.values) else {
			return false;
		};
		if index >= entries.len() || entries.len() <= floor {
			return false;
		}
		entries.remove(index);
		self.errors = self.schema.validate(&self.values);
		true
	}

	/// Whether the field at `path` should currently be rendered.
	/// Fields without a display condition are always visible.
	/// Visibility never feeds back into validation.
	pub fn is_visible(&self, path: &str) -> bool {
		match path.parse::<FieldPath>() {
			Ok(parsed) => self.visible(&parsed),
			Err(_) => false,
		}
	}

	fn visible(&self, path: &FieldPath) -> bool {
		match self
			.schema
			.field_for(path)
			.and_then(|def| def.shown_when.as_ref())
		{
			Some(condition) => condition.holds(&self.values),
			None => true,
		}
	}

	/// Re-run validation against the current tree and store the result.
	pub fn validate(&mut self) -> &ErrorMap {
		self.errors = self.schema.validate(&self.values);
		&self.errors
	}

	/// Force the submission flag, for views driving a manual flow.
	/// [`FormState::submit`] manages the flag itself.
	pub fn set_submitting(&mut self, submitting: bool) {
		self.is_submitting = submitting;
	}

	/// Run the gated submission flow.
	///
	/// Validation runs first; when it fails, every field is marked
	/// touched so all errors render, and the handler is never invoked.
	/// On a clean pass the handler is awaited with the current tree
	/// while the submitting flag is up. A rejection becomes the
	/// form-wide entry under [`ALL_FIELDS_KEY`]. The flag drops again
	/// on every path out.
	///
	/// Returns `true` only when the handler ran and accepted. A call
	/// while a submission is already in flight is refused up front.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldDef, FieldPath, FnSubmit, FormState, Schema};
	///
	/// let schema = Schema::new()
	///     .with_field(FieldDef::text(FieldPath::key("name")).required("Name is required"));
	/// let mut form = FormState::new(schema);
	/// form.set_input("name", "Ada");
	///
	/// let handler = FnSubmit(|_values: serde_json::Value| async { anyhow::Ok(()) });
	/// let accepted = tokio_test::block_on(form.submit(&handler));
	/// assert!(accepted);
	/// assert_eq!(form.submit_count(), 1);
	/// ```
	pub async fn submit<H>(&mut self, handler: &H) -> bool
	where
		H: SubmitHandler + ?Sized,
	{
		if self.is_submitting {
			tracing::warn!("submission already in flight, ignoring submit");
			return false;
		}
		self.submit_count += 1;
		self.errors = self.schema.validate(&self.values);
		if !self.errors.is_empty() {
			self.mark_all_touched();
			tracing::debug!(errors = self.errors.len(), "submit blocked by validation");
			return false;
		}
		self.is_submitting = true;
		let outcome = handler.on_submit(&self.values).await;
		self.is_submitting = false;
		match outcome {
			Ok(()) => {
				tracing::debug!("submit accepted");
				true
			}
			Err(error) => {
				tracing::warn!(error = %error, "submit handler rejected");
				self.errors
					.insert(ALL_FIELDS_KEY.to_string(), error.to_string());
				false
			}
		}
	}

	/// Restore starting values and clear touched state, errors, the
	/// submitting flag and the submit counter.
	pub fn reset(&mut self) {
		self.values = self.initial.clone();
		self.errors.clear();
		self.touched.clear();
		self.is_submitting = false;
		self.submit_count = 0;
	}

	/// Per-field read view for rendering, `None` when no definition
	/// covers the path.
	pub fn bound(&self, path: &str) -> Option<BoundField<'_>> {
		let parsed: FieldPath = path.parse().ok()?;
		let def = self.schema.field_for(&parsed)?;
		let key = parsed.to_string();
		let value = parsed.lookup(&self.values);
		let error = self.errors.get(&key).map(String::as_str);
		let touched = self.touched.contains(&key);
		let visible = self.visible(&parsed);
		Some(BoundField::new(def, parsed, value, error, touched, visible))
	}

	/// Serializable point-in-time state for whatever renders the form.
	pub fn snapshot(&self) -> FormSnapshot {
		let mut fields = Vec::new();
		for path in self.schema.concrete_paths(&self.values) {
			if let Some(bound) = self.bound(&path) {
				fields.push(FieldSnapshot {
					path,
					label: bound.label().map(str::to_owned),
					widget: bound.widget().clone(),
					value: bound.value().cloned(),
					error: bound.visible_error().map(str::to_owned),
					touched: bound.is_touched(),
					visible: bound.is_visible(),
				});
			}
		}
		let mut touched: Vec<String> = self.touched.iter().cloned().collect();
		touched.sort();
		FormSnapshot {
			values: self.values.clone(),
			errors: self.errors.clone(),
			touched,
			is_submitting: self.is_submitting,
			submit_count: self.submit_count,
			is_dirty: self.is_dirty(),
			is_valid: self.is_valid(),
			form_error: self.errors.get(ALL_FIELDS_KEY).cloned(),
			fields,
		}
	}
}
