//! Field paths addressing slots in a value tree
//!
//! A path is a dot-separated run of segments: object keys, array
//! positions and the `*` wildcard standing for every array position.
//! `address.city` names the city inside a nested address object and
//! `hobbies.0.name` the name of the first hobby entry. Paths are the
//! keys of every map this crate hands out, so their string form is
//! canonical: parsing and printing round-trip.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
	#[error("Field path is empty")]
	Empty,
	#[error("Field path '{0}' has an empty segment")]
	EmptySegment(String),
	#[error("Field path '{0}' has an index out of range")]
	IndexOutOfRange(String),
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Object key, `address` in `address.city`.
	Key(String),
	/// Array position, `0` in `hobbies.0.name`.
	Index(usize),
	/// Wildcard matching every array position, written `*`.
	Any,
}

/// Locator for one slot in a `serde_json::Value` tree.
///
/// Paths are built from typed segments or parsed from their dotted
/// string form. A path containing a wildcard segment is a pattern: it
/// addresses nothing itself but expands to the concrete paths it covers
/// in an actual tree.
///
/// # Examples
///
/// ```
/// use formwork::FieldPath;
/// use serde_json::json;
///
/// let path: FieldPath = "address.city".parse().unwrap();
/// assert_eq!(path, FieldPath::key("address").child("city"));
///
/// let tree = json!({ "address": { "city": "Lyon" } });
/// assert_eq!(path.lookup(&tree), Some(&json!("Lyon")));
/// assert_eq!(path.to_string(), "address.city");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
	segments: Vec<Segment>,
}

impl FieldPath {
	/// Start a path at an object key.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::FieldPath;
	///
	/// let path = FieldPath::key("hobbies").index(0).child("name");
	/// assert_eq!(path.to_string(), "hobbies.0.name");
	/// ```
	pub fn key(name: impl Into<String>) -> Self {
		Self {
			segments: vec![Segment::Key(name.into())],
		}
	}

	/// Append an object key segment.
	pub fn child(mut self, name: impl Into<String>) -> Self {
		self.segments.push(Segment::Key(name.into()));
		self
	}

	/// Append an array position segment.
	pub fn index(mut self, index: usize) -> Self {
		self.segments.push(Segment::Index(index));
		self
	}

	/// Append a wildcard segment, turning the path into a pattern.
	pub fn any(mut self) -> Self {
		self.segments.push(Segment::Any);
		self
	}

	/// Typed view of the parsed segments.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::{FieldPath, Segment};
	///
	/// let path: FieldPath = "hobbies.0.name".parse().unwrap();
	/// assert_eq!(path.segments().len(), 3);
	/// assert_eq!(path.segments()[1], Segment::Index(0));
	/// ```
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Whether the path contains a wildcard segment.
	pub fn is_pattern(&self) -> bool {
		self.segments.contains(&Segment::Any)
	}

	/// Whether this path, read as a pattern, covers `concrete`.
	///
	/// Wildcard segments cover any array position; all other segments
	/// must match exactly, including the overall length.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::FieldPath;
	///
	/// let pattern = FieldPath::key("hobbies").any().child("name");
	/// assert!(pattern.matches(&"hobbies.3.name".parse().unwrap()));
	/// assert!(!pattern.matches(&"hobbies.3".parse().unwrap()));
	/// assert!(!pattern.matches(&"address.city".parse().unwrap()));
	/// ```
	pub fn matches(&self, concrete: &FieldPath) -> bool {
		self.segments.len() == concrete.segments.len()
			&& self
				.segments
				.iter()
				.zip(&concrete.segments)
				.all(|(pattern, segment)| match (pattern, segment) {
					(Segment::Any, Segment::Index(_)) => true,
					(pattern, segment) => pattern == segment,
				})
	}

	/// Resolve the slot this path addresses, if the tree has it.
	///
	/// Pattern paths address nothing; expand them first.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::FieldPath;
	/// use serde_json::json;
	///
	/// let tree = json!({ "hobbies": [{ "name": "chess" }] });
	/// let path: FieldPath = "hobbies.0.name".parse().unwrap();
	/// assert_eq!(path.lookup(&tree), Some(&json!("chess")));
	///
	/// let missing: FieldPath = "hobbies.1.name".parse().unwrap();
	/// assert_eq!(missing.lookup(&tree), None);
	/// ```
	pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
		let mut cursor = root;
		for segment in &self.segments {
			cursor = match segment {
				Segment::Key(key) => cursor.get(key.as_str())?,
				Segment::Index(index) => cursor.get(*index)?,
				Segment::Any => return None,
			};
		}
		Some(cursor)
	}

	/// Mutable variant of [`FieldPath::lookup`].
	pub fn lookup_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
		let mut cursor = root;
		for segment in &self.segments {
			cursor = match segment {
				Segment::Key(key) => cursor.get_mut(key.as_str())?,
				Segment::Index(index) => cursor.get_mut(*index)?,
				Segment::Any => return None,
			};
		}
		Some(cursor)
	}

	/// Write `new` at the slot this path addresses, reporting whether
	/// the write landed.
	///
	/// Missing objects along key segments are created on the way down.
	/// Arrays are never created or grown: an out-of-range position
	/// refuses the write, as does navigating through a scalar. The
	/// whole chain is checked before anything is created, so a refused
	/// write leaves the tree exactly as it was.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::FieldPath;
	/// use serde_json::json;
	///
	/// let mut tree = json!({ "address": { "city": "" }, "hobbies": [{ "name": "" }] });
	///
	/// let city: FieldPath = "address.city".parse().unwrap();
	/// assert!(city.write(&mut tree, json!("Lyon")));
	///
	/// let out_of_range: FieldPath = "hobbies.5.name".parse().unwrap();
	/// assert!(!out_of_range.write(&mut tree, json!("chess")));
	/// assert_eq!(tree["address"]["city"], json!("Lyon"));
	///
	/// let through_missing: FieldPath = "junk.0".parse().unwrap();
	/// assert!(!through_missing.write(&mut tree, json!(1)));
	/// assert_eq!(tree.get("junk"), None);
	/// ```
	pub fn write(&self, root: &mut Value, new: Value) -> bool {
		if !self.writable(root) {
			return false;
		}
		let Some((last, parents)) = self.segments.split_last() else {
			return false;
		};
		let mut cursor = root;
		for segment in parents {
			cursor = match segment {
				Segment::Key(key) => {
					let Value::Object(map) = cursor else {
						return false;
					};
					map.entry(key.clone())
						.or_insert_with(|| Value::Object(serde_json::Map::new()))
				}
				Segment::Index(index) => {
					let Value::Array(items) = cursor else {
						return false;
					};
					let Some(slot) = items.get_mut(*index) else {
						return false;
					};
					slot
				}
				Segment::Any => return false,
			};
		}
		match last {
			Segment::Key(key) => {
				let Value::Object(map) = cursor else {
					return false;
				};
				map.insert(key.clone(), new);
				true
			}
			Segment::Index(index) => {
				let Value::Array(items) = cursor else {
					return false;
				};
				let Some(slot) = items.get_mut(*index) else {
					return false;
				};
				*slot = new;
				true
			}
			Segment::Any => false,
		}
	}

	/// Whether a write at this path would land, checked without
	/// touching the tree. Keys may run past the end of the tree, since
	/// each missing object is created as the write descends; anything
	/// else has to be present already.
	fn writable(&self, root: &Value) -> bool {
		let Some((last, parents)) = self.segments.split_last() else {
			return false;
		};
		let mut cursor = Some(root);
		for segment in parents {
			cursor = match (segment, cursor) {
				(Segment::Key(key), Some(Value::Object(map))) => map.get(key.as_str()),
				(Segment::Key(_), None) => None,
				(Segment::Index(index), Some(Value::Array(items))) => {
					let Some(item) = items.get(*index) else {
						return false;
					};
					Some(item)
				}
				_ => return false,
			};
		}
		match (last, cursor) {
			(Segment::Key(_), Some(Value::Object(_)) | None) => true,
			(Segment::Index(index), Some(Value::Array(items))) => *index < items.len(),
			_ => false,
		}
	}

	/// Expand a pattern against an actual tree into the concrete paths
	/// it covers, one per array position under each wildcard.
	///
	/// A path without wildcards expands to itself even when the tree is
	/// missing the slot, so absent values still get validated. Wildcards
	/// over missing or non-array values expand to nothing.
	///
	/// # Examples
	///
	/// ```
	/// use formwork::FieldPath;
	/// use serde_json::json;
	///
	/// let tree = json!({ "hobbies": [{ "name": "chess" }, { "name": "" }] });
	/// let pattern = FieldPath::key("hobbies").any().child("name");
	///
	/// let concrete: Vec<String> =
	///     pattern.expand(&tree).iter().map(|p| p.to_string()).collect();
	/// assert_eq!(concrete, ["hobbies.0.name", "hobbies.1.name"]);
	/// ```
	pub fn expand(&self, root: &Value) -> Vec<FieldPath> {
		let mut out = Vec::new();
		let mut prefix = Vec::with_capacity(self.segments.len());
		expand_into(&self.segments, Some(root), &mut prefix, &mut out);
		out
	}
}

fn expand_into(
	rest: &[Segment],
	cursor: Option<&Value>,
	prefix: &mut Vec<Segment>,
	out: &mut Vec<FieldPath>,
) {
	let Some((head, tail)) = rest.split_first() else {
		out.push(FieldPath {
			segments: prefix.clone(),
		});
		return;
	};
	match head {
		Segment::Any => {
			let Some(Value::Array(items)) = cursor else {
				return;
			};
			for (index, item) in items.iter().enumerate() {
				prefix.push(Segment::Index(index));
				expand_into(tail, Some(item), prefix, out);
				prefix.pop();
			}
		}
		segment => {
			let child = match (cursor, segment) {
				(Some(value), Segment::Key(key)) => value.get(key.as_str()),
				(Some(value), Segment::Index(index)) => value.get(*index),
				_ => None,
			};
			if child.is_none() && tail.contains(&Segment::Any) {
				return;
			}
			prefix.push(segment.clone());
			expand_into(tail, child, prefix, out);
			prefix.pop();
		}
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (position, segment) in self.segments.iter().enumerate() {
			if position > 0 {
				f.write_str(".")?;
			}
			match segment {
				Segment::Key(key) => f.write_str(key)?,
				Segment::Index(index) => write!(f, "{index}")?,
				Segment::Any => f.write_str("*")?,
			}
		}
		Ok(())
	}
}

impl FromStr for FieldPath {
	type Err = PathParseError;

	/// Parse the dotted string form. All-digit segments become array
	/// positions, `*` becomes a wildcard, everything else an object key.
	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		if raw.is_empty() {
			return Err(PathParseError::Empty);
		}
		let mut segments = Vec::new();
		for token in raw.split('.') {
			if token.is_empty() {
				return Err(PathParseError::EmptySegment(raw.to_owned()));
			}
			let segment = if token == "*" {
				Segment::Any
			} else if token.bytes().all(|b| b.is_ascii_digit()) {
				Segment::Index(
					token
						.parse()
						.map_err(|_| PathParseError::IndexOutOfRange(raw.to_owned()))?,
				)
			} else {
				Segment::Key(token.to_owned())
			};
			segments.push(segment);
		}
		Ok(Self { segments })
	}
}

impl Serialize for FieldPath {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for FieldPath {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("firstName", "firstName")]
	#[case("address.city", "address.city")]
	#[case("hobbies.0.name", "hobbies.0.name")]
	#[case("hobbies.*.name", "hobbies.*.name")]
	#[case("hobbies.007.name", "hobbies.7.name")]
	fn test_parse_canonicalizes(#[case] raw: &str, #[case] canonical: &str) {
		let path: FieldPath = raw.parse().expect("path should parse");
		assert_eq!(path.to_string(), canonical);
	}

	#[rstest]
	#[case("", PathParseError::Empty)]
	#[case(".city", PathParseError::EmptySegment(".city".to_string()))]
	#[case("address..city", PathParseError::EmptySegment("address..city".to_string()))]
	#[case("address.", PathParseError::EmptySegment("address.".to_string()))]
	#[case(
		"hobbies.99999999999999999999999.name",
		PathParseError::IndexOutOfRange("hobbies.99999999999999999999999.name".to_string())
	)]
	fn test_parse_rejects(#[case] raw: &str, #[case] expected: PathParseError) {
		assert_eq!(raw.parse::<FieldPath>(), Err(expected));
	}

	#[rstest]
	fn test_typed_builders_match_parsed_form() {
		assert_eq!(
			FieldPath::key("address").child("city"),
			"address.city".parse().unwrap()
		);
		assert_eq!(
			FieldPath::key("hobbies").index(2).child("name"),
			"hobbies.2.name".parse().unwrap()
		);
		assert_eq!(
			FieldPath::key("hobbies").any().child("name"),
			"hobbies.*.name".parse().unwrap()
		);
	}

	#[rstest]
	fn test_lookup_walks_objects_and_arrays() {
		let tree = json!({
			"address": { "city": "Lyon" },
			"hobbies": [{ "name": "chess" }],
		});

		let city: FieldPath = "address.city".parse().unwrap();
		assert_eq!(city.lookup(&tree), Some(&json!("Lyon")));

		let hobby: FieldPath = "hobbies.0.name".parse().unwrap();
		assert_eq!(hobby.lookup(&tree), Some(&json!("chess")));

		let missing: FieldPath = "address.zip".parse().unwrap();
		assert_eq!(missing.lookup(&tree), None);

		let pattern: FieldPath = "hobbies.*.name".parse().unwrap();
		assert_eq!(pattern.lookup(&tree), None);
	}

	#[rstest]
	fn test_write_replaces_existing_slot() {
		let mut tree = json!({ "firstName": "" });
		let path: FieldPath = "firstName".parse().unwrap();

		assert!(path.write(&mut tree, json!("Ada")));
		assert_eq!(tree, json!({ "firstName": "Ada" }));
	}

	#[rstest]
	fn test_write_creates_missing_objects() {
		let mut tree = json!({});
		let path: FieldPath = "address.city".parse().unwrap();

		assert!(path.write(&mut tree, json!("Lyon")));
		assert_eq!(tree, json!({ "address": { "city": "Lyon" } }));
	}

	#[rstest]
	fn test_write_refuses_out_of_range_index() {
		let mut tree = json!({ "hobbies": [{ "name": "" }] });
		let path: FieldPath = "hobbies.5.name".parse().unwrap();

		assert!(!path.write(&mut tree, json!("chess")));
		assert_eq!(tree, json!({ "hobbies": [{ "name": "" }] }));
	}

	#[rstest]
	fn test_write_refuses_navigating_through_scalar() {
		let mut tree = json!({ "firstName": "Ada" });
		let path: FieldPath = "firstName.x".parse().unwrap();

		assert!(!path.write(&mut tree, json!("oops")));
		assert_eq!(tree, json!({ "firstName": "Ada" }));
	}

	#[rstest]
	#[case("junk.0")]
	#[case("meta.info.3.x")]
	#[case("address.tags.0")]
	fn test_refused_write_creates_nothing(#[case] raw: &str) {
		// An index under a missing key can never land, and the objects
		// leading up to it must not appear either.
		let mut tree = json!({ "address": { "city": "Lyon" } });
		let path: FieldPath = raw.parse().unwrap();

		assert!(!path.write(&mut tree, json!(1)));
		assert_eq!(tree, json!({ "address": { "city": "Lyon" } }));
	}

	#[rstest]
	fn test_expand_concrete_path_is_identity() {
		let tree = json!({ "firstName": "" });
		let path: FieldPath = "firstName".parse().unwrap();
		assert_eq!(path.expand(&tree), vec![path]);
	}

	#[rstest]
	fn test_expand_keeps_missing_concrete_paths() {
		// Absent slots still need their required checks to run.
		let tree = json!({});
		let path: FieldPath = "address.city".parse().unwrap();
		assert_eq!(path.expand(&tree), vec![path]);
	}

	#[rstest]
	fn test_expand_wildcard_per_entry() {
		let tree = json!({ "hobbies": [{ "name": "a" }, { "name": "b" }, {}] });
		let pattern: FieldPath = "hobbies.*.name".parse().unwrap();

		let concrete: Vec<String> = pattern
			.expand(&tree)
			.iter()
			.map(|path| path.to_string())
			.collect();
		assert_eq!(
			concrete,
			["hobbies.0.name", "hobbies.1.name", "hobbies.2.name"]
		);
	}

	#[rstest]
	fn test_expand_wildcard_over_missing_array_is_empty() {
		let tree = json!({});
		let pattern: FieldPath = "hobbies.*.name".parse().unwrap();
		assert!(pattern.expand(&tree).is_empty());
	}

	#[rstest]
	fn test_serde_round_trip_as_string() {
		let path: FieldPath = "hobbies.*.name".parse().unwrap();
		let json = serde_json::to_string(&path).expect("serialize path");
		assert_eq!(json, "\"hobbies.*.name\"");

		let back: FieldPath = serde_json::from_str(&json).expect("deserialize path");
		assert_eq!(back, path);
	}
}
