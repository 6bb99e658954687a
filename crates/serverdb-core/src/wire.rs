// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON wire format for filters.
//!
//! A bare scalar is an equality filter. Every other filter is an object with
//! exactly one key naming it:
//!
//! ```json
//! {"os": {"Any": ["bookworm", "trixie"]}, "num_cpu": {"GreaterThan": 4}}
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::attribute::AttributeId;
use crate::error::FilterError;
use crate::filter::{Filter, Literal};

impl Filter {
	pub fn from_json(value: &Value) -> Result<Self, FilterError> {
		match value {
			Value::Object(map) => filter_from_object(map),
			Value::Array(_) => Err(FilterError::InvalidArgument {
				filter: "Equals",
				message: "lists must be wrapped in Any()".to_string(),
			}),
			Value::Null => Err(FilterError::InvalidArgument {
				filter: "Equals",
				message: "null is not a value, use Empty()".to_string(),
			}),
			scalar => Ok(Filter::Equals(literal_from_json("Equals", scalar)?)),
		}
	}

	pub fn to_json(&self) -> Value {
		match self {
			Filter::Equals(literal) => literal_to_json(literal),
			Filter::Not(inner) => json!({ "Not": inner.to_json() }),
			Filter::All(children) => {
				json!({ "All": children.iter().map(Filter::to_json).collect::<Vec<_>>() })
			}
			Filter::Any(children) => {
				json!({ "Any": children.iter().map(Filter::to_json).collect::<Vec<_>>() })
			}
			Filter::Regexp(pattern) => json!({ "Regexp": pattern }),
			Filter::Empty => json!({ "Empty": null }),
			Filter::GreaterThan(v)
			| Filter::LessThan(v)
			| Filter::GreaterThanOrEquals(v)
			| Filter::LessThanOrEquals(v)
			| Filter::StartsWith(v)
			| Filter::Contains(v)
			| Filter::ContainedBy(v)
			| Filter::ContainedOnlyBy(v)
			| Filter::Overlaps(v) => {
				let mut map = Map::new();
				map.insert(self.name().to_string(), literal_to_json(v));
				Value::Object(map)
			}
		}
	}
}

fn filter_from_object(map: &Map<String, Value>) -> Result<Filter, FilterError> {
	let mut entries = map.iter();
	let (name, argument) = match (entries.next(), map.len()) {
		(Some(entry), 1) => entry,
		_ => return Err(FilterError::MalformedObject(map.len())),
	};

	let filter = match name.as_str() {
		"Not" => Filter::Not(Box::new(Filter::from_json(argument)?)),
		"All" => Filter::All(children_from_json("All", argument)?),
		"Any" => Filter::Any(children_from_json("Any", argument)?),
		"Regexp" => match argument {
			Value::String(pattern) => Filter::Regexp(pattern.clone()),
			other => {
				return Err(FilterError::InvalidArgument {
					filter: "Regexp",
					message: format!("expected a pattern string, got {other}"),
				})
			}
		},
		"Empty" => {
			if !argument.is_null() {
				return Err(FilterError::InvalidArgument {
					filter: "Empty",
					message: "takes no argument".to_string(),
				});
			}
			Filter::Empty
		}
		"GreaterThan" => Filter::GreaterThan(literal_from_json("GreaterThan", argument)?),
		"LessThan" => Filter::LessThan(literal_from_json("LessThan", argument)?),
		"GreaterThanOrEquals" => {
			Filter::GreaterThanOrEquals(literal_from_json("GreaterThanOrEquals", argument)?)
		}
		"LessThanOrEquals" => {
			Filter::LessThanOrEquals(literal_from_json("LessThanOrEquals", argument)?)
		}
		"StartsWith" => Filter::StartsWith(literal_from_json("StartsWith", argument)?),
		"Contains" => Filter::Contains(literal_from_json("Contains", argument)?),
		"ContainedBy" => Filter::ContainedBy(literal_from_json("ContainedBy", argument)?),
		"ContainedOnlyBy" => {
			Filter::ContainedOnlyBy(literal_from_json("ContainedOnlyBy", argument)?)
		}
		"Overlaps" => Filter::Overlaps(literal_from_json("Overlaps", argument)?),
		other => return Err(FilterError::UnknownFilter(other.to_string())),
	};

	Ok(filter)
}

fn children_from_json(filter: &'static str, value: &Value) -> Result<Vec<Filter>, FilterError> {
	match value {
		Value::Array(items) => items.iter().map(Filter::from_json).collect(),
		other => Err(FilterError::InvalidArgument {
			filter,
			message: format!("expected a list of filters, got {other}"),
		}),
	}
}

fn literal_from_json(filter: &'static str, value: &Value) -> Result<Literal, FilterError> {
	match value {
		Value::Bool(v) => Ok(Literal::Bool(*v)),
		Value::String(v) => Ok(Literal::String(v.clone())),
		Value::Number(n) => {
			if let Some(v) = n.as_i64() {
				Ok(Literal::Integer(v))
			} else if let Some(v) = n.as_f64() {
				Ok(Literal::Float(v))
			} else {
				Err(FilterError::InvalidArgument {
					filter,
					message: format!("number {n} is out of range"),
				})
			}
		}
		other => Err(FilterError::InvalidArgument {
			filter,
			message: format!("expected a scalar value, got {other}"),
		}),
	}
}

fn literal_to_json(literal: &Literal) -> Value {
	match literal {
		Literal::Bool(v) => json!(v),
		Literal::Integer(v) => json!(v),
		Literal::Float(v) => json!(v),
		Literal::String(v) => json!(v),
		Literal::Inet(v) => json!(v.to_string()),
	}
}

impl Serialize for Filter {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_json().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Filter {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		Filter::from_json(&value).map_err(serde::de::Error::custom)
	}
}

/// Parses a query object mapping attribute ids to filters.
///
/// Attributes come back sorted by id.
pub fn parse_query(input: &str) -> Result<Vec<(AttributeId, Filter)>, FilterError> {
	let value: Value = serde_json::from_str(input)?;
	let Value::Object(map) = value else {
		return Err(FilterError::MalformedQuery);
	};

	map.iter()
		.map(|(attribute, filter)| Ok((AttributeId::new(attribute.as_str()), Filter::from_json(filter)?)))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bare_scalars_are_equality() {
		assert_eq!(
			Filter::from_json(&json!("web01")).unwrap(),
			Filter::equals("web01")
		);
		assert_eq!(Filter::from_json(&json!(4)).unwrap(), Filter::equals(4i64));
		assert_eq!(Filter::from_json(&json!(0.5)).unwrap(), Filter::equals(0.5));
		assert_eq!(Filter::from_json(&json!(false)).unwrap(), Filter::equals(false));
	}

	#[test]
	fn test_nested_filters() {
		let parsed = Filter::from_json(&json!({
			"Any": ["a", {"Not": {"Regexp": "^b"}}, {"Empty": null}]
		}))
		.unwrap();

		assert_eq!(
			parsed,
			Filter::Any(vec![
				Filter::equals("a"),
				Filter::negate(Filter::Regexp("^b".to_string())),
				Filter::Empty,
			])
		);
	}

	#[test]
	fn test_unknown_filter() {
		let err = Filter::from_json(&json!({"Between": [1, 2]})).unwrap_err();
		assert!(matches!(err, FilterError::UnknownFilter(name) if name == "Between"));
	}

	#[test]
	fn test_object_with_two_keys() {
		let err = Filter::from_json(&json!({"Any": [], "All": []})).unwrap_err();
		assert!(matches!(err, FilterError::MalformedObject(2)));
	}

	#[test]
	fn test_rejects_null_and_lists() {
		assert!(Filter::from_json(&Value::Null).is_err());
		assert!(Filter::from_json(&json!([1, 2])).is_err());
		assert!(Filter::from_json(&json!({"Contains": [1]})).is_err());
		assert!(Filter::from_json(&json!({"Empty": 1})).is_err());
	}

	#[test]
	fn test_serde_roundtrip() {
		let filter = Filter::All(vec![
			Filter::GreaterThanOrEquals(Literal::Integer(2)),
			Filter::negate(Filter::Contains(Literal::from("x"))),
		]);
		let text = serde_json::to_string(&filter).unwrap();
		let parsed: Filter = serde_json::from_str(&text).unwrap();
		assert_eq!(parsed, filter);
	}

	#[test]
	fn test_parse_query() {
		let query = parse_query(r#"{"os": {"Any": ["bookworm", "trixie"]}, "num_cpu": {"GreaterThan": 4}}"#)
			.unwrap();

		assert_eq!(query.len(), 2);
		assert_eq!(query[0].0, AttributeId::new("num_cpu"));
		assert_eq!(query[0].1, Filter::GreaterThan(Literal::Integer(4)));
		assert_eq!(query[1].0, AttributeId::new("os"));
	}

	#[test]
	fn test_parse_query_rejects_non_object() {
		assert!(matches!(
			parse_query("[1]").unwrap_err(),
			FilterError::MalformedQuery
		));
	}
}
