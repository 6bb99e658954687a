// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::servertype::ServertypeId;

/// Unique identifier of an attribute, e.g. `"os"` or `"intern_ip"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub String);

impl AttributeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for AttributeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for AttributeId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Storage domain of a plain scalar attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
	Boolean,
	Number,
	String,
	Inet,
	Macaddr,
	Date,
	Datetime,
}

impl ValueDomain {
	pub fn as_str(&self) -> &'static str {
		match self {
			ValueDomain::Boolean => "boolean",
			ValueDomain::Number => "number",
			ValueDomain::String => "string",
			ValueDomain::Inet => "inet",
			ValueDomain::Macaddr => "macaddr",
			ValueDomain::Date => "date",
			ValueDomain::Datetime => "datetime",
		}
	}
}

impl std::fmt::Display for ValueDomain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How an attribute's values are typed and physically reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
	/// Plain value stored on a per-domain side table or a server column.
	Scalar(ValueDomain),
	/// Forward link to another server, stored as its server id.
	Hostname {
		target_servertype: Option<ServertypeId>,
	},
	/// Servers pointing at this one through `reversed_attribute`.
	ReverseHostname { reversed_attribute: AttributeId },
	/// Servers of `target_servertype` whose network contains this one's.
	Supernet { target_servertype: ServertypeId },
}

impl AttributeType {
	/// Name used in the schema documents and in error messages.
	pub fn name(&self) -> &'static str {
		match self {
			AttributeType::Scalar(domain) => domain.as_str(),
			AttributeType::Hostname { .. } => "hostname",
			AttributeType::ReverseHostname { .. } => "reverse_hostname",
			AttributeType::Supernet { .. } => "supernet",
		}
	}

	/// Link types address other servers instead of carrying a value.
	pub fn is_link(&self) -> bool {
		!matches!(self, AttributeType::Scalar(_))
	}
}

impl std::fmt::Display for AttributeType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Maps an attribute onto a fixed column of the server table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialField {
	pub field: String,
}

impl SpecialField {
	pub fn new(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
		}
	}

	/// Column name on the server table, without the internal `_` marker.
	pub fn column(&self) -> &str {
		self.field.strip_prefix('_').unwrap_or(&self.field)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub id: AttributeId,
	pub attribute_type: AttributeType,
	pub special: Option<SpecialField>,
	pub multi: bool,
}

impl Attribute {
	pub fn new(id: impl Into<String>, attribute_type: AttributeType) -> Self {
		Self {
			id: AttributeId::new(id),
			attribute_type,
			special: None,
			multi: false,
		}
	}

	pub fn scalar(id: impl Into<String>, domain: ValueDomain) -> Self {
		Self::new(id, AttributeType::Scalar(domain))
	}

	pub fn with_special(mut self, field: impl Into<String>) -> Self {
		self.special = Some(SpecialField::new(field));
		self
	}

	pub fn is_special(&self) -> bool {
		self.special.is_some()
	}

	pub fn is_boolean(&self) -> bool {
		self.attribute_type == AttributeType::Scalar(ValueDomain::Boolean)
	}
}
