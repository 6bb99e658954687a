// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeId;

/// Unique identifier of a servertype, e.g. `"vm"` or `"rack"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServertypeId(pub String);

impl ServertypeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for ServertypeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for ServertypeId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Declares that servers of `servertype` carry `attribute`.
///
/// With `related_via` set, the value is not stored on the server itself but
/// on the server reached through that link attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServertypeAttribute {
	pub servertype: ServertypeId,
	pub attribute: AttributeId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub related_via: Option<AttributeId>,
}

impl ServertypeAttribute {
	pub fn direct(servertype: impl Into<String>, attribute: impl Into<String>) -> Self {
		Self {
			servertype: ServertypeId::new(servertype),
			attribute: AttributeId::new(attribute),
			related_via: None,
		}
	}

	pub fn related_via(
		servertype: impl Into<String>,
		attribute: impl Into<String>,
		via: impl Into<String>,
	) -> Self {
		Self {
			servertype: ServertypeId::new(servertype),
			attribute: AttributeId::new(attribute),
			related_via: Some(AttributeId::new(via)),
		}
	}
}
