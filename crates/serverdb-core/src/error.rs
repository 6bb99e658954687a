// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::attribute::AttributeId;
use crate::servertype::ServertypeId;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	#[error("Unknown attribute: {0}")]
	UnknownAttribute(AttributeId),

	#[error("Unknown servertype: {0}")]
	UnknownServertype(ServertypeId),

	#[error("Duplicate attribute: {0}")]
	DuplicateAttribute(AttributeId),

	#[error("Duplicate servertype: {0}")]
	DuplicateServertype(ServertypeId),

	#[error("Attribute {attribute} is bound twice to servertype {servertype}")]
	DuplicateBinding {
		servertype: ServertypeId,
		attribute: AttributeId,
	},

	#[error("Attribute {attribute} reverses {reversed}, which is not a hostname attribute")]
	InvalidReverse {
		attribute: AttributeId,
		reversed: AttributeId,
	},

	#[error("Attribute {attribute} on servertype {servertype} cannot be related via {via}: {reason}")]
	InvalidRelatedVia {
		servertype: ServertypeId,
		attribute: AttributeId,
		via: AttributeId,
		reason: &'static str,
	},

	#[error("Special attribute {0} must have a scalar type")]
	InvalidSpecial(AttributeId),

	#[error("Unknown attribute type: {0}")]
	UnknownType(String),

	#[error("Attribute {attribute}: missing {field}")]
	MissingField {
		attribute: AttributeId,
		field: &'static str,
	},

	#[error("Failed to parse TOML schema: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Failed to parse JSON schema: {0}")]
	Json(#[from] serde_json::Error),
}

/// Errors for filters received in the JSON wire format.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
	#[error("Unknown filter: {0}")]
	UnknownFilter(String),

	#[error("Invalid argument for {filter}(): {message}")]
	InvalidArgument {
		filter: &'static str,
		message: String,
	},

	#[error("Filter objects must have exactly one key, got {0}")]
	MalformedObject(usize),

	#[error("Query must be a JSON object of attribute filters")]
	MalformedQuery,

	#[error("Invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
