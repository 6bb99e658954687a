// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serverdb_config::DialectKind;
use serverdb_core::{AttributeId, SchemaError};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
	#[error("Type mismatch for {attribute}: expected {expected}, found {found}")]
	TypeMismatch {
		attribute: AttributeId,
		expected: &'static str,
		found: &'static str,
	},

	#[error("Unsupported operator {filter}() on {attribute_type} attribute {attribute}")]
	UnsupportedOperator {
		attribute: AttributeId,
		filter: &'static str,
		attribute_type: &'static str,
	},

	#[error("Attribute {0} has no ordering")]
	UnorderableType(AttributeId),

	#[error("Value cannot be encoded safely: {0}")]
	UnencodableValue(String),

	#[error("Attribute {0} is not reachable from the requested servertypes")]
	UnreachableAttribute(AttributeId),

	#[error("Unknown hostname: {0}")]
	UnknownHostname(String),

	#[error("Resolving {attribute} needs more than {max_depth} related-via steps")]
	RelationDepthExceeded {
		attribute: AttributeId,
		max_depth: usize,
	},

	#[error("The {dialect} dialect does not support {feature}")]
	UnsupportedByDialect {
		dialect: DialectKind,
		feature: &'static str,
	},

	#[error("Schema error: {0}")]
	Schema(#[from] SchemaError),

	#[error("Database error: {0}")]
	Lookup(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, CompileError>;
