// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query compiler configuration section.

use serde::{Deserialize, Serialize};

/// SQL dialect the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
	#[default]
	Postgres,
	Sqlite,
}

impl DialectKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			DialectKind::Postgres => "postgres",
			DialectKind::Sqlite => "sqlite",
		}
	}
}

impl std::fmt::Display for DialectKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for DialectKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" => Ok(DialectKind::Postgres),
			"sqlite" => Ok(DialectKind::Sqlite),
			_ => Err(format!("unknown dialect: {s}")),
		}
	}
}

/// Meaning of an `All()` filter without children.
///
/// `Any()` without children never matches. `Vacuous` lets an empty `All()`
/// match every server, `Unsatisfiable` makes it behave like an empty `Any()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyAllSemantics {
	#[default]
	Vacuous,
	Unsatisfiable,
}

impl std::str::FromStr for EmptyAllSemantics {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"vacuous" | "true" => Ok(EmptyAllSemantics::Vacuous),
			"unsatisfiable" | "false" => Ok(EmptyAllSemantics::Unsatisfiable),
			_ => Err(format!("unknown empty All() semantics: {s}")),
		}
	}
}

const DEFAULT_MAX_RELATION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompilerConfigLayer {
	pub dialect: Option<DialectKind>,
	pub empty_all: Option<EmptyAllSemantics>,
	pub max_relation_depth: Option<usize>,
	pub merge_equalities: Option<bool>,
}

impl CompilerConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.dialect.is_some() {
			self.dialect = other.dialect;
		}
		if other.empty_all.is_some() {
			self.empty_all = other.empty_all;
		}
		if other.max_relation_depth.is_some() {
			self.max_relation_depth = other.max_relation_depth;
		}
		if other.merge_equalities.is_some() {
			self.merge_equalities = other.merge_equalities;
		}
	}

	pub fn finalize(self) -> CompilerConfig {
		CompilerConfig {
			dialect: self.dialect.unwrap_or_default(),
			empty_all: self.empty_all.unwrap_or_default(),
			max_relation_depth: self
				.max_relation_depth
				.unwrap_or(DEFAULT_MAX_RELATION_DEPTH),
			merge_equalities: self.merge_equalities.unwrap_or(true),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompilerConfig {
	pub dialect: DialectKind,
	pub empty_all: EmptyAllSemantics,
	/// Longest chain of related-via attributes followed before giving up.
	pub max_relation_depth: usize,
	/// Collapse runs of equality filters inside `Any()` into one `IN` list.
	pub merge_equalities: bool,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		CompilerConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = CompilerConfig::default();
		assert_eq!(config.dialect, DialectKind::Postgres);
		assert_eq!(config.empty_all, EmptyAllSemantics::Vacuous);
		assert_eq!(config.max_relation_depth, 8);
		assert!(config.merge_equalities);
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = CompilerConfigLayer {
			dialect: Some(DialectKind::Postgres),
			max_relation_depth: Some(4),
			..Default::default()
		};
		base.merge(CompilerConfigLayer {
			dialect: Some(DialectKind::Sqlite),
			..Default::default()
		});
		assert_eq!(base.dialect, Some(DialectKind::Sqlite));
		assert_eq!(base.max_relation_depth, Some(4));
	}

	#[test]
	fn test_deserialize_layer() {
		let layer: CompilerConfigLayer = toml::from_str(
			r#"
			dialect = "sqlite"
			empty_all = "unsatisfiable"
			"#,
		)
		.unwrap();
		assert_eq!(layer.dialect, Some(DialectKind::Sqlite));
		assert_eq!(layer.empty_all, Some(EmptyAllSemantics::Unsatisfiable));
		assert!(layer.max_relation_depth.is_none());
	}

	#[test]
	fn test_parse_from_str() {
		assert_eq!("PostgreSQL".parse::<DialectKind>(), Ok(DialectKind::Postgres));
		assert_eq!(
			"unsatisfiable".parse::<EmptyAllSemantics>(),
			Ok(EmptyAllSemantics::Unsatisfiable)
		);
		assert!("mysql".parse::<DialectKind>().is_err());
	}
}
