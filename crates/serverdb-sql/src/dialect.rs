// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL dialects.
//!
//! PostgreSQL is the production target. SQLite covers everything that does
//! not need network operators or regular expressions.

use serverdb_config::DialectKind;
use serverdb_core::ValueDomain;

use crate::encode::escape_like;
use crate::error::{CompileError, Result};
use crate::fragment::{SqlValue, Template};

pub trait Dialect: Send + Sync + std::fmt::Debug {
	fn kind(&self) -> DialectKind;

	/// Placeholder for the 1-based parameter `index`.
	fn placeholder(&self, index: usize) -> String;

	/// Suffix converting a text parameter into the column type.
	fn cast(&self, domain: ValueDomain) -> Option<&'static str>;

	/// Suffix converting a column to text before pattern matching.
	fn text_cast(&self) -> &'static str;

	fn regex_operator(&self) -> Result<&'static str>;

	/// Fails unless `>>=`, `<<=`, `<<`, `&&` and `host()` are available.
	fn require_network(&self) -> Result<()>;

	fn contains(&self, needle: &str) -> Template;

	fn starts_with(&self, prefix: &str) -> Template;

	/// The column value is a substring of `haystack`.
	fn contained_by(&self, haystack: &str) -> Template;
}

pub fn for_kind(kind: DialectKind) -> Box<dyn Dialect> {
	match kind {
		DialectKind::Postgres => Box::new(Postgres),
		DialectKind::Sqlite => Box::new(Sqlite),
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
	fn kind(&self) -> DialectKind {
		DialectKind::Postgres
	}

	fn placeholder(&self, index: usize) -> String {
		format!("${index}")
	}

	fn cast(&self, domain: ValueDomain) -> Option<&'static str> {
		match domain {
			ValueDomain::Inet => Some("::inet"),
			ValueDomain::Macaddr => Some("::macaddr"),
			ValueDomain::Date => Some("::date"),
			ValueDomain::Datetime => Some("::timestamptz"),
			ValueDomain::Number => Some("::numeric"),
			ValueDomain::Boolean | ValueDomain::String => None,
		}
	}

	fn text_cast(&self) -> &'static str {
		"::text"
	}

	fn regex_operator(&self) -> Result<&'static str> {
		Ok("~")
	}

	fn require_network(&self) -> Result<()> {
		Ok(())
	}

	fn contains(&self, needle: &str) -> Template {
		like(format!("%{}%", escape_like(needle)))
	}

	fn starts_with(&self, prefix: &str) -> Template {
		like(format!("{}%", escape_like(prefix)))
	}

	fn contained_by(&self, haystack: &str) -> Template {
		Template::new()
			.sql("strpos(")
			.param(SqlValue::text(haystack))
			.sql(", ")
			.column()
			.sql(") > 0")
	}
}

fn like(pattern: String) -> Template {
	Template::new()
		.column()
		.sql(" LIKE ")
		.param(SqlValue::Text(pattern))
		.sql(" ESCAPE '\\'")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Sqlite {
	fn unsupported(feature: &'static str) -> CompileError {
		CompileError::UnsupportedByDialect {
			dialect: DialectKind::Sqlite,
			feature,
		}
	}
}

impl Dialect for Sqlite {
	fn kind(&self) -> DialectKind {
		DialectKind::Sqlite
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn cast(&self, _domain: ValueDomain) -> Option<&'static str> {
		None
	}

	fn text_cast(&self) -> &'static str {
		""
	}

	fn regex_operator(&self) -> Result<&'static str> {
		Err(Self::unsupported("regular expressions"))
	}

	fn require_network(&self) -> Result<()> {
		Err(Self::unsupported("network containment"))
	}

	// instr() and substr() compare exactly, so no pattern escaping is needed.
	fn contains(&self, needle: &str) -> Template {
		Template::new()
			.sql("instr(")
			.column()
			.sql(", ")
			.param(SqlValue::text(needle))
			.sql(") > 0")
	}

	fn starts_with(&self, prefix: &str) -> Template {
		Template::new()
			.sql("substr(")
			.column()
			.sql(", 1, length(")
			.param(SqlValue::text(prefix))
			.sql(")) = ")
			.param(SqlValue::text(prefix))
	}

	fn contained_by(&self, haystack: &str) -> Template {
		Template::new()
			.sql("instr(")
			.param(SqlValue::text(haystack))
			.sql(", ")
			.column()
			.sql(") > 0")
	}
}
