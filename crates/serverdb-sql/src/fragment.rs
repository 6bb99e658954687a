// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parameterized SQL fragments.
//!
//! A [`Condition`] is a sequence of SQL text and bound values. Placeholders
//! are only numbered when the finished statement is rendered, so conditions
//! can be nested and concatenated freely.

use crate::dialect::Dialect;
use crate::encode::inline_value;

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
	Text(String),
	Integer(i64),
}

impl SqlValue {
	pub fn text(value: impl Into<String>) -> Self {
		SqlValue::Text(value.into())
	}
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
	Sql(String),
	Param(SqlValue),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
	pieces: Vec<Piece>,
}

impl Condition {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn raw(sql: impl Into<String>) -> Self {
		Self::new().sql(sql)
	}

	pub fn sql(mut self, sql: impl Into<String>) -> Self {
		self.push_sql(sql);
		self
	}

	pub fn param(mut self, value: SqlValue) -> Self {
		self.pieces.push(Piece::Param(value));
		self
	}

	pub fn then(mut self, other: Condition) -> Self {
		self.pieces.extend(other.pieces);
		self
	}

	pub fn push_sql(&mut self, sql: impl Into<String>) {
		let sql = sql.into();
		if sql.is_empty() {
			return;
		}
		match self.pieces.last_mut() {
			Some(Piece::Sql(last)) => last.push_str(&sql),
			_ => self.pieces.push(Piece::Sql(sql)),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.pieces.is_empty()
	}

	/// `NOT (inner)`
	pub fn negate(inner: Condition) -> Self {
		Self::raw("NOT (").then(inner).sql(")")
	}

	/// Parenthesized `a <op> b <op> c`.
	pub fn join(conditions: Vec<Condition>, operator: &str) -> Self {
		let separator = format!(" {operator} ");
		let mut joined = Self::raw("(");
		for (i, condition) in conditions.into_iter().enumerate() {
			if i > 0 {
				joined.push_sql(separator.as_str());
			}
			joined = joined.then(condition);
		}
		joined.sql(")")
	}

	/// Like [`Condition::join`] without the parentheses, for WHERE clauses.
	pub fn conjunction(conditions: Vec<Condition>) -> Self {
		let mut joined = Self::new();
		for (i, condition) in conditions.into_iter().enumerate() {
			if i > 0 {
				joined.push_sql(" AND ");
			}
			joined = joined.then(condition);
		}
		joined
	}

	/// Comma separated parameters, each followed by `cast`.
	pub fn param_list(values: impl IntoIterator<Item = SqlValue>, cast: Option<&str>) -> Self {
		let mut list = Self::new();
		for (i, value) in values.into_iter().enumerate() {
			if i > 0 {
				list.push_sql(", ");
			}
			list = list.param(value);
			if let Some(cast) = cast {
				list.push_sql(cast);
			}
		}
		list
	}

	pub fn params(&self) -> impl Iterator<Item = &SqlValue> {
		self.pieces.iter().filter_map(|piece| match piece {
			Piece::Param(value) => Some(value),
			Piece::Sql(_) => None,
		})
	}

	/// Renders with dialect placeholders, appending bound values to `params`.
	pub fn render_into(&self, dialect: &dyn Dialect, sql: &mut String, params: &mut Vec<SqlValue>) {
		for piece in &self.pieces {
			match piece {
				Piece::Sql(text) => sql.push_str(text),
				Piece::Param(value) => {
					params.push(value.clone());
					sql.push_str(&dialect.placeholder(params.len()));
				}
			}
		}
	}

	pub fn render(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
		let mut sql = String::new();
		let mut params = Vec::new();
		self.render_into(dialect, &mut sql, &mut params);
		(sql, params)
	}

	/// Renders with every value inlined as a literal. Only for logs and EXPLAIN.
	pub fn inline(&self) -> String {
		self
			.pieces
			.iter()
			.map(|piece| match piece {
				Piece::Sql(text) => text.clone(),
				Piece::Param(value) => inline_value(value),
			})
			.collect()
	}
}

#[derive(Debug, Clone, PartialEq)]
enum TemplatePiece {
	Sql(String),
	Param(SqlValue),
	Column,
}

/// A condition with holes for the column it is applied to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
	pieces: Vec<TemplatePiece>,
}

impl Template {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn column(mut self) -> Self {
		self.pieces.push(TemplatePiece::Column);
		self
	}

	pub fn sql(mut self, sql: impl Into<String>) -> Self {
		self.pieces.push(TemplatePiece::Sql(sql.into()));
		self
	}

	pub fn param(mut self, value: SqlValue) -> Self {
		self.pieces.push(TemplatePiece::Param(value));
		self
	}

	pub fn cast(self, cast: Option<&str>) -> Self {
		match cast {
			Some(cast) => self.sql(cast),
			None => self,
		}
	}

	pub fn condition(mut self, condition: Condition) -> Self {
		for piece in condition.pieces {
			self.pieces.push(match piece {
				Piece::Sql(text) => TemplatePiece::Sql(text),
				Piece::Param(value) => TemplatePiece::Param(value),
			});
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.pieces.is_empty()
	}

	pub fn apply(&self, column: &str) -> Condition {
		self
			.pieces
			.iter()
			.fold(Condition::new(), |condition, piece| match piece {
				TemplatePiece::Sql(text) => condition.sql(text.as_str()),
				TemplatePiece::Param(value) => condition.param(value.clone()),
				TemplatePiece::Column => condition.sql(column),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::{Postgres, Sqlite};

	#[test]
	fn test_render_numbers_placeholders_in_order() {
		let condition = Condition::join(
			vec![
				Condition::raw("a = ").param(SqlValue::Integer(1)),
				Condition::raw("b = ").param(SqlValue::text("x")),
			],
			"OR",
		);

		let (sql, params) = condition.render(&Postgres);
		assert_eq!(sql, "(a = $1 OR b = $2)");
		assert_eq!(params, vec![SqlValue::Integer(1), SqlValue::text("x")]);

		let (sql, _) = condition.render(&Sqlite);
		assert_eq!(sql, "(a = ? OR b = ?)");
	}

	#[test]
	fn test_nested_composition_keeps_order() {
		let inner = Condition::raw("x > ").param(SqlValue::Integer(2));
		let outer = Condition::raw("y = ")
			.param(SqlValue::Integer(1))
			.sql(" AND ")
			.then(Condition::negate(inner));

		let (sql, params) = outer.render(&Postgres);
		assert_eq!(sql, "y = $1 AND NOT (x > $2)");
		assert_eq!(params.len(), 2);
	}

	#[test]
	fn test_template_repeats_column() {
		let template = Template::new()
			.column()
			.sql(" >>= ")
			.param(SqlValue::text("10.0.0.0/8"))
			.sql(" AND host(")
			.column()
			.sql(")");

		let condition = template.apply("server.intern_ip");
		assert_eq!(
			condition.inline(),
			"server.intern_ip >>= '10.0.0.0/8' AND host(server.intern_ip)"
		);
	}

	#[test]
	fn test_param_list() {
		let list = Condition::param_list(
			vec![SqlValue::text("a"), SqlValue::text("b")],
			Some("::inet"),
		);
		let (sql, _) = list.render(&Postgres);
		assert_eq!(sql, "$1::inet, $2::inet");
	}

	#[test]
	fn test_conjunction_without_parentheses() {
		let condition = Condition::conjunction(vec![Condition::raw("a"), Condition::raw("b")]);
		assert_eq!(condition.inline(), "a AND b");
		assert!(Condition::conjunction(vec![]).is_empty());
	}
}
