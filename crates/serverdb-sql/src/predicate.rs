// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Predicate templates for leaf filters.
//!
//! The template only knows the operator and operand. Which column it is
//! applied to is decided by the resolved [`Location`](crate::resolve::Location).

use serverdb_core::{Attribute, AttributeType, Filter, Literal, ValueDomain};

use crate::context::Context;
use crate::encode::{encode_value, validate_text};
use crate::error::{CompileError, Result};
use crate::fragment::{Condition, SqlValue, Template};

/// Which column of the resolved location the template applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
	Value,
	/// The network of a supernet server instead of its id.
	Network,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
	pub template: Template,
	pub subject: Subject,
	/// Negates the whole located condition, e.g. `NOT (EXISTS (...))`.
	pub negated: bool,
}

impl Predicate {
	fn on_value(template: Template) -> Self {
		Self {
			template,
			subject: Subject::Value,
			negated: false,
		}
	}

	fn on_network(template: Template) -> Self {
		Self {
			template,
			subject: Subject::Network,
			negated: false,
		}
	}

	fn negate(mut self) -> Self {
		self.negated = !self.negated;
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
	StartsWith,
	Contains,
	ContainedBy,
	ContainedOnlyBy,
	Overlaps,
}

fn unsupported(attribute: &Attribute, leaf: &Filter) -> CompileError {
	CompileError::UnsupportedOperator {
		attribute: attribute.id.clone(),
		filter: leaf.name(),
		attribute_type: attribute.attribute_type.name(),
	}
}

pub fn build(ctx: &Context<'_>, attribute: &Attribute, leaf: &Filter) -> Result<Predicate> {
	if attribute.is_boolean() {
		return build_boolean(attribute, leaf);
	}

	match leaf {
		Filter::Equals(literal) => {
			let (value, cast) = operand(ctx, attribute, literal)?;
			Ok(Predicate::on_value(
				Template::new().column().sql(" = ").param(value).cast(cast),
			))
		}
		Filter::GreaterThan(literal) => ordering(ctx, attribute, ">", literal),
		Filter::LessThan(literal) => ordering(ctx, attribute, "<", literal),
		Filter::GreaterThanOrEquals(literal) => ordering(ctx, attribute, ">=", literal),
		Filter::LessThanOrEquals(literal) => ordering(ctx, attribute, "<=", literal),
		Filter::Regexp(pattern) => regexp(ctx, attribute, pattern),
		Filter::Empty => Ok(Predicate::on_value(Template::new().column().sql(" IS NOT NULL")).negate()),
		Filter::StartsWith(literal) => containment(ctx, attribute, leaf, Containment::StartsWith, literal),
		Filter::Contains(literal) => containment(ctx, attribute, leaf, Containment::Contains, literal),
		Filter::ContainedBy(literal) => {
			containment(ctx, attribute, leaf, Containment::ContainedBy, literal)
		}
		Filter::ContainedOnlyBy(literal) => {
			containment(ctx, attribute, leaf, Containment::ContainedOnlyBy, literal)
		}
		Filter::Overlaps(literal) => containment(ctx, attribute, leaf, Containment::Overlaps, literal),
		Filter::Not(_) | Filter::All(_) | Filter::Any(_) => Err(unsupported(attribute, leaf)),
	}
}

/// `col IN (v1, v2, ...)` for a run of equality filters.
pub fn build_membership(ctx: &Context<'_>, attribute: &Attribute, literals: &[&Literal]) -> Result<Predicate> {
	let mut values = Vec::with_capacity(literals.len());
	let mut cast = None;
	for literal in literals {
		let (value, value_cast) = operand(ctx, attribute, literal)?;
		values.push(value);
		cast = value_cast;
	}

	Ok(Predicate::on_value(
		Template::new()
			.column()
			.sql(" IN (")
			.condition(Condition::param_list(values, cast))
			.sql(")"),
	))
}

fn build_boolean(attribute: &Attribute, leaf: &Filter) -> Result<Predicate> {
	let Filter::Equals(literal) = leaf else {
		return Err(unsupported(attribute, leaf));
	};
	let Literal::Bool(value) = literal else {
		return Err(CompileError::TypeMismatch {
			attribute: attribute.id.clone(),
			expected: "boolean",
			found: literal.type_name(),
		});
	};

	// Side table booleans are true when a row exists.
	let template = if attribute.is_special() {
		Template::new().column()
	} else {
		Template::new()
	};

	let predicate = Predicate::on_value(template);
	Ok(if *value { predicate } else { predicate.negate() })
}

/// The bound value and its cast for comparisons against the attribute.
fn operand(
	ctx: &Context<'_>,
	attribute: &Attribute,
	literal: &Literal,
) -> Result<(SqlValue, Option<&'static str>)> {
	match &attribute.attribute_type {
		AttributeType::Scalar(domain) => Ok((
			encode_value(attribute, *domain, literal)?,
			ctx.dialect.cast(*domain),
		)),
		_ => {
			let Literal::String(hostname) = literal else {
				return Err(CompileError::TypeMismatch {
					attribute: attribute.id.clone(),
					expected: "hostname",
					found: literal.type_name(),
				});
			};
			validate_text(hostname)?;
			let server_id = ctx
				.hostnames
				.get(hostname)
				.ok_or_else(|| CompileError::UnknownHostname(hostname.clone()))?;
			Ok((SqlValue::Integer(server_id), None))
		}
	}
}

fn ordering(
	ctx: &Context<'_>,
	attribute: &Attribute,
	operator: &str,
	literal: &Literal,
) -> Result<Predicate> {
	if attribute.attribute_type.is_link() {
		return Err(CompileError::UnorderableType(attribute.id.clone()));
	}

	let (value, cast) = operand(ctx, attribute, literal)?;
	Ok(Predicate::on_value(
		Template::new()
			.column()
			.sql(format!(" {operator} "))
			.param(value)
			.cast(cast),
	))
}

fn regexp(ctx: &Context<'_>, attribute: &Attribute, pattern: &str) -> Result<Predicate> {
	validate_text(pattern)?;
	let operator = ctx.dialect.regex_operator()?;
	let pattern = SqlValue::text(pattern);

	// Link attributes hold server ids, so the pattern is matched on hostnames.
	let template = if attribute.attribute_type.is_link() {
		let layout = ctx.layout;
		Template::new()
			.column()
			.sql(format!(
				" IN (SELECT {id} FROM {table} WHERE {hostname} {operator} ",
				id = layout.server_id_column,
				table = layout.server_table,
				hostname = layout.hostname_column,
			))
			.param(pattern)
			.sql(")")
	} else {
		Template::new()
			.column()
			.sql(format!("{} {operator} ", ctx.dialect.text_cast()))
			.param(pattern)
	};

	Ok(Predicate::on_value(template))
}

fn containment(
	ctx: &Context<'_>,
	attribute: &Attribute,
	leaf: &Filter,
	kind: Containment,
	literal: &Literal,
) -> Result<Predicate> {
	match &attribute.attribute_type {
		AttributeType::Scalar(ValueDomain::Inet) => {
			Ok(Predicate::on_value(network_template(ctx, attribute, kind, literal)?))
		}
		AttributeType::Supernet { .. } => {
			Ok(Predicate::on_network(network_template(ctx, attribute, kind, literal)?))
		}
		AttributeType::Scalar(ValueDomain::String) => {
			let Literal::String(text) = literal else {
				return Err(CompileError::TypeMismatch {
					attribute: attribute.id.clone(),
					expected: "string",
					found: literal.type_name(),
				});
			};
			validate_text(text)?;
			let template = match kind {
				Containment::StartsWith => ctx.dialect.starts_with(text),
				Containment::Contains => ctx.dialect.contains(text),
				Containment::ContainedBy => ctx.dialect.contained_by(text),
				Containment::ContainedOnlyBy | Containment::Overlaps => {
					return Err(unsupported(attribute, leaf))
				}
			};
			Ok(Predicate::on_value(template))
		}
		_ => Err(unsupported(attribute, leaf)),
	}
}

fn network_template(
	ctx: &Context<'_>,
	attribute: &Attribute,
	kind: Containment,
	literal: &Literal,
) -> Result<Template> {
	ctx.dialect.require_network()?;
	let value = encode_value(attribute, ValueDomain::Inet, literal)?;
	let cast = ctx.dialect.cast(ValueDomain::Inet);
	let network = |template: Template| template.param(value.clone()).cast(cast);

	let template = match kind {
		Containment::StartsWith => network(
			network(Template::new().column().sql(" >>= "))
				.sql(" AND host(")
				.column()
				.sql(") = host("),
		)
		.sql(")"),
		Containment::Contains => network(Template::new().column().sql(" >>= ")),
		Containment::ContainedBy => network(Template::new().column().sql(" <<= ")),
		Containment::ContainedOnlyBy => {
			let layout = ctx.layout;
			network(
				network(Template::new().column().sql(" << "))
					.sql(format!(
						" AND NOT EXISTS (SELECT 1 FROM {table} AS supernet WHERE ",
						table = layout.server_table
					))
					.column()
					.sql(format!(
						" << supernet.{net} AND supernet.{net} << ",
						net = layout.network_column
					)),
			)
			.sql(")")
		}
		Containment::Overlaps => network(Template::new().column().sql(" && ")),
	};

	Ok(template)
}
