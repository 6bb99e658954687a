// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logical combinator: folds a filter tree into one condition.

use serverdb_config::EmptyAllSemantics;
use serverdb_core::{Attribute, Filter, Literal};

use crate::context::Context;
use crate::error::Result;
use crate::fragment::Condition;
use crate::predicate::{build, build_membership};
use crate::resolve::Location;

fn always_true() -> Condition {
	Condition::raw("NOT (true AND false)")
}

fn always_false() -> Condition {
	Condition::raw("NOT (true OR false)")
}

pub fn compile(
	ctx: &Context<'_>,
	attribute: &Attribute,
	location: &Location,
	filter: &Filter,
) -> Result<Condition> {
	match filter {
		Filter::Not(inner) => Ok(Condition::negate(compile(ctx, attribute, location, inner)?)),
		Filter::All(children) if children.is_empty() => Ok(match ctx.options.empty_all {
			EmptyAllSemantics::Vacuous => always_true(),
			EmptyAllSemantics::Unsatisfiable => always_false(),
		}),
		Filter::Any(children) if children.is_empty() => Ok(always_false()),
		Filter::All(children) => {
			let parts = children
				.iter()
				.map(|child| compile(ctx, attribute, location, child))
				.collect::<Result<Vec<_>>>()?;
			Ok(Condition::join(parts, "AND"))
		}
		Filter::Any(children) => compile_any(ctx, attribute, location, children),
		leaf => Ok(location.apply(&build(ctx, attribute, leaf)?)),
	}
}

fn compile_any(
	ctx: &Context<'_>,
	attribute: &Attribute,
	location: &Location,
	children: &[Filter],
) -> Result<Condition> {
	let merge = ctx.options.merge_equalities && !attribute.is_boolean();
	let mut parts = Vec::with_capacity(children.len());
	let mut run: Vec<&Literal> = Vec::new();

	for child in children {
		match child {
			Filter::Equals(literal) if merge => run.push(literal),
			other => {
				flush_equalities(ctx, attribute, location, &mut run, &mut parts)?;
				parts.push(compile(ctx, attribute, location, other)?);
			}
		}
	}
	flush_equalities(ctx, attribute, location, &mut run, &mut parts)?;

	Ok(Condition::join(parts, "OR"))
}

fn flush_equalities(
	ctx: &Context<'_>,
	attribute: &Attribute,
	location: &Location,
	run: &mut Vec<&Literal>,
	parts: &mut Vec<Condition>,
) -> Result<()> {
	match run.as_slice() {
		[] => {}
		[single] => {
			let leaf = Filter::Equals((*single).clone());
			parts.push(location.apply(&build(ctx, attribute, &leaf)?));
		}
		literals => parts.push(location.apply(&build_membership(ctx, attribute, literals)?)),
	}
	run.clear();
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::Postgres;
	use crate::lookup::HostnameIds;
	use serverdb_config::{CompilerConfig, TableLayout};
	use serverdb_core::{Schema, ServertypeId, ValueDomain};

	fn compile_inline(filter: &Filter, config: &CompilerConfig) -> String {
		let schema = Schema::default();
		let layout = TableLayout::default();
		let hostnames = HostnameIds::new();
		let servertypes = vec![ServertypeId::new("vm")];
		let ctx = Context {
			schema: &schema,
			dialect: &Postgres,
			layout: &layout,
			options: config,
			servertypes: &servertypes,
			hostnames: &hostnames,
		};
		let attribute = Attribute::scalar("os", ValueDomain::String).with_special("os");
		let location = Location::Column("server.os".to_string());
		compile(&ctx, &attribute, &location, filter).unwrap().inline()
	}

	#[test]
	fn test_any_merges_equality_runs() {
		let filter = Filter::Any(vec![
			Filter::equals("a"),
			Filter::equals("b"),
			Filter::Empty,
			Filter::equals("c"),
		]);
		assert_eq!(
			compile_inline(&filter, &CompilerConfig::default()),
			"(server.os IN ('a', 'b') OR NOT (server.os IS NOT NULL) OR server.os = 'c')"
		);
	}

	#[test]
	fn test_merge_can_be_disabled() {
		let config = CompilerConfig {
			merge_equalities: false,
			..Default::default()
		};
		let filter = Filter::Any(vec![Filter::equals("a"), Filter::equals("b")]);
		assert_eq!(
			compile_inline(&filter, &config),
			"(server.os = 'a' OR server.os = 'b')"
		);
	}

	#[test]
	fn test_all_and_not() {
		let filter = Filter::All(vec![
			Filter::negate(Filter::equals("a")),
			Filter::StartsWith(Literal::from("deb")),
		]);
		assert_eq!(
			compile_inline(&filter, &CompilerConfig::default()),
			"(NOT (server.os = 'a') AND server.os LIKE 'deb%' ESCAPE '\\')"
		);
	}

	#[test]
	fn test_empty_composites() {
		let vacuous = CompilerConfig::default();
		let unsatisfiable = CompilerConfig {
			empty_all: EmptyAllSemantics::Unsatisfiable,
			..Default::default()
		};

		assert_eq!(compile_inline(&Filter::Any(vec![]), &vacuous), "NOT (true OR false)");
		assert_eq!(compile_inline(&Filter::All(vec![]), &vacuous), "NOT (true AND false)");
		assert_eq!(
			compile_inline(&Filter::All(vec![]), &unsatisfiable),
			"NOT (true OR false)"
		);
	}
}
