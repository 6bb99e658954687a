// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute resolver.
//!
//! Works out where the value of an attribute lives relative to the outer
//! `server` row:
//!
//! - special attributes are columns of the server table,
//! - supernet attributes are other servers whose network contains ours,
//! - reverse hostname attributes are relation rows pointing at us,
//! - everything else is a row in a side table, owned either by the server
//!   itself or by a server reached through one or more related-via links.

use std::collections::BTreeMap;

use serverdb_core::{Attribute, AttributeId, AttributeType, ServertypeId};
use tracing::trace;

use crate::context::Context;
use crate::error::{CompileError, Result};
use crate::fragment::{Condition, SqlValue};
use crate::predicate::{Predicate, Subject};

// Column names shared by the relation table and every attribute side table.
const OWNER_COLUMN: &str = "server_id";
const ATTRIBUTE_COLUMN: &str = "attribute_id";
const VALUE_COLUMN: &str = "value";

const SUB: &str = "sub";

#[derive(Debug, Clone, PartialEq)]
pub enum Location {
	/// A column of the outer server row.
	Column(String),
	/// A correlated subquery over `table AS sub`.
	Exists {
		table: String,
		conditions: Vec<Condition>,
		value_column: String,
		/// Network column of `sub`, set when `sub` is a server row.
		network_column: Option<String>,
	},
}

impl Location {
	pub fn apply(&self, predicate: &Predicate) -> Condition {
		let condition = match self {
			Location::Column(column) => predicate.template.apply(column),
			Location::Exists {
				table,
				conditions,
				value_column,
				network_column,
			} => {
				let column = match predicate.subject {
					Subject::Network => network_column.as_deref().unwrap_or(value_column),
					Subject::Value => value_column.as_str(),
				};
				let mut parts = conditions.clone();
				if !predicate.template.is_empty() {
					parts.push(predicate.template.apply(column));
				}
				exists(table, SUB, parts)
			}
		};

		if predicate.negated {
			Condition::negate(condition)
		} else {
			condition
		}
	}
}

fn exists(table: &str, alias: &str, conditions: Vec<Condition>) -> Condition {
	Condition::raw(format!("EXISTS (SELECT 1 FROM {table} AS {alias} WHERE "))
		.then(Condition::conjunction(conditions))
		.sql(")")
}

#[tracing::instrument(level = "trace", skip(ctx, attribute), fields(attribute = %attribute.id))]
pub fn resolve(ctx: &Context<'_>, attribute: &Attribute) -> Result<Location> {
	if let Some(special) = &attribute.special {
		return Ok(Location::Column(ctx.server_column(special.column())));
	}

	let layout = ctx.layout;
	match &attribute.attribute_type {
		AttributeType::Supernet { target_servertype } => {
			ctx.dialect.require_network()?;
			Ok(Location::Exists {
				table: layout.server_table.clone(),
				conditions: vec![
					Condition::raw(format!("{SUB}.{} = ", layout.servertype_column))
						.param(SqlValue::text(target_servertype.as_str())),
					Condition::raw(format!(
						"{SUB}.{net} >>= server.{net}",
						net = layout.network_column
					)),
				],
				value_column: format!("{SUB}.{}", layout.server_id_column),
				network_column: Some(format!("{SUB}.{}", layout.network_column)),
			})
		}
		AttributeType::ReverseHostname { reversed_attribute } => Ok(Location::Exists {
			table: layout.relation_table.clone(),
			conditions: vec![
				Condition::raw(format!("{SUB}.{ATTRIBUTE_COLUMN} = "))
					.param(SqlValue::text(reversed_attribute.as_str())),
				Condition::raw(format!(
					"{SUB}.{VALUE_COLUMN} = server.{}",
					layout.server_id_column
				)),
			],
			value_column: format!("{SUB}.{OWNER_COLUMN}"),
			network_column: None,
		}),
		AttributeType::Hostname { .. } => stored(ctx, attribute, &layout.relation_table),
		AttributeType::Scalar(domain) => stored(ctx, attribute, ctx.side_table(*domain)),
	}
}

fn stored(ctx: &Context<'_>, attribute: &Attribute, table: &str) -> Result<Location> {
	let holder = format!("{SUB}.{OWNER_COLUMN}");
	let owner = holder_condition(ctx, &attribute.id, &holder, ctx.servertypes, 0)?;

	Ok(Location::Exists {
		table: table.to_string(),
		conditions: vec![
			owner,
			Condition::raw(format!("{SUB}.{ATTRIBUTE_COLUMN} = "))
				.param(SqlValue::text(attribute.id.as_str())),
		],
		value_column: format!("{SUB}.{VALUE_COLUMN}"),
		network_column: None,
	})
}

/// States that `holder` is the server carrying `attribute` for the outer
/// server, given the outer server is one of `servertypes`.
fn holder_condition(
	ctx: &Context<'_>,
	attribute: &AttributeId,
	holder: &str,
	servertypes: &[ServertypeId],
	depth: usize,
) -> Result<Condition> {
	let mut direct = Vec::new();
	let mut related: BTreeMap<&AttributeId, Vec<ServertypeId>> = BTreeMap::new();
	for binding in ctx.schema.bindings(attribute) {
		if servertypes.binary_search(&binding.servertype).is_err() {
			continue;
		}
		match &binding.related_via {
			None => direct.push(binding.servertype.clone()),
			Some(via) => related
				.entry(via)
				.or_default()
				.push(binding.servertype.clone()),
		}
	}

	if direct.is_empty() && related.is_empty() {
		return Err(CompileError::UnreachableAttribute(attribute.clone()));
	}

	let strategy_count = related.len() + usize::from(!direct.is_empty());
	let guarded =
		strategy_count > 1 || related.values().any(|group| group.len() < servertypes.len());

	let mut strategies = Vec::with_capacity(strategy_count);
	if !direct.is_empty() {
		let condition = Condition::raw(format!(
			"server.{} = {holder}",
			ctx.layout.server_id_column
		));
		strategies.push((direct, condition));
	}
	for (via, group) in related {
		trace!(attribute = %attribute, via = %via, depth, "following related-via attribute");
		let condition = relation_condition(ctx, via, holder, &group, depth + 1)?;
		strategies.push((group, condition));
	}

	if !guarded {
		if let Some((_, condition)) = strategies.pop() {
			return Ok(condition);
		}
	}

	let mut guarded_strategies: Vec<Condition> = strategies
		.into_iter()
		.map(|(group, condition)| Condition::join(vec![servertype_guard(ctx, group), condition], "AND"))
		.collect();

	if guarded_strategies.len() == 1 {
		return Ok(guarded_strategies.remove(0));
	}
	Ok(Condition::join(guarded_strategies, "OR"))
}

fn servertype_guard(ctx: &Context<'_>, servertypes: Vec<ServertypeId>) -> Condition {
	Condition::raw(format!("server.{} IN (", ctx.layout.servertype_column))
		.then(Condition::param_list(
			servertypes.into_iter().map(|s| SqlValue::Text(s.0)),
			None,
		))
		.sql(")")
}

/// States that `holder` is the server reached from the outer server through
/// the link attribute `via`.
fn relation_condition(
	ctx: &Context<'_>,
	via: &AttributeId,
	holder: &str,
	servertypes: &[ServertypeId],
	depth: usize,
) -> Result<Condition> {
	let max_depth = ctx.options.max_relation_depth;
	if depth > max_depth {
		return Err(CompileError::RelationDepthExceeded {
			attribute: via.clone(),
			max_depth,
		});
	}

	let layout = ctx.layout;
	let alias = format!("rel{depth}");
	let via_attribute = ctx.schema.attribute(via)?;

	match &via_attribute.attribute_type {
		AttributeType::Hostname { .. } => {
			let link_owner = format!("{alias}.{OWNER_COLUMN}");
			let owner = holder_condition(ctx, via, &link_owner, servertypes, depth)?;
			Ok(exists(
				&layout.relation_table,
				&alias,
				vec![
					Condition::raw(format!("{alias}.{ATTRIBUTE_COLUMN} = "))
						.param(SqlValue::text(via.as_str())),
					owner,
					Condition::raw(format!("{alias}.{VALUE_COLUMN} = {holder}")),
				],
			))
		}
		AttributeType::Supernet { target_servertype } => {
			ctx.dialect.require_network()?;
			Ok(exists(
				&layout.server_table,
				&alias,
				vec![
					Condition::raw(format!("{alias}.{} = ", layout.servertype_column))
						.param(SqlValue::text(target_servertype.as_str())),
					Condition::raw(format!(
						"{alias}.{net} >>= server.{net}",
						net = layout.network_column
					)),
					Condition::raw(format!("{alias}.{} = {holder}", layout.server_id_column)),
				],
			))
		}
		AttributeType::ReverseHostname { reversed_attribute } => Ok(exists(
			&layout.relation_table,
			&alias,
			vec![
				Condition::raw(format!("{alias}.{ATTRIBUTE_COLUMN} = "))
					.param(SqlValue::text(reversed_attribute.as_str())),
				Condition::raw(format!(
					"{alias}.{VALUE_COLUMN} = server.{}",
					layout.server_id_column
				)),
				Condition::raw(format!("{alias}.{OWNER_COLUMN} = {holder}")),
			],
		)),
		AttributeType::Scalar(_) => Err(CompileError::UnreachableAttribute(via.clone())),
	}
}
