// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query assembler.

use std::collections::BTreeSet;

use serverdb_config::{CompilerConfig, QueryConfig, TableLayout};
use serverdb_core::{AttributeId, Filter, Schema, SchemaError, ServertypeId};
use tracing::debug;

use crate::combine::compile;
use crate::context::Context;
use crate::dialect::{self, Dialect};
use crate::error::Result;
use crate::fragment::{Condition, SqlValue};
use crate::lookup::{collect_hostnames, HostnameIds, HostnameResolver};
use crate::resolve::resolve;

/// LIMIT/OFFSET window on top of the stable server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
	pub limit: u64,
	pub offset: u64,
}

/// A complete statement listing the matching servers.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerQuery {
	sql: String,
	params: Vec<SqlValue>,
	inline_sql: String,
}

impl ServerQuery {
	pub(crate) fn from_parts(sql: String, params: Vec<SqlValue>, inline_sql: String) -> Self {
		Self {
			sql,
			params,
			inline_sql,
		}
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn params(&self) -> &[SqlValue] {
		&self.params
	}

	/// The statement with literals inlined. For logs and EXPLAIN, never execute it.
	pub fn inline_sql(&self) -> &str {
		&self.inline_sql
	}

	/// Both engines take signed 64-bit bounds, larger values are clamped.
	pub fn paginate(mut self, page: Page) -> Self {
		let clamp = |value: u64| value.min(i64::MAX as u64);
		let window = format!(" LIMIT {} OFFSET {}", clamp(page.limit), clamp(page.offset));
		self.sql.push_str(&window);
		self.inline_sql.push_str(&window);
		self
	}
}

/// Compiles attribute filters against one schema snapshot.
#[derive(Debug)]
pub struct QueryCompiler<'s> {
	schema: &'s Schema,
	dialect: Box<dyn Dialect>,
	layout: TableLayout,
	options: CompilerConfig,
}

impl<'s> QueryCompiler<'s> {
	pub fn new(schema: &'s Schema, config: &QueryConfig) -> Self {
		Self {
			schema,
			dialect: dialect::for_kind(config.compiler.dialect),
			layout: config.layout.clone(),
			options: config.compiler.clone(),
		}
	}

	pub fn dialect(&self) -> &dyn Dialect {
		self.dialect.as_ref()
	}

	fn candidates(&self, servertypes: &[ServertypeId]) -> Result<Vec<ServertypeId>> {
		let unique: BTreeSet<&ServertypeId> = servertypes.iter().collect();
		unique
			.into_iter()
			.map(|servertype| {
				if self.schema.has_servertype(servertype) {
					Ok(servertype.clone())
				} else {
					Err(SchemaError::UnknownServertype(servertype.clone()).into())
				}
			})
			.collect()
	}

	fn context<'a>(&'a self, servertypes: &'a [ServertypeId], hostnames: &'a HostnameIds) -> Context<'a> {
		Context {
			schema: self.schema,
			dialect: self.dialect.as_ref(),
			layout: &self.layout,
			options: &self.options,
			servertypes,
			hostnames,
		}
	}

	fn compile_with(&self, ctx: &Context<'_>, attribute_id: &AttributeId, filter: &Filter) -> Result<Condition> {
		let attribute = self.schema.attribute(attribute_id)?;
		let location = resolve(ctx, attribute)?;
		compile(ctx, attribute, &location, filter)
	}

	/// Compiles the filter of one attribute for servers of `servertypes`.
	#[tracing::instrument(skip(self, servertypes, filter, hostnames), fields(attribute = %attribute))]
	pub fn compile_condition(
		&self,
		servertypes: &[ServertypeId],
		attribute: &AttributeId,
		filter: &Filter,
		hostnames: &HostnameIds,
	) -> Result<Condition> {
		let candidates = self.candidates(servertypes)?;
		let ctx = self.context(&candidates, hostnames);
		self.compile_with(&ctx, attribute, filter)
	}

	/// Builds the server listing. `None` when no servertype is requested,
	/// in which case nothing can match and no query should be issued.
	#[tracing::instrument(skip(self, servertypes, filters, hostnames), fields(filters = filters.len()))]
	pub fn assemble(
		&self,
		servertypes: &[ServertypeId],
		filters: &[(AttributeId, Filter)],
		hostnames: &HostnameIds,
	) -> Result<Option<ServerQuery>> {
		let candidates = self.candidates(servertypes)?;
		if candidates.is_empty() {
			debug!("no servertypes requested, skipping query");
			return Ok(None);
		}

		let ctx = self.context(&candidates, hostnames);
		let layout = &self.layout;

		let mut statement = Condition::raw(format!(
			"SELECT server.{id}, server.{hostname}, server.{network}, server.{servertype}, \
			 server.{project} FROM {table} AS server WHERE server.{servertype} IN (",
			id = layout.server_id_column,
			hostname = layout.hostname_column,
			network = layout.network_column,
			servertype = layout.servertype_column,
			project = layout.project_column,
			table = layout.server_table,
		))
		.then(Condition::param_list(
			candidates.iter().map(|s| SqlValue::text(s.as_str())),
			None,
		))
		.sql(")");

		for (attribute, filter) in filters {
			let condition = self.compile_with(&ctx, attribute, filter)?;
			statement = statement.sql(" AND ").then(condition);
		}

		statement = statement.sql(format!(
			" ORDER BY server.{}, server.{}, server.{}",
			layout.hostname_column, layout.network_column, layout.server_id_column
		));

		let (sql, params) = statement.render(self.dialect.as_ref());
		debug!(sql = %sql, params = params.len(), "assembled server query");

		Ok(Some(ServerQuery::from_parts(sql, params, statement.inline())))
	}

	/// Looks up the hostnames the filters compare link attributes with,
	/// then assembles the query.
	#[tracing::instrument(skip(self, resolver, servertypes, filters), fields(filters = filters.len()))]
	pub async fn prepare(
		&self,
		resolver: &dyn HostnameResolver,
		servertypes: &[ServertypeId],
		filters: &[(AttributeId, Filter)],
	) -> Result<Option<ServerQuery>> {
		if servertypes.is_empty() {
			return Ok(None);
		}

		let hostnames = collect_hostnames(self.schema, filters)?;
		let ids = if hostnames.is_empty() {
			HostnameIds::new()
		} else {
			resolver.resolve(&hostnames).await?
		};

		self.assemble(servertypes, filters, &ids)
	}
}
