// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Running compiled queries on SQLite.

use serverdb_config::TableLayout;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Row;

use crate::assemble::ServerQuery;
use crate::error::Result;
use crate::fragment::SqlValue;

/// One row of the server listing, in query order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRow {
	pub server_id: i64,
	pub hostname: String,
	pub intern_ip: Option<String>,
	pub servertype_id: String,
	pub project_id: Option<String>,
}

impl ServerRow {
	fn from_row(row: &SqliteRow) -> std::result::Result<Self, sqlx::Error> {
		Ok(Self {
			server_id: row.try_get(0)?,
			hostname: row.try_get(1)?,
			intern_ip: row.try_get(2)?,
			servertype_id: row.try_get(3)?,
			project_id: row.try_get(4)?,
		})
	}
}

pub fn bind_sqlite(query: &ServerQuery) -> Query<'_, Sqlite, SqliteArguments<'_>> {
	let mut bound = sqlx::query(query.sql());
	for value in query.params() {
		bound = match value {
			SqlValue::Text(text) => bound.bind(text.as_str()),
			SqlValue::Integer(v) => bound.bind(*v),
		};
	}
	bound
}

#[tracing::instrument(skip(pool, query), fields(params = query.params().len()))]
pub async fn fetch_servers(pool: &SqlitePool, query: &ServerQuery) -> Result<Vec<ServerRow>> {
	let rows = bind_sqlite(query).fetch_all(pool).await?;
	let servers = rows
		.iter()
		.map(ServerRow::from_row)
		.collect::<std::result::Result<Vec<_>, _>>()?;

	tracing::debug!(count = servers.len(), "fetched servers");
	Ok(servers)
}

/// Creates the server table, the relation table and the per-domain
/// attribute tables for `layout` if they do not exist yet.
#[tracing::instrument(skip(pool, layout))]
pub async fn create_tables(pool: &SqlitePool, layout: &TableLayout) -> Result<()> {
	sqlx::query(&format!(
		r#"
		CREATE TABLE IF NOT EXISTS {table} (
			{id} INTEGER PRIMARY KEY,
			{hostname} TEXT NOT NULL UNIQUE,
			{network} TEXT,
			{servertype} TEXT NOT NULL,
			{project} TEXT
		)
		"#,
		table = layout.server_table,
		id = layout.server_id_column,
		hostname = layout.hostname_column,
		network = layout.network_column,
		servertype = layout.servertype_column,
		project = layout.project_column,
	))
	.execute(pool)
	.await?;

	let value_tables = [
		(&layout.relation_table, "INTEGER"),
		(&layout.number_table, "NUMERIC"),
		(&layout.string_table, "TEXT"),
		(&layout.inet_table, "TEXT"),
		(&layout.macaddr_table, "TEXT"),
		(&layout.date_table, "TEXT"),
		(&layout.datetime_table, "TEXT"),
	];
	for (table, value_type) in value_tables {
		sqlx::query(&format!(
			r#"
			CREATE TABLE IF NOT EXISTS {table} (
				server_id INTEGER NOT NULL,
				attribute_id TEXT NOT NULL,
				value {value_type} NOT NULL
			)
			"#
		))
		.execute(pool)
		.await?;
	}

	// Boolean attributes are true when the row exists.
	sqlx::query(&format!(
		r#"
		CREATE TABLE IF NOT EXISTS {table} (
			server_id INTEGER NOT NULL,
			attribute_id TEXT NOT NULL,
			UNIQUE(server_id, attribute_id)
		)
		"#,
		table = layout.boolean_table,
	))
	.execute(pool)
	.await?;

	tracing::debug!("serverdb tables created");
	Ok(())
}
