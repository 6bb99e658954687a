// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hostname lookup for link attributes.
//!
//! Hostname, reverse hostname and supernet attributes store server ids. The
//! hostnames used in filters are resolved once per call, before compiling.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serverdb_config::TableLayout;
use serverdb_core::{AttributeId, Filter, Literal, Schema};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::Result;

/// Hostname to server id, for one compile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostnameIds(HashMap<String, i64>);

impl HostnameIds {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, hostname: impl Into<String>, server_id: i64) {
		self.0.insert(hostname.into(), server_id);
	}

	pub fn get(&self, hostname: &str) -> Option<i64> {
		self.0.get(hostname).copied()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<S: Into<String>> FromIterator<(S, i64)> for HostnameIds {
	fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(h, id)| (h.into(), id)).collect())
	}
}

#[async_trait]
pub trait HostnameResolver: Send + Sync {
	/// Returns the ids of the hostnames that exist. Missing ones are left out.
	async fn resolve(&self, hostnames: &[String]) -> Result<HostnameIds>;
}

#[async_trait]
impl HostnameResolver for HostnameIds {
	async fn resolve(&self, hostnames: &[String]) -> Result<HostnameIds> {
		Ok(hostnames
			.iter()
			.filter_map(|h| self.get(h).map(|id| (h.clone(), id)))
			.collect())
	}
}

pub struct SqliteHostnameResolver {
	pool: SqlitePool,
	layout: TableLayout,
}

impl SqliteHostnameResolver {
	pub fn new(pool: SqlitePool, layout: TableLayout) -> Self {
		Self { pool, layout }
	}

	#[tracing::instrument(skip(self, hostnames), fields(count = hostnames.len()))]
	pub async fn get_server_ids(&self, hostnames: &[String]) -> Result<HostnameIds> {
		if hostnames.is_empty() {
			return Ok(HostnameIds::new());
		}

		let placeholders = vec!["?"; hostnames.len()].join(", ");
		let sql = format!(
			"SELECT {id}, {hostname} FROM {table} WHERE {hostname} IN ({placeholders})",
			id = self.layout.server_id_column,
			hostname = self.layout.hostname_column,
			table = self.layout.server_table,
		);

		let mut query = sqlx::query(&sql);
		for hostname in hostnames {
			query = query.bind(hostname.as_str());
		}

		let rows = query.fetch_all(&self.pool).await?;
		let mut ids = HostnameIds::new();
		for row in rows {
			let server_id: i64 = row.try_get(0)?;
			let hostname: String = row.try_get(1)?;
			ids.insert(hostname, server_id);
		}

		tracing::debug!(found = ids.len(), "resolved hostnames");
		Ok(ids)
	}
}

#[async_trait]
impl HostnameResolver for SqliteHostnameResolver {
	async fn resolve(&self, hostnames: &[String]) -> Result<HostnameIds> {
		self.get_server_ids(hostnames).await
	}
}

/// Hostnames compared by `Equals` on link attributes, sorted and deduplicated.
pub fn collect_hostnames(schema: &Schema, filters: &[(AttributeId, Filter)]) -> Result<Vec<String>> {
	let mut hostnames = BTreeSet::new();
	for (attribute_id, filter) in filters {
		let attribute = schema.attribute(attribute_id)?;
		if !attribute.attribute_type.is_link() {
			continue;
		}
		filter.for_each_leaf(&mut |leaf| {
			if let Filter::Equals(Literal::String(hostname)) = leaf {
				hostnames.insert(hostname.clone());
			}
		});
	}
	Ok(hostnames.into_iter().collect())
}
