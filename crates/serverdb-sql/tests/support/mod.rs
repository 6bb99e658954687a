// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inventory fixture shared by the SQLite integration tests.
//!
//! ```text
//! room1 (building B1)  <- rack1 (dc-a) <- hv1 <- vm1, vm2
//! room2 (building B2)  <- rack2 (dc-b) <- hv2 <- vm3
//!                                                 vm4 (no hypervisor)
//! ```

#![allow(dead_code)]

use std::collections::HashMap;

use serverdb_config::{DialectKind, QueryConfig, TableLayout};
use serverdb_core::{Attribute, AttributeId, AttributeType, Filter, Schema, ServertypeId, ValueDomain};
use serverdb_sql::{
	create_tables, fetch_servers, CompileError, QueryCompiler, SqliteHostnameResolver,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub fn hostname_attribute(id: &str, target: &str) -> Attribute {
	Attribute::new(
		id,
		AttributeType::Hostname {
			target_servertype: Some(target.into()),
		},
	)
}

pub fn inventory_schema() -> Schema {
	Schema::builder()
		.servertype("room")
		.servertype("rack")
		.servertype("hypervisor")
		.servertype("vm")
		.attribute(Attribute::scalar("hostname", ValueDomain::String).with_special("hostname"))
		.attribute(Attribute::scalar("intern_ip", ValueDomain::Inet).with_special("intern_ip"))
		.attribute(Attribute::scalar("servertype", ValueDomain::String).with_special("_servertype_id"))
		.attribute(Attribute::scalar("building", ValueDomain::String))
		.attribute(Attribute::scalar("datacenter", ValueDomain::String))
		.attribute(Attribute::scalar("os", ValueDomain::String))
		.attribute(Attribute::scalar("comment", ValueDomain::String))
		.attribute(Attribute::scalar("num_cpu", ValueDomain::Number))
		.attribute(Attribute::scalar("backup_disabled", ValueDomain::Boolean))
		.attribute(hostname_attribute("room", "room"))
		.attribute(hostname_attribute("rack", "rack"))
		.attribute(hostname_attribute("hypervisor", "hypervisor"))
		.attribute(Attribute::new(
			"vms",
			AttributeType::ReverseHostname {
				reversed_attribute: "hypervisor".into(),
			},
		))
		.attribute(Attribute::new(
			"rack_network",
			AttributeType::Supernet {
				target_servertype: "rack".into(),
			},
		))
		// room
		.bind("room", "building")
		// rack
		.bind("rack", "room")
		.bind("rack", "datacenter")
		.bind_via("rack", "building", "room")
		// hypervisor
		.bind("hypervisor", "rack")
		.bind("hypervisor", "os")
		.bind("hypervisor", "num_cpu")
		.bind("hypervisor", "backup_disabled")
		.bind("hypervisor", "vms")
		.bind_via("hypervisor", "datacenter", "rack")
		.bind_via("hypervisor", "room", "rack")
		.bind_via("hypervisor", "building", "room")
		// vm
		.bind("vm", "hypervisor")
		.bind("vm", "os")
		.bind("vm", "comment")
		.bind("vm", "num_cpu")
		.bind("vm", "backup_disabled")
		.bind_via("vm", "rack", "hypervisor")
		.bind_via("vm", "datacenter", "rack")
		.bind_via("vm", "room", "rack")
		.bind_via("vm", "building", "room")
		.build()
		.unwrap()
}

pub async fn create_pool() -> SqlitePool {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	create_tables(&pool, &TableLayout::default()).await.unwrap();
	pool
}

pub async fn insert_server(pool: &SqlitePool, hostname: &str, servertype: &str) -> i64 {
	sqlx::query("INSERT INTO server (hostname, intern_ip, servertype_id) VALUES (?, NULL, ?)")
		.bind(hostname)
		.bind(servertype)
		.execute(pool)
		.await
		.unwrap()
		.last_insert_rowid()
}

pub async fn insert_string(pool: &SqlitePool, server_id: i64, attribute: &str, value: &str) {
	sqlx::query("INSERT INTO server_string_attribute (server_id, attribute_id, value) VALUES (?, ?, ?)")
		.bind(server_id)
		.bind(attribute)
		.bind(value)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_number(pool: &SqlitePool, server_id: i64, attribute: &str, value: i64) {
	sqlx::query("INSERT INTO server_number_attribute (server_id, attribute_id, value) VALUES (?, ?, ?)")
		.bind(server_id)
		.bind(attribute)
		.bind(value)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_relation(pool: &SqlitePool, server_id: i64, attribute: &str, target: i64) {
	sqlx::query("INSERT INTO server_relation_attribute (server_id, attribute_id, value) VALUES (?, ?, ?)")
		.bind(server_id)
		.bind(attribute)
		.bind(target)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_boolean(pool: &SqlitePool, server_id: i64, attribute: &str) {
	sqlx::query("INSERT INTO server_boolean_attribute (server_id, attribute_id) VALUES (?, ?)")
		.bind(server_id)
		.bind(attribute)
		.execute(pool)
		.await
		.unwrap();
}

pub struct Inventory {
	pub pool: SqlitePool,
	pub schema: Schema,
	pub ids: HashMap<&'static str, i64>,
}

impl Inventory {
	pub async fn new() -> Self {
		let pool = create_pool().await;
		let mut ids = HashMap::new();

		for (hostname, servertype) in [
			("room1", "room"),
			("room2", "room"),
			("rack1", "rack"),
			("rack2", "rack"),
			("hv1", "hypervisor"),
			("hv2", "hypervisor"),
			("vm1", "vm"),
			("vm2", "vm"),
			("vm3", "vm"),
			("vm4", "vm"),
		] {
			ids.insert(hostname, insert_server(&pool, hostname, servertype).await);
		}

		insert_string(&pool, ids["room1"], "building", "B1").await;
		insert_string(&pool, ids["room2"], "building", "B2").await;

		insert_relation(&pool, ids["rack1"], "room", ids["room1"]).await;
		insert_relation(&pool, ids["rack2"], "room", ids["room2"]).await;
		insert_string(&pool, ids["rack1"], "datacenter", "dc-a").await;
		insert_string(&pool, ids["rack2"], "datacenter", "dc-b").await;

		insert_relation(&pool, ids["hv1"], "rack", ids["rack1"]).await;
		insert_relation(&pool, ids["hv2"], "rack", ids["rack2"]).await;
		insert_string(&pool, ids["hv1"], "os", "bookworm").await;
		insert_string(&pool, ids["hv2"], "os", "trixie").await;
		insert_number(&pool, ids["hv1"], "num_cpu", 32).await;
		insert_number(&pool, ids["hv2"], "num_cpu", 64).await;

		insert_relation(&pool, ids["vm1"], "hypervisor", ids["hv1"]).await;
		insert_relation(&pool, ids["vm2"], "hypervisor", ids["hv1"]).await;
		insert_relation(&pool, ids["vm3"], "hypervisor", ids["hv2"]).await;

		insert_string(&pool, ids["vm1"], "os", "bookworm").await;
		insert_string(&pool, ids["vm2"], "os", "trixie").await;
		insert_string(&pool, ids["vm3"], "os", "bullseye").await;
		insert_string(&pool, ids["vm4"], "os", "bookworm").await;

		insert_number(&pool, ids["vm1"], "num_cpu", 2).await;
		insert_number(&pool, ids["vm2"], "num_cpu", 4).await;
		insert_number(&pool, ids["vm3"], "num_cpu", 8).await;

		insert_boolean(&pool, ids["vm1"], "backup_disabled").await;
		insert_boolean(&pool, ids["vm3"], "backup_disabled").await;

		Self {
			pool,
			schema: inventory_schema(),
			ids,
		}
	}

	pub fn config() -> QueryConfig {
		QueryConfig::for_dialect(DialectKind::Sqlite)
	}

	pub async fn query_with(
		&self,
		config: &QueryConfig,
		servertypes: &[&str],
		filters: Vec<(&str, Filter)>,
	) -> Result<Vec<String>, CompileError> {
		let compiler = QueryCompiler::new(&self.schema, config);
		let resolver = SqliteHostnameResolver::new(self.pool.clone(), config.layout.clone());
		let servertypes: Vec<ServertypeId> = servertypes.iter().map(|s| ServertypeId::new(*s)).collect();
		let filters: Vec<(AttributeId, Filter)> = filters
			.into_iter()
			.map(|(attribute, filter)| (AttributeId::new(attribute), filter))
			.collect();

		let Some(query) = compiler.prepare(&resolver, &servertypes, &filters).await? else {
			return Ok(Vec::new());
		};

		let rows = fetch_servers(&self.pool, &query).await?;
		Ok(rows.into_iter().map(|row| row.hostname).collect())
	}

	/// Hostnames matching all filters, in query order.
	pub async fn query(
		&self,
		servertypes: &[&str],
		filters: Vec<(&str, Filter)>,
	) -> Result<Vec<String>, CompileError> {
		self.query_with(&Self::config(), servertypes, filters).await
	}
}

pub fn names(hostnames: &[&str]) -> Vec<String> {
	hostnames.iter().map(|h| h.to_string()).collect()
}
