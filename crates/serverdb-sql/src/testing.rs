// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serverdb_config::TableLayout;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::sqlite::create_tables;

pub async fn create_test_pool() -> SqlitePool {
	// One connection, otherwise every connection gets its own empty database.
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap()
}

pub async fn create_inventory_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_tables(&pool, &TableLayout::default()).await.unwrap();
	pool
}

pub async fn insert_server(
	pool: &SqlitePool,
	hostname: &str,
	servertype: &str,
	intern_ip: Option<&str>,
) -> i64 {
	sqlx::query("INSERT INTO server (hostname, intern_ip, servertype_id) VALUES (?, ?, ?)")
		.bind(hostname)
		.bind(intern_ip)
		.bind(servertype)
		.execute(pool)
		.await
		.unwrap()
		.last_insert_rowid()
}
