// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serverdb_config::QueryConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::Result;
use crate::sqlite::create_tables;

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./serverdb.db")
///
/// # Errors
/// Returns `CompileError::Lookup` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Opens the database named by the `[database]` section and makes sure the
/// tables of the configured layout exist.
#[tracing::instrument(skip(config), fields(url = %config.database.url))]
pub async fn connect(config: &QueryConfig) -> Result<SqlitePool> {
	let pool = create_pool(&config.database.url).await?;
	create_tables(&pool, &config.layout).await?;
	Ok(pool)
}
