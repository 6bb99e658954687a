// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Running compiled queries on PostgreSQL.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::assemble::ServerQuery;
use crate::fragment::SqlValue;

pub fn bind_postgres(query: &ServerQuery) -> Query<'_, Postgres, PgArguments> {
	let mut bound = sqlx::query(query.sql());
	for value in query.params() {
		bound = match value {
			SqlValue::Text(text) => bound.bind(text.as_str()),
			SqlValue::Integer(v) => bound.bind(*v),
		};
	}
	bound
}
