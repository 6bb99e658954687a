// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # serverdb-sql
//!
//! Compiles attribute filters into parameterized SQL listing servers.
//!
//! ## Pipeline
//!
//! For every `(attribute, filter)` pair of a query:
//!
//! 1. [`resolve`] finds where the attribute's value lives: a server column,
//!    a side table row owned by the server or by a related server, a reverse
//!    link, or a supernet server.
//! 2. [`combine`] folds `Not`/`All`/`Any` and hands every leaf to
//!    [`predicate`], which checks the operator against the attribute type and
//!    builds a template from encoded values ([`encode`]).
//! 3. [`assemble`] joins the conditions with the servertype restriction and
//!    a stable `ORDER BY`, then numbers placeholders for the [`dialect`].
//!
//! ```rust,ignore
//! let pool = connect(&config).await?;
//! let compiler = QueryCompiler::new(&schema, &config);
//! let resolver = SqliteHostnameResolver::new(pool.clone(), config.layout.clone());
//! if let Some(query) = compiler.prepare(&resolver, &servertypes, &filters).await? {
//!     let servers = fetch_servers(&pool, &query).await?;
//! }
//! ```
//!
//! ## Errors
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `TypeMismatch` | the literal does not fit the attribute's domain |
//! | `UnsupportedOperator` | the filter is not defined for the attribute type |
//! | `UnorderableType` | ordering filters on link attributes |
//! | `UnencodableValue` | quotes, trailing backslashes, non-finite numbers |
//! | `UnreachableAttribute` | no servertype of the query carries the attribute |
//! | `UnknownHostname` | a link filter names a server that does not exist |
//! | `RelationDepthExceeded` | related-via chains longer than configured |
//! | `UnsupportedByDialect` | regex or network operators on SQLite |
//!
//! ## Instrumentation
//!
//! Entry points carry `#[tracing::instrument]`; the assembled SQL is logged
//! at `debug`, related-via resolution at `trace`.

pub mod assemble;
pub mod combine;
pub mod context;
pub mod dialect;
pub mod encode;
mod error;
pub mod fragment;
pub mod lookup;
pub mod pool;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod predicate;
pub mod resolve;
pub mod sqlite;

#[cfg(test)]
pub mod testing;

pub use assemble::{Page, QueryCompiler, ServerQuery};
pub use context::Context;
pub use dialect::{Dialect, Postgres, Sqlite};
pub use encode::{decode_literal, encode_literal, encode_value, escape_like, unescape_like, validate_text};
pub use error::{CompileError, Result};
pub use fragment::{Condition, SqlValue, Template};
pub use lookup::{collect_hostnames, HostnameIds, HostnameResolver, SqliteHostnameResolver};
pub use pool::{connect, create_pool};
#[cfg(feature = "postgres")]
pub use postgres::bind_postgres;
pub use predicate::{Predicate, Subject};
pub use resolve::Location;
pub use sqlite::{bind_sqlite, create_tables, fetch_servers, ServerRow};
