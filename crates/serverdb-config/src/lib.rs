// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the serverdb query compiler.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - The SQL dialect and empty `All()` semantics used by the compiler
//! - Table and column names of the server database, validated as identifiers
//!
//! # Usage
//!
//! ```ignore
//! use serverdb_config::load_config;
//!
//! let config = load_config()?;
//! println!("Compiling for {}", config.compiler.dialect);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::QueryConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved query configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryConfig {
	pub compiler: CompilerConfig,
	pub layout: TableLayout,
	pub database: DatabaseConfig,
}

impl QueryConfig {
	/// Defaults with a different dialect, mostly for tests and tools.
	pub fn for_dialect(dialect: DialectKind) -> Self {
		let mut config = Self::default();
		config.compiler.dialect = dialect;
		config
	}

	/// Parses a TOML document on top of the built-in defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let layer: QueryConfigLayer =
			toml::from_str(input).map_err(|e| ConfigError::TomlParse {
				path: "<inline>".into(),
				source: e,
			})?;
		finalize(layer)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SERVERDB_*`)
/// 2. Config file (`/etc/serverdb/query.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<QueryConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::default()),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<QueryConfig, ConfigError> {
	let mut merged = QueryConfigLayer::default();
	merged.merge(EnvSource::default().load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<QueryConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::default()),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<QueryConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = QueryConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: QueryConfigLayer) -> Result<QueryConfig, ConfigError> {
	let compiler = layer.compiler.unwrap_or_default().finalize();
	let layout = layer.layout.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();

	validate_config(&compiler, &layout)?;

	info!(
		dialect = %compiler.dialect,
		empty_all = ?compiler.empty_all,
		max_relation_depth = compiler.max_relation_depth,
		merge_equalities = compiler.merge_equalities,
		server_table = %layout.server_table,
		database = %database.url,
		"Query configuration loaded"
	);

	Ok(QueryConfig {
		compiler,
		layout,
		database,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(compiler: &CompilerConfig, layout: &TableLayout) -> Result<(), ConfigError> {
	if compiler.max_relation_depth == 0 {
		return Err(ConfigError::Validation(
			"compiler.max_relation_depth must be at least 1, otherwise no related-via \
			 attribute can be reached"
				.to_string(),
		));
	}

	layout.validate()
}
