// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::QueryConfigLayer;
use crate::sections::{CompilerConfigLayer, DatabaseConfigLayer, LayoutConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<QueryConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<QueryConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(QueryConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/serverdb/query.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<QueryConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(QueryConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: QueryConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SERVERDB_<FIELD>, e.g. `SERVERDB_DIALECT` or
/// `SERVERDB_SERVER_TABLE`.
pub struct EnvSource {
	prefix: String,
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::with_prefix("SERVERDB_")
	}
}

impl EnvSource {
	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn var(&self, field: &str) -> Option<String> {
		env_var(&format!("{}{field}", self.prefix))
	}

	fn bool(&self, field: &str) -> Result<Option<bool>, ConfigError> {
		let key = format!("{}{field}", self.prefix);
		match env_var(&key) {
			Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(Some(true)),
			Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(Some(false)),
			Some(v) => Err(ConfigError::InvalidValue {
				key,
				message: format!("invalid boolean value '{v}', expected true, false, 1 or 0"),
			}),
			None => Ok(None),
		}
	}

	fn parse<T: FromStr>(&self, field: &str, what: &str) -> Result<Option<T>, ConfigError> {
		let key = format!("{}{field}", self.prefix);
		match env_var(&key) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key,
				message: format!("invalid {what} value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn load_compiler(&self) -> Result<CompilerConfigLayer, ConfigError> {
		Ok(CompilerConfigLayer {
			dialect: self.parse("DIALECT", "dialect")?,
			empty_all: self.parse("EMPTY_ALL", "empty All() semantics")?,
			max_relation_depth: self.parse("MAX_RELATION_DEPTH", "usize")?,
			merge_equalities: self.bool("MERGE_EQUALITIES")?,
		})
	}

	fn load_layout(&self) -> LayoutConfigLayer {
		LayoutConfigLayer {
			server_table: self.var("SERVER_TABLE"),
			server_id_column: self.var("SERVER_ID_COLUMN"),
			hostname_column: self.var("HOSTNAME_COLUMN"),
			network_column: self.var("NETWORK_COLUMN"),
			servertype_column: self.var("SERVERTYPE_COLUMN"),
			project_column: self.var("PROJECT_COLUMN"),
			relation_table: self.var("RELATION_TABLE"),
			boolean_table: self.var("BOOLEAN_TABLE"),
			number_table: self.var("NUMBER_TABLE"),
			string_table: self.var("STRING_TABLE"),
			inet_table: self.var("INET_TABLE"),
			macaddr_table: self.var("MACADDR_TABLE"),
			date_table: self.var("DATE_TABLE"),
			datetime_table: self.var("DATETIME_TABLE"),
		}
	}

	fn load_database(&self) -> DatabaseConfigLayer {
		DatabaseConfigLayer {
			url: self.var("DATABASE_URL"),
		}
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<QueryConfigLayer, ConfigError> {
		debug!(prefix = %self.prefix, "loading environment variables");
		Ok(QueryConfigLayer {
			compiler: Some(self.load_compiler()?),
			layout: Some(self.load_layout()),
			database: Some(self.load_database()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}
