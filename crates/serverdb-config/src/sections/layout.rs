// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Table layout configuration section.
//!
//! Names of the server table, its well-known columns and the per-type
//! attribute side tables. Every name is spliced into generated SQL, so they
//! are validated as plain identifiers.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfigLayer {
	pub server_table: Option<String>,
	pub server_id_column: Option<String>,
	pub hostname_column: Option<String>,
	pub network_column: Option<String>,
	pub servertype_column: Option<String>,
	pub project_column: Option<String>,
	pub relation_table: Option<String>,
	pub boolean_table: Option<String>,
	pub number_table: Option<String>,
	pub string_table: Option<String>,
	pub inet_table: Option<String>,
	pub macaddr_table: Option<String>,
	pub date_table: Option<String>,
	pub datetime_table: Option<String>,
}

impl LayoutConfigLayer {
	pub fn merge(&mut self, other: Self) {
		merge_field(&mut self.server_table, other.server_table);
		merge_field(&mut self.server_id_column, other.server_id_column);
		merge_field(&mut self.hostname_column, other.hostname_column);
		merge_field(&mut self.network_column, other.network_column);
		merge_field(&mut self.servertype_column, other.servertype_column);
		merge_field(&mut self.project_column, other.project_column);
		merge_field(&mut self.relation_table, other.relation_table);
		merge_field(&mut self.boolean_table, other.boolean_table);
		merge_field(&mut self.number_table, other.number_table);
		merge_field(&mut self.string_table, other.string_table);
		merge_field(&mut self.inet_table, other.inet_table);
		merge_field(&mut self.macaddr_table, other.macaddr_table);
		merge_field(&mut self.date_table, other.date_table);
		merge_field(&mut self.datetime_table, other.datetime_table);
	}

	pub fn finalize(self) -> TableLayout {
		let defaults = TableLayout::default();
		TableLayout {
			server_table: self.server_table.unwrap_or(defaults.server_table),
			server_id_column: self.server_id_column.unwrap_or(defaults.server_id_column),
			hostname_column: self.hostname_column.unwrap_or(defaults.hostname_column),
			network_column: self.network_column.unwrap_or(defaults.network_column),
			servertype_column: self.servertype_column.unwrap_or(defaults.servertype_column),
			project_column: self.project_column.unwrap_or(defaults.project_column),
			relation_table: self.relation_table.unwrap_or(defaults.relation_table),
			boolean_table: self.boolean_table.unwrap_or(defaults.boolean_table),
			number_table: self.number_table.unwrap_or(defaults.number_table),
			string_table: self.string_table.unwrap_or(defaults.string_table),
			inet_table: self.inet_table.unwrap_or(defaults.inet_table),
			macaddr_table: self.macaddr_table.unwrap_or(defaults.macaddr_table),
			date_table: self.date_table.unwrap_or(defaults.date_table),
			datetime_table: self.datetime_table.unwrap_or(defaults.datetime_table),
		}
	}
}

fn merge_field(target: &mut Option<String>, source: Option<String>) {
	if source.is_some() {
		*target = source;
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableLayout {
	pub server_table: String,
	pub server_id_column: String,
	pub hostname_column: String,
	pub network_column: String,
	pub servertype_column: String,
	pub project_column: String,
	/// Side table of hostname attributes; `value` holds the target server id.
	pub relation_table: String,
	pub boolean_table: String,
	pub number_table: String,
	pub string_table: String,
	pub inet_table: String,
	pub macaddr_table: String,
	pub date_table: String,
	pub datetime_table: String,
}

impl Default for TableLayout {
	fn default() -> Self {
		Self {
			server_table: "server".to_string(),
			server_id_column: "server_id".to_string(),
			hostname_column: "hostname".to_string(),
			network_column: "intern_ip".to_string(),
			servertype_column: "servertype_id".to_string(),
			project_column: "project_id".to_string(),
			relation_table: "server_relation_attribute".to_string(),
			boolean_table: "server_boolean_attribute".to_string(),
			number_table: "server_number_attribute".to_string(),
			string_table: "server_string_attribute".to_string(),
			inet_table: "server_inet_attribute".to_string(),
			macaddr_table: "server_macaddr_attribute".to_string(),
			date_table: "server_date_attribute".to_string(),
			datetime_table: "server_datetime_attribute".to_string(),
		}
	}
}

impl TableLayout {
	fn names(&self) -> [(&'static str, &str); 14] {
		[
			("server_table", &self.server_table),
			("server_id_column", &self.server_id_column),
			("hostname_column", &self.hostname_column),
			("network_column", &self.network_column),
			("servertype_column", &self.servertype_column),
			("project_column", &self.project_column),
			("relation_table", &self.relation_table),
			("boolean_table", &self.boolean_table),
			("number_table", &self.number_table),
			("string_table", &self.string_table),
			("inet_table", &self.inet_table),
			("macaddr_table", &self.macaddr_table),
			("date_table", &self.date_table),
			("datetime_table", &self.datetime_table),
		]
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for (key, name) in self.names() {
			if !is_identifier(name) {
				return Err(ConfigError::InvalidValue {
					key: format!("layout.{key}"),
					message: format!("'{name}' is not a plain SQL identifier"),
				});
			}
		}
		Ok(())
	}
}

/// ASCII letters, digits and underscores, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
