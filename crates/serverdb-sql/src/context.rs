// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serverdb_config::{CompilerConfig, TableLayout};
use serverdb_core::{Schema, ServertypeId, ValueDomain};

use crate::dialect::Dialect;
use crate::lookup::HostnameIds;

/// Everything one compile call reads. Nothing outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
	pub schema: &'a Schema,
	pub dialect: &'a dyn Dialect,
	pub layout: &'a TableLayout,
	pub options: &'a CompilerConfig,
	/// Candidate servertypes, sorted and deduplicated.
	pub servertypes: &'a [ServertypeId],
	pub hostnames: &'a HostnameIds,
}

impl Context<'_> {
	/// `server.<column>` on the outer server row.
	pub fn server_column(&self, column: &str) -> String {
		format!("server.{column}")
	}

	pub fn side_table(&self, domain: ValueDomain) -> &str {
		match domain {
			ValueDomain::Boolean => &self.layout.boolean_table,
			ValueDomain::Number => &self.layout.number_table,
			ValueDomain::String => &self.layout.string_table,
			ValueDomain::Inet => &self.layout.inet_table,
			ValueDomain::Macaddr => &self.layout.macaddr_table,
			ValueDomain::Date => &self.layout.date_table,
			ValueDomain::Datetime => &self.layout.datetime_table,
		}
	}
}
