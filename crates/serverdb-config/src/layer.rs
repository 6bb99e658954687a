// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{CompilerConfigLayer, DatabaseConfigLayer, LayoutConfigLayer};

/// Query configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfigLayer {
	#[serde(default)]
	pub compiler: Option<CompilerConfigLayer>,
	#[serde(default)]
	pub layout: Option<LayoutConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
}

impl QueryConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: QueryConfigLayer) {
		merge_option(
			&mut self.compiler,
			other.compiler,
			CompilerConfigLayer::merge,
		);
		merge_option(&mut self.layout, other.layout, LayoutConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sections::DialectKind;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = QueryConfigLayer::default();
		base.merge(QueryConfigLayer::default());
		assert!(base.compiler.is_none());
		assert!(base.layout.is_none());
	}

	#[test]
	fn test_merge_other_overwrites() {
		let mut base = QueryConfigLayer {
			compiler: Some(CompilerConfigLayer {
				dialect: Some(DialectKind::Postgres),
				max_relation_depth: Some(3),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(QueryConfigLayer {
			compiler: Some(CompilerConfigLayer {
				dialect: Some(DialectKind::Sqlite),
				..Default::default()
			}),
			..Default::default()
		});

		let compiler = base.compiler.unwrap();
		assert_eq!(compiler.dialect, Some(DialectKind::Sqlite));
		assert_eq!(compiler.max_relation_depth, Some(3));
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = QueryConfigLayer::default();
		base.merge(QueryConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite::memory:".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(
			base.database.unwrap().url,
			Some("sqlite::memory:".to_string())
		);
	}
}
