// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod compiler;
mod database;
mod layout;

pub use compiler::{CompilerConfig, CompilerConfigLayer, DialectKind, EmptyAllSemantics};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use layout::{is_identifier, LayoutConfigLayer, TableLayout};
