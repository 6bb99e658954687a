// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for serverdb attribute queries.
//!
//! This crate provides the schema metadata (attributes, servertypes and
//! their bindings) and the filter expressions that `serverdb-sql` compiles
//! into SQL conditions.
//!
//! # Example
//!
//! ```
//! use serverdb_core::{Attribute, Filter, Schema, ValueDomain};
//!
//! let schema = Schema::builder()
//!     .servertype("vm")
//!     .attribute(Attribute::scalar("os", ValueDomain::String))
//!     .bind("vm", "os")
//!     .build()
//!     .unwrap();
//!
//! let filter = Filter::Any(vec![Filter::equals("bookworm"), Filter::equals("trixie")]);
//! assert_eq!(schema.bindings(&"os".into()).len(), 1);
//! assert!(filter.is_composite());
//! ```

pub mod attribute;
pub mod error;
pub mod filter;
pub mod schema;
pub mod servertype;
pub mod wire;

pub use attribute::{Attribute, AttributeId, AttributeType, SpecialField, ValueDomain};
pub use error::{FilterError, Result, SchemaError};
pub use filter::{Filter, Literal};
pub use schema::{AttributeSummary, Schema, SchemaBuilder};
pub use servertype::{ServertypeAttribute, ServertypeId};
pub use wire::parse_query;
