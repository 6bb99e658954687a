// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ipnet::IpNet;

/// Literal operand of a leaf filter, tagged by the upstream parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
	Inet(IpNet),
}

impl Literal {
	pub fn type_name(&self) -> &'static str {
		match self {
			Literal::Bool(_) => "boolean",
			Literal::Integer(_) => "integer",
			Literal::Float(_) => "float",
			Literal::String(_) => "string",
			Literal::Inet(_) => "inet",
		}
	}
}

impl std::fmt::Display for Literal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::Bool(v) => write!(f, "{v}"),
			Literal::Integer(v) => write!(f, "{v}"),
			Literal::Float(v) => write!(f, "{v}"),
			Literal::String(v) => write!(f, "{v}"),
			Literal::Inet(v) => write!(f, "{v}"),
		}
	}
}

impl From<bool> for Literal {
	fn from(v: bool) -> Self {
		Literal::Bool(v)
	}
}

impl From<i64> for Literal {
	fn from(v: i64) -> Self {
		Literal::Integer(v)
	}
}

impl From<f64> for Literal {
	fn from(v: f64) -> Self {
		Literal::Float(v)
	}
}

impl From<&str> for Literal {
	fn from(v: &str) -> Self {
		Literal::String(v.to_string())
	}
}

impl From<String> for Literal {
	fn from(v: String) -> Self {
		Literal::String(v)
	}
}

impl From<IpNet> for Literal {
	fn from(v: IpNet) -> Self {
		Literal::Inet(v)
	}
}

/// A filter expression against a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	Equals(Literal),
	Not(Box<Filter>),
	All(Vec<Filter>),
	Any(Vec<Filter>),
	GreaterThan(Literal),
	LessThan(Literal),
	GreaterThanOrEquals(Literal),
	LessThanOrEquals(Literal),
	Regexp(String),
	Empty,
	StartsWith(Literal),
	Contains(Literal),
	ContainedBy(Literal),
	ContainedOnlyBy(Literal),
	Overlaps(Literal),
}

impl Filter {
	pub fn name(&self) -> &'static str {
		match self {
			Filter::Equals(_) => "Equals",
			Filter::Not(_) => "Not",
			Filter::All(_) => "All",
			Filter::Any(_) => "Any",
			Filter::GreaterThan(_) => "GreaterThan",
			Filter::LessThan(_) => "LessThan",
			Filter::GreaterThanOrEquals(_) => "GreaterThanOrEquals",
			Filter::LessThanOrEquals(_) => "LessThanOrEquals",
			Filter::Regexp(_) => "Regexp",
			Filter::Empty => "Empty",
			Filter::StartsWith(_) => "StartsWith",
			Filter::Contains(_) => "Contains",
			Filter::ContainedBy(_) => "ContainedBy",
			Filter::ContainedOnlyBy(_) => "ContainedOnlyBy",
			Filter::Overlaps(_) => "Overlaps",
		}
	}

	pub fn equals(value: impl Into<Literal>) -> Self {
		Filter::Equals(value.into())
	}

	pub fn negate(inner: Filter) -> Self {
		Filter::Not(Box::new(inner))
	}

	pub fn is_composite(&self) -> bool {
		matches!(self, Filter::Not(_) | Filter::All(_) | Filter::Any(_))
	}

	/// Visits every leaf below this filter in input order.
	pub fn for_each_leaf<'a, F>(&'a self, visit: &mut F)
	where
		F: FnMut(&'a Filter),
	{
		match self {
			Filter::Not(inner) => inner.for_each_leaf(visit),
			Filter::All(children) | Filter::Any(children) => {
				for child in children {
					child.for_each_leaf(visit);
				}
			}
			leaf => visit(leaf),
		}
	}
}
