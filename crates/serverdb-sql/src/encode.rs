// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value encoder.
//!
//! Literals are always bound as parameters. Text is still validated the same
//! way a quoting encoder would, so a value accepted here can also be inlined
//! into a statement for logging.

use std::net::IpAddr;

use ipnet::IpNet;
use serverdb_core::{Attribute, Literal, ValueDomain};

use crate::error::{CompileError, Result};
use crate::fragment::SqlValue;

/// Rejects quotes and a trailing unescaped backslash.
pub fn validate_text(value: &str) -> Result<()> {
	if value.contains('\'') {
		return Err(CompileError::UnencodableValue(format!(
			"{value:?} contains a single quote"
		)));
	}

	let trailing = value.chars().rev().take_while(|c| *c == '\\').count();
	if trailing % 2 == 1 {
		return Err(CompileError::UnencodableValue(format!(
			"{value:?} ends with an unescaped backslash"
		)));
	}

	Ok(())
}

/// Converts a literal into the bound value for an attribute of `domain`.
pub fn encode_value(attribute: &Attribute, domain: ValueDomain, literal: &Literal) -> Result<SqlValue> {
	let mismatch = || CompileError::TypeMismatch {
		attribute: attribute.id.clone(),
		expected: domain.as_str(),
		found: literal.type_name(),
	};

	match (domain, literal) {
		(ValueDomain::Boolean, Literal::Bool(v)) => Ok(SqlValue::Integer(i64::from(*v))),
		// Integers and floats share one bound type so a prepared statement
		// never sees a number parameter change type between executions.
		(ValueDomain::Number, Literal::Integer(v)) => Ok(SqlValue::Text(v.to_string())),
		(ValueDomain::Number, Literal::Float(v)) => {
			if v.is_finite() {
				Ok(SqlValue::Text(v.to_string()))
			} else {
				Err(CompileError::UnencodableValue(format!(
					"{v} is not a finite number"
				)))
			}
		}
		(ValueDomain::Inet, Literal::Inet(net)) => Ok(SqlValue::Text(network_text(net))),
		(ValueDomain::Inet, Literal::String(text)) => {
			validate_text(text)?;
			let net = parse_network(text).ok_or_else(mismatch)?;
			Ok(SqlValue::Text(network_text(&net)))
		}
		(
			ValueDomain::String | ValueDomain::Macaddr | ValueDomain::Date | ValueDomain::Datetime,
			Literal::String(text),
		) => {
			validate_text(text)?;
			Ok(SqlValue::Text(text.clone()))
		}
		_ => Err(mismatch()),
	}
}

fn parse_network(text: &str) -> Option<IpNet> {
	text
		.parse::<IpNet>()
		.ok()
		.or_else(|| text.parse::<IpAddr>().ok().map(IpNet::from))
}

/// Host networks print as bare addresses, like PostgreSQL's inet output.
fn network_text(net: &IpNet) -> String {
	if net.prefix_len() == net.max_prefix_len() {
		net.addr().to_string()
	} else {
		net.to_string()
	}
}

/// Quotes text as a standard SQL string literal.
pub fn encode_literal(text: &str) -> String {
	format!("'{}'", text.replace('\'', "''"))
}

/// Inverse of [`encode_literal`].
pub fn decode_literal(quoted: &str) -> Option<String> {
	let inner = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
	let mut decoded = String::with_capacity(inner.len());
	let mut chars = inner.chars();
	while let Some(c) = chars.next() {
		if c == '\'' {
			if chars.next() != Some('\'') {
				return None;
			}
		}
		decoded.push(c);
	}
	Some(decoded)
}

/// Escapes `\`, `%` and `_` for a LIKE pattern with `ESCAPE '\'`.
pub fn escape_like(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		if matches!(c, '\\' | '%' | '_') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

pub fn unescape_like(pattern: &str) -> String {
	let mut text = String::with_capacity(pattern.len());
	let mut chars = pattern.chars();
	while let Some(c) = chars.next() {
		if c == '\\' {
			if let Some(next) = chars.next() {
				text.push(next);
				continue;
			}
		}
		text.push(c);
	}
	text
}

pub fn inline_value(value: &SqlValue) -> String {
	match value {
		SqlValue::Text(text) => encode_literal(text),
		SqlValue::Integer(v) => v.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn attribute(domain: ValueDomain) -> Attribute {
		Attribute::scalar("attr", domain)
	}

	#[test]
	fn test_rejects_quotes() {
		let err = validate_text("O'Brien").unwrap_err();
		assert!(matches!(err, CompileError::UnencodableValue(_)));
	}

	#[test]
	fn test_trailing_backslash() {
		assert!(validate_text("C:\\").is_err());
		assert!(validate_text("C:\\\\").is_ok());
		assert!(validate_text("a\\b").is_ok());
		assert!(validate_text("").is_ok());
	}

	#[test]
	fn test_number_domain() {
		let attr = attribute(ValueDomain::Number);
		assert_eq!(
			encode_value(&attr, ValueDomain::Number, &Literal::Integer(4)).unwrap(),
			SqlValue::text("4")
		);
		assert_eq!(
			encode_value(&attr, ValueDomain::Number, &Literal::Float(4.0)).unwrap(),
			SqlValue::text("4")
		);
		assert_eq!(
			encode_value(&attr, ValueDomain::Number, &Literal::Float(3.5)).unwrap(),
			SqlValue::text("3.5")
		);
		assert_eq!(
			encode_value(&attr, ValueDomain::Number, &Literal::Float(1e20)).unwrap(),
			SqlValue::text("100000000000000000000")
		);
		assert!(matches!(
			encode_value(&attr, ValueDomain::Number, &Literal::Float(f64::NAN)).unwrap_err(),
			CompileError::UnencodableValue(_)
		));
		assert!(matches!(
			encode_value(&attr, ValueDomain::Number, &Literal::from("4")).unwrap_err(),
			CompileError::TypeMismatch {
				expected: "number",
				found: "string",
				..
			}
		));
	}

	#[test]
	fn test_inet_domain_canonicalizes() {
		let attr = attribute(ValueDomain::Inet);
		assert_eq!(
			encode_value(&attr, ValueDomain::Inet, &Literal::from("10.0.0.1")).unwrap(),
			SqlValue::text("10.0.0.1")
		);
		assert_eq!(
			encode_value(&attr, ValueDomain::Inet, &Literal::from("10.0.0.0/24")).unwrap(),
			SqlValue::text("10.0.0.0/24")
		);
		let net: IpNet = "2001:db8::1/128".parse().unwrap();
		assert_eq!(
			encode_value(&attr, ValueDomain::Inet, &Literal::Inet(net)).unwrap(),
			SqlValue::text("2001:db8::1")
		);
		assert!(encode_value(&attr, ValueDomain::Inet, &Literal::from("not-an-ip")).is_err());
	}

	#[test]
	fn test_inet_string_with_quote() {
		let attr = attribute(ValueDomain::Inet);
		assert!(matches!(
			encode_value(&attr, ValueDomain::Inet, &Literal::from("10.0.0.1'")).unwrap_err(),
			CompileError::UnencodableValue(_)
		));
	}

	#[test]
	fn test_string_domain_validates() {
		let attr = attribute(ValueDomain::String);
		assert!(encode_value(&attr, ValueDomain::String, &Literal::from("it's")).is_err());
		assert!(encode_value(&attr, ValueDomain::Date, &Literal::from("2024-02-29")).is_ok());
		assert!(encode_value(&attr, ValueDomain::String, &Literal::Integer(1)).is_err());
	}

	#[test]
	fn test_decode_rejects_malformed() {
		assert_eq!(decode_literal("'a''b'"), Some("a'b".to_string()));
		assert_eq!(decode_literal("'a'b'"), None);
		assert_eq!(decode_literal("abc"), None);
	}

	#[test]
	fn test_escape_like() {
		assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
		assert_eq!(escape_like("plain"), "plain");
	}

	proptest! {
		#[test]
		fn literal_roundtrip(text in any::<String>()) {
			prop_assert_eq!(decode_literal(&encode_literal(&text)), Some(text));
		}

		#[test]
		fn quotes_never_validate(prefix in "[^']{0,20}", suffix in "[^']{0,20}") {
			let value = format!("{prefix}'{suffix}");
			prop_assert!(validate_text(&value).is_err());
		}

		#[test]
		fn validated_text_encodes_unchanged(text in "[a-zA-Z0-9 %_.\\-]{0,40}") {
			let attr = Attribute::scalar("attr", ValueDomain::String);
			let encoded = encode_value(&attr, ValueDomain::String, &Literal::from(text.as_str())).unwrap();
			prop_assert_eq!(encoded, SqlValue::Text(text));
		}

		#[test]
		fn integer_and_float_numbers_agree(v in -1_000_000i64..1_000_000) {
			let attr = Attribute::scalar("attr", ValueDomain::Number);
			prop_assert_eq!(
				encode_value(&attr, ValueDomain::Number, &Literal::Integer(v)).unwrap(),
				encode_value(&attr, ValueDomain::Number, &Literal::Float(v as f64)).unwrap()
			);
		}

		#[test]
		fn like_escape_roundtrip(text in any::<String>()) {
			prop_assert_eq!(unescape_like(&escape_like(&text)), text);
		}
	}
}
