// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Immutable schema snapshot consumed by the query compiler.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeId, AttributeType, SpecialField, ValueDomain};
use crate::error::{Result, SchemaError};
use crate::servertype::{ServertypeAttribute, ServertypeId};

#[derive(Debug, Clone, Default)]
pub struct Schema {
	attributes: BTreeMap<AttributeId, Attribute>,
	servertypes: BTreeSet<ServertypeId>,
	bindings: BTreeMap<AttributeId, Vec<ServertypeAttribute>>,
}

/// What a search front-end needs to know about an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSummary {
	#[serde(rename = "type")]
	pub type_name: &'static str,
	pub multi: bool,
}

impl Schema {
	pub fn builder() -> SchemaBuilder {
		SchemaBuilder::default()
	}

	pub fn from_toml_str(input: &str) -> Result<Self> {
		let document: SchemaDocument = toml::from_str(input)?;
		document.into_schema()
	}

	pub fn from_json_str(input: &str) -> Result<Self> {
		let document: SchemaDocument = serde_json::from_str(input)?;
		document.into_schema()
	}

	pub fn attribute(&self, id: &AttributeId) -> Result<&Attribute> {
		self
			.attributes
			.get(id)
			.ok_or_else(|| SchemaError::UnknownAttribute(id.clone()))
	}

	pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
		self.attributes.values()
	}

	pub fn servertypes(&self) -> impl Iterator<Item = &ServertypeId> {
		self.servertypes.iter()
	}

	pub fn has_servertype(&self, id: &ServertypeId) -> bool {
		self.servertypes.contains(id)
	}

	/// All servertype bindings of an attribute, ordered by servertype.
	pub fn bindings(&self, attribute: &AttributeId) -> &[ServertypeAttribute] {
		self
			.bindings
			.get(attribute)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	pub fn binding(
		&self,
		servertype: &ServertypeId,
		attribute: &AttributeId,
	) -> Option<&ServertypeAttribute> {
		self
			.bindings(attribute)
			.iter()
			.find(|b| &b.servertype == servertype)
	}

	pub fn catalog(&self) -> BTreeMap<AttributeId, AttributeSummary> {
		self
			.attributes
			.values()
			.map(|a| {
				(
					a.id.clone(),
					AttributeSummary {
						type_name: a.attribute_type.name(),
						multi: a.multi,
					},
				)
			})
			.collect()
	}
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
	attributes: Vec<Attribute>,
	servertypes: Vec<ServertypeId>,
	bindings: Vec<ServertypeAttribute>,
}

impl SchemaBuilder {
	pub fn attribute(mut self, attribute: Attribute) -> Self {
		self.attributes.push(attribute);
		self
	}

	pub fn servertype(mut self, id: impl Into<String>) -> Self {
		self.servertypes.push(ServertypeId::new(id));
		self
	}

	pub fn binding(mut self, binding: ServertypeAttribute) -> Self {
		self.bindings.push(binding);
		self
	}

	pub fn bind(self, servertype: impl Into<String>, attribute: impl Into<String>) -> Self {
		self.binding(ServertypeAttribute::direct(servertype, attribute))
	}

	pub fn bind_via(
		self,
		servertype: impl Into<String>,
		attribute: impl Into<String>,
		via: impl Into<String>,
	) -> Self {
		self.binding(ServertypeAttribute::related_via(servertype, attribute, via))
	}

	pub fn build(self) -> Result<Schema> {
		let mut schema = Schema::default();

		for servertype in self.servertypes {
			if !schema.servertypes.insert(servertype.clone()) {
				return Err(SchemaError::DuplicateServertype(servertype));
			}
		}

		for attribute in self.attributes {
			if schema.attributes.contains_key(&attribute.id) {
				return Err(SchemaError::DuplicateAttribute(attribute.id));
			}
			schema.attributes.insert(attribute.id.clone(), attribute);
		}

		for attribute in schema.attributes.values() {
			validate_attribute(&schema, attribute)?;
		}

		for binding in self.bindings {
			validate_binding(&schema, &binding)?;
			let entry = schema.bindings.entry(binding.attribute.clone()).or_default();
			if entry.iter().any(|b| b.servertype == binding.servertype) {
				return Err(SchemaError::DuplicateBinding {
					servertype: binding.servertype,
					attribute: binding.attribute,
				});
			}
			entry.push(binding);
		}

		for entry in schema.bindings.values_mut() {
			entry.sort_by(|a, b| a.servertype.cmp(&b.servertype));
		}

		Ok(schema)
	}
}

fn validate_attribute(schema: &Schema, attribute: &Attribute) -> Result<()> {
	if attribute.special.is_some() && attribute.attribute_type.is_link() {
		return Err(SchemaError::InvalidSpecial(attribute.id.clone()));
	}

	match &attribute.attribute_type {
		AttributeType::Scalar(_) => {}
		AttributeType::Hostname { target_servertype } => {
			if let Some(target) = target_servertype {
				if !schema.has_servertype(target) {
					return Err(SchemaError::UnknownServertype(target.clone()));
				}
			}
		}
		AttributeType::ReverseHostname { reversed_attribute } => {
			let reversed = schema.attribute(reversed_attribute)?;
			if !matches!(reversed.attribute_type, AttributeType::Hostname { .. }) {
				return Err(SchemaError::InvalidReverse {
					attribute: attribute.id.clone(),
					reversed: reversed_attribute.clone(),
				});
			}
		}
		AttributeType::Supernet { target_servertype } => {
			if !schema.has_servertype(target_servertype) {
				return Err(SchemaError::UnknownServertype(target_servertype.clone()));
			}
		}
	}

	Ok(())
}

fn validate_binding(schema: &Schema, binding: &ServertypeAttribute) -> Result<()> {
	if !schema.has_servertype(&binding.servertype) {
		return Err(SchemaError::UnknownServertype(binding.servertype.clone()));
	}
	schema.attribute(&binding.attribute)?;

	if let Some(via) = &binding.related_via {
		let invalid = |reason| SchemaError::InvalidRelatedVia {
			servertype: binding.servertype.clone(),
			attribute: binding.attribute.clone(),
			via: via.clone(),
			reason,
		};

		if via == &binding.attribute {
			return Err(invalid("an attribute cannot be related via itself"));
		}
		let via_attribute = schema.attribute(via)?;
		if !via_attribute.attribute_type.is_link() {
			return Err(invalid("only hostname, reverse_hostname and supernet attributes relate servers"));
		}
	}

	Ok(())
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
	#[serde(default)]
	servertypes: Vec<ServertypeDocument>,
	#[serde(default)]
	attributes: Vec<AttributeDocument>,
}

#[derive(Debug, Deserialize)]
struct ServertypeDocument {
	id: String,
	#[serde(default)]
	attributes: Vec<BindingDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BindingDocument {
	Direct(String),
	Related {
		attribute: String,
		#[serde(default)]
		related_via: Option<String>,
	},
}

#[derive(Debug, Deserialize)]
struct AttributeDocument {
	id: String,
	#[serde(rename = "type")]
	kind: String,
	#[serde(default)]
	special: Option<String>,
	#[serde(default)]
	multi: bool,
	#[serde(default)]
	target_servertype: Option<String>,
	#[serde(default)]
	reversed_attribute: Option<String>,
}

impl AttributeDocument {
	fn into_attribute(self) -> Result<Attribute> {
		let id = AttributeId::new(self.id);
		let attribute_type = match self.kind.as_str() {
			"boolean" => AttributeType::Scalar(ValueDomain::Boolean),
			"number" => AttributeType::Scalar(ValueDomain::Number),
			"string" => AttributeType::Scalar(ValueDomain::String),
			"inet" => AttributeType::Scalar(ValueDomain::Inet),
			"macaddr" => AttributeType::Scalar(ValueDomain::Macaddr),
			"date" => AttributeType::Scalar(ValueDomain::Date),
			"datetime" => AttributeType::Scalar(ValueDomain::Datetime),
			"hostname" => AttributeType::Hostname {
				target_servertype: self.target_servertype.map(ServertypeId::new),
			},
			"reverse_hostname" => AttributeType::ReverseHostname {
				reversed_attribute: self.reversed_attribute.map(AttributeId::new).ok_or_else(|| {
					SchemaError::MissingField {
						attribute: id.clone(),
						field: "reversed_attribute",
					}
				})?,
			},
			"supernet" => AttributeType::Supernet {
				target_servertype: self.target_servertype.map(ServertypeId::new).ok_or_else(|| {
					SchemaError::MissingField {
						attribute: id.clone(),
						field: "target_servertype",
					}
				})?,
			},
			other => return Err(SchemaError::UnknownType(other.to_string())),
		};

		Ok(Attribute {
			id,
			attribute_type,
			special: self.special.map(SpecialField::new),
			multi: self.multi,
		})
	}
}

impl SchemaDocument {
	fn into_schema(self) -> Result<Schema> {
		let mut builder = Schema::builder();

		for attribute in self.attributes {
			builder = builder.attribute(attribute.into_attribute()?);
		}

		for servertype in self.servertypes {
			builder = builder.servertype(servertype.id.as_str());
			for binding in servertype.attributes {
				builder = match binding {
					BindingDocument::Direct(attribute) => builder.bind(servertype.id.as_str(), attribute),
					BindingDocument::Related {
						attribute,
						related_via: None,
					} => builder.bind(servertype.id.as_str(), attribute),
					BindingDocument::Related {
						attribute,
						related_via: Some(via),
					} => builder.bind_via(servertype.id.as_str(), attribute, via),
				};
			}
		}

		builder.build()
	}
}
