//! Read-only model of joi-style validation schema nodes.
//!
//! Nodes usually arrive from a router manifest (JSON or YAML) but can also be
//! built in code with the constructors below.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// The kind of a validation node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Object,
    Array,
    Alternatives,
    Any,
    /// A kind this crate does not know how to document
    Unknown(String),
}

impl From<&str> for SchemaKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "object" => Self::Object,
            "array" => Self::Array,
            "alternatives" | "alt" => Self::Alternatives,
            "any" => Self::Any,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl SchemaKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
            Self::Array => "array",
            Self::Alternatives => "alternatives",
            Self::Any => "any",
            Self::Unknown(kind) => kind,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchemaKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchemaKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = String::deserialize(deserializer)?;
        Ok(SchemaKind::from(kind.as_str()))
    }
}

/// One node of a validation schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(alias = "type")]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", alias = "valid", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Whether an object accepts keys beyond `properties`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(default, alias = "try", skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<SchemaNode>,
    /// Reference tag naming a shared definition
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            required: false,
            min: None,
            max: None,
            pattern: None,
            format: None,
            enum_values: None,
            default: None,
            example: None,
            unknown: None,
            items: None,
            properties: BTreeMap::new(),
            alternatives: Vec::new(),
            reference: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn date() -> Self {
        Self::new(SchemaKind::Date)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Create an object node from `(name, child)` pairs
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self {
            properties: properties
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
            ..Self::new(SchemaKind::Object)
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaKind::Array)
        }
    }

    pub fn alternatives(branches: Vec<SchemaNode>) -> Self {
        Self {
            alternatives: branches,
            ..Self::new(SchemaKind::Alternatives)
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn valid(mut self, values: Vec<serde_json::Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    #[must_use]
    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_nested_node() {
        let yaml = r#"
kind: object
properties:
  username:
    kind: string
    required: true
    min: 3
    max: 30
  tags:
    type: array
    items:
      kind: string
"#;
        let node: SchemaNode = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(node.kind, SchemaKind::Object);
        let username = &node.properties["username"];
        assert!(username.required);
        assert_eq!(username.min, Some(3.0));
        assert_eq!(node.properties["tags"].kind, SchemaKind::Array);
        assert_eq!(
            node.properties["tags"].items.as_deref().map(|n| &n.kind),
            Some(&SchemaKind::String)
        );
    }

    #[test]
    fn test_unknown_kind_is_kept() {
        let node: SchemaNode = serde_json::from_str(r#"{"kind": "binary"}"#).unwrap();
        assert_eq!(node.kind, SchemaKind::Unknown("binary".to_string()));
    }

    #[test]
    fn test_ref_and_valid_aliases() {
        let node: SchemaNode =
            serde_json::from_str(r#"{"kind": "string", "valid": ["a", "b"], "ref": "Letter"}"#)
                .unwrap();
        assert_eq!(node.reference.as_deref(), Some("Letter"));
        assert_eq!(node.enum_values.map(|v| v.len()), Some(2));
    }
}
