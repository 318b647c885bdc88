//! Route records as exposed by a joi-router, and the normalized [`Route`]
//! the assembler consumes.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::HttpMethod;
use crate::schema::SchemaNode;

/// A response status code key (`200`, `"201"`, `"default"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self(code.trim().to_string())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct StatusCodeVisitor;

impl<'de> Visitor<'de> for StatusCodeVisitor {
    type Value = StatusCode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a status code as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StatusCode, E> {
        Ok(StatusCode::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatusCode, E> {
        Ok(StatusCode(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatusCode, E> {
        Ok(StatusCode(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusCodeVisitor)
    }
}

/// Schema of one response, as declared under `output`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<SchemaNode>,
    /// Emit the body as a `$ref` to this definition instead of inlining it
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OutputSpec {
    pub fn body(body: SchemaNode) -> Self {
        Self {
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }
}

pub type OutputMap = BTreeMap<StatusCode, OutputSpec>;

/// The `validate` block of a route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validate {
    /// Request body type: `json`, `form`, `multipart` or a MIME type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SchemaNode>,
    #[serde(alias = "headers", default, skip_serializing_if = "Option::is_none")]
    pub header: Option<SchemaNode>,
    /// Emit the body as a `$ref` to this definition instead of inlining it
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMap>,
}

/// Documentation fields copied onto the operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<OperationMeta>,
}

/// One method or a list of methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Methods {
    One(String),
    Many(Vec<String>),
}

impl Methods {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Methods::One(method) => vec![method.as_str()],
            Methods::Many(methods) => methods.iter().map(String::as_str).collect(),
        }
    }
}

/// A route as declared on a router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub path: String,
    pub method: Methods,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<RouteMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<Validate>,
    /// Output declared next to `validate` rather than inside it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMap>,
}

impl RouteRecord {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            path: path.to_string(),
            method: Methods::One(method.to_string()),
            meta: None,
            validate: None,
            output: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: OperationMeta) -> Self {
        self.meta = Some(RouteMeta { swagger: Some(meta) });
        self
    }

    #[must_use]
    pub fn with_validate(mut self, validate: Validate) -> Self {
        self.validate = Some(validate);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputMap) -> Self {
        self.output = Some(output);
        self
    }
}

/// Anything that can hand over a prefix and a list of route records
pub trait RouterSource {
    fn prefix(&self) -> Option<&str>;
    fn records(&self) -> &[RouteRecord];
}

/// A joi-router as loaded from a route manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoiRouter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

impl JoiRouter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn route(&mut self, record: RouteRecord) -> &mut Self {
        self.routes.push(record);
        self
    }
}

impl RouterSource for JoiRouter {
    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn records(&self) -> &[RouteRecord] {
        &self.routes
    }
}

/// Request-side schemas of a normalized route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSchemas {
    pub body: Option<SchemaNode>,
    pub body_ref: Option<String>,
    pub query: Option<SchemaNode>,
    pub params: Option<SchemaNode>,
    pub headers: Option<SchemaNode>,
    pub content_type: Option<String>,
}

/// A normalized route, one per method
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub prefix: String,
    pub metadata: OperationMeta,
    pub request: RequestSchemas,
    pub outputs: OutputMap,
}

impl Route {
    /// The route path with its prefix applied, in Swagger template form
    pub fn effective_path(&self) -> String {
        crate::collector::join_path(&self.prefix, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_codes_from_yaml_integers_and_strings() {
        let yaml = r#"
200:
  description: ok
"201":
  description: created
"#;
        let outputs: OutputMap = serde_yaml::from_str(yaml).unwrap();
        let codes: Vec<&str> = outputs.keys().map(StatusCode::as_str).collect();
        assert_eq!(codes, vec!["200", "201"]);
    }

    #[test]
    fn test_route_record_from_json() {
        let json = r##"{
            "path": "/signup",
            "method": ["POST", "put"],
            "meta": { "swagger": { "summary": "User Signup", "operationId": "signup" } },
            "validate": {
                "type": "json",
                "headers": { "kind": "object" },
                "ref": "#/definitions/Profile",
                "output": { "200": { "ref": "Profile" } }
            }
        }"##;
        let record: RouteRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.method.names(), vec!["POST", "put"]);
        let meta = record.meta.unwrap().swagger.unwrap();
        assert_eq!(meta.operation_id.as_deref(), Some("signup"));
        let validate = record.validate.unwrap();
        assert!(validate.header.is_some());
        assert_eq!(validate.body_type.as_deref(), Some("json"));
        assert_eq!(validate.reference.as_deref(), Some("#/definitions/Profile"));
    }
}
