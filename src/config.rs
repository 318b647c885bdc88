use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::models::{Info, Tag};
use crate::route::{OutputMap, OutputSpec, StatusCode};
use crate::schema::SchemaNode;

/// Document-level settings merged into the generated document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    /// Named schemas addressable as `#/definitions/<Name>`
    #[serde(default)]
    pub definitions: BTreeMap<String, SchemaNode>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl DocumentConfig {
    pub fn new(info: Info, base_path: &str) -> Self {
        Self {
            info: Some(info),
            base_path: Some(base_path.to_string()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_definition(mut self, name: &str, node: SchemaNode) -> Self {
        self.definitions.insert(name.to_string(), node);
        self
    }

    /// Fill `host`, `schemes` and (when unset) `basePath` from a server URL
    pub fn apply_server_url(&mut self, server_url: &str) -> Result<()> {
        let url = url::Url::parse(server_url)
            .context(format!("Invalid server URL: {}", server_url))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Server URL has no host: {}", server_url))?;

        let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        self.host = Some(format!("{}{}", host, port));
        self.schemes = vec![url.scheme().to_string()];
        if self.base_path.is_none() {
            self.base_path = Some(url.path().to_string());
        }
        Ok(())
    }
}

/// Responses added to operations that do not declare a given status code.
///
/// `Unset` applies the built-in `200` response, `Disabled` adds nothing and
/// `Provided` uses the given map. In a config file an absent key is `Unset`
/// and an explicit `null` is `Disabled`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultResponses {
    #[default]
    Unset,
    Disabled,
    Provided(OutputMap),
}

impl DefaultResponses {
    pub fn builtin() -> OutputMap {
        let mut responses = OutputMap::new();
        responses.insert(StatusCode::from(200), OutputSpec::described("Success"));
        responses
    }

    /// The responses to merge, if any
    pub fn responses(&self) -> Option<Cow<'_, OutputMap>> {
        match self {
            Self::Unset => Some(Cow::Owned(Self::builtin())),
            Self::Disabled => None,
            Self::Provided(responses) => Some(Cow::Borrowed(responses)),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultResponses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<OutputMap>::deserialize(deserializer)? {
            Some(responses) => Self::Provided(responses),
            None => Self::Disabled,
        })
    }
}

/// Options for one `generate_spec` call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    #[serde(default)]
    pub default_responses: DefaultResponses,
}

impl GenerateOptions {
    pub fn without_default_responses() -> Self {
        Self {
            default_responses: DefaultResponses::Disabled,
        }
    }

    pub fn with_default_responses(responses: OutputMap) -> Self {
        Self {
            default_responses: DefaultResponses::Provided(responses),
        }
    }
}

/// Options for collecting one router
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectOptions {
    /// Overrides the router's own prefix
    pub prefix: Option<String>,
}

impl CollectOptions {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
        }
    }
}
