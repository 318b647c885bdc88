use log::debug;
use std::collections::BTreeMap;

use crate::models::Schema;
use crate::schema::SchemaNode;
use crate::translator::{translate, TranslationError};

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Turns reference tags into `$ref` pointers and remembers where each
/// definition was used.
///
/// A reference is only emitted when a node (or its route) carries an explicit
/// `ref`. Structurally identical nodes without a tag are translated inline
/// every time.
#[derive(Debug, Default)]
pub struct RefRegistry {
    uses: BTreeMap<String, Vec<String>>,
}

impl RefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `node`, preferring `explicit_ref` over the node's own tag
    pub fn resolve(
        &mut self,
        node: &SchemaNode,
        explicit_ref: Option<&str>,
        at: &str,
    ) -> Result<Schema, TranslationError> {
        match explicit_ref.or(node.reference.as_deref()) {
            Some(reference) => self.reference(reference, at),
            None => translate(node, self, at),
        }
    }

    /// Record a use of `reference` at `at` and return the `$ref` schema
    pub fn reference(&mut self, reference: &str, at: &str) -> Result<Schema, TranslationError> {
        let name = definition_name(reference, at)?;
        debug!("Using definition {} at {}", name, at);
        self.uses
            .entry(name.to_string())
            .or_default()
            .push(at.to_string());
        Ok(Schema::reference(format!("{}{}", DEFINITIONS_PREFIX, name)))
    }

    /// Locations that referenced `name`, in resolution order
    pub fn uses_of(&self, name: &str) -> &[String] {
        self.uses.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of every definition referenced so far
    pub fn referenced(&self) -> impl Iterator<Item = &str> {
        self.uses.keys().map(String::as_str)
    }
}

/// Extract the definition name from a reference tag.
///
/// Accepts `Name`, `/definitions/Name` and `#/definitions/Name`.
pub fn definition_name<'a>(reference: &'a str, at: &str) -> Result<&'a str, TranslationError> {
    let name = if let Some(name) = reference.strip_prefix(DEFINITIONS_PREFIX) {
        name
    } else if let Some(name) = reference.strip_prefix("/definitions/") {
        name
    } else if !reference.contains('/') && !reference.contains('#') {
        reference
    } else {
        ""
    };

    if name.is_empty() || name.contains('/') {
        return Err(TranslationError::InvalidReference {
            reference: reference.to_string(),
            at: at.to_string(),
        });
    }
    Ok(name)
}
