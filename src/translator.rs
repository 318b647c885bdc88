use log::debug;
use thiserror::Error;

use crate::models::Schema;
use crate::registry::RefRegistry;
use crate::schema::{SchemaKind, SchemaNode};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Unrecognized schema kind `{kind}` at {at}")]
    UnknownKind { kind: String, at: String },

    #[error("Array schema at {at} has no `items`")]
    MissingItems { at: String },

    #[error("Alternatives schema at {at} has no branches")]
    EmptyAlternatives { at: String },

    #[error("Invalid constraint at {at}: {reason}")]
    InvalidConstraint { at: String, reason: String },

    #[error("Invalid reference `{reference}` at {at}: expected a definition name or #/definitions/<Name>")]
    InvalidReference { reference: String, at: String },
}

/// Translate one validation node into a Swagger 2.0 schema.
///
/// The node's own `ref` tag is not consulted here; callers go through
/// [`RefRegistry::resolve`] for that. Children are always resolved through the
/// registry so nested reference tags become `$ref` pointers.
pub fn translate(
    node: &SchemaNode,
    registry: &mut RefRegistry,
    at: &str,
) -> Result<Schema, TranslationError> {
    let mut schema = match &node.kind {
        SchemaKind::String => translate_string(node, at)?,
        SchemaKind::Number => translate_number(node, "number", at)?,
        SchemaKind::Integer => translate_number(node, "integer", at)?,
        SchemaKind::Boolean => Schema::typed("boolean"),
        SchemaKind::Date => Schema {
            format: Some("date-time".to_string()),
            ..Schema::typed("string")
        },
        SchemaKind::Object => translate_object(node, registry, at)?,
        SchemaKind::Array => translate_array(node, registry, at)?,
        SchemaKind::Alternatives => translate_alternatives(node, registry, at)?,
        SchemaKind::Any => Schema::default(),
        SchemaKind::Unknown(kind) => {
            return Err(TranslationError::UnknownKind {
                kind: kind.clone(),
                at: at.to_string(),
            })
        }
    };

    if schema.format.is_none() {
        schema.format = node.format.clone();
    }
    if node.description.is_some() {
        schema.description = node.description.clone();
    }
    if node.default.is_some() {
        schema.default = node.default.clone();
    }
    if node.example.is_some() {
        schema.example = node.example.clone();
    }

    Ok(schema)
}

fn translate_string(node: &SchemaNode, at: &str) -> Result<Schema, TranslationError> {
    check_bounds(node, at)?;
    Ok(Schema {
        minLength: count_bound(node.min, "min", at)?,
        maxLength: count_bound(node.max, "max", at)?,
        pattern: node.pattern.clone(),
        enum_values: node.enum_values.clone(),
        ..Schema::typed("string")
    })
}

fn translate_number(node: &SchemaNode, type_: &str, at: &str) -> Result<Schema, TranslationError> {
    check_bounds(node, at)?;
    Ok(Schema {
        minimum: node.min,
        maximum: node.max,
        enum_values: node.enum_values.clone(),
        ..Schema::typed(type_)
    })
}

fn translate_object(
    node: &SchemaNode,
    registry: &mut RefRegistry,
    at: &str,
) -> Result<Schema, TranslationError> {
    check_bounds(node, at)?;
    let mut schema = Schema {
        minProperties: count_bound(node.min, "min", at)?,
        maxProperties: count_bound(node.max, "max", at)?,
        additionalProperties: node.unknown,
        ..Schema::typed("object")
    };

    for (name, child) in &node.properties {
        let child_at = format!("{}.{}", at, name);
        if child.required {
            schema.required.push(name.clone());
        }
        schema
            .properties
            .insert(name.clone(), registry.resolve(child, None, &child_at)?);
    }

    Ok(schema)
}

fn translate_array(
    node: &SchemaNode,
    registry: &mut RefRegistry,
    at: &str,
) -> Result<Schema, TranslationError> {
    let items = node.items.as_deref().ok_or_else(|| TranslationError::MissingItems {
        at: at.to_string(),
    })?;
    check_bounds(node, at)?;

    Ok(Schema {
        items: Some(Box::new(registry.resolve(items, None, &format!("{}[]", at))?)),
        minItems: count_bound(node.min, "min", at)?,
        maxItems: count_bound(node.max, "max", at)?,
        ..Schema::typed("array")
    })
}

/// Emits the first branch as the schema itself and lists every branch, in
/// declaration order, under `x-alternatives`.
fn translate_alternatives(
    node: &SchemaNode,
    registry: &mut RefRegistry,
    at: &str,
) -> Result<Schema, TranslationError> {
    if node.alternatives.is_empty() {
        return Err(TranslationError::EmptyAlternatives { at: at.to_string() });
    }

    let branches = node
        .alternatives
        .iter()
        .enumerate()
        .map(|(i, branch)| registry.resolve(branch, None, &format!("{}|{}", at, i)))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Translated {} alternatives at {}", branches.len(), at);

    let mut schema = branches[0].clone();
    schema.alternatives = Some(branches);
    Ok(schema)
}

fn check_bounds(node: &SchemaNode, at: &str) -> Result<(), TranslationError> {
    match (node.min, node.max) {
        (Some(min), Some(max)) if min > max => Err(TranslationError::InvalidConstraint {
            at: at.to_string(),
            reason: format!("min ({}) is greater than max ({})", min, max),
        }),
        _ => Ok(()),
    }
}

/// Length and size bounds must be whole, non-negative numbers
fn count_bound(value: Option<f64>, name: &str, at: &str) -> Result<Option<u64>, TranslationError> {
    match value {
        None => Ok(None),
        Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(Some(v as u64)),
        Some(v) => Err(TranslationError::InvalidConstraint {
            at: at.to_string(),
            reason: format!("{} must be a non-negative whole number, got {}", name, v),
        }),
    }
}
