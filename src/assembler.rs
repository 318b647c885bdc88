use log::{debug, warn};
use std::collections::BTreeMap;

use crate::collector::path_template_params;
use crate::config::GenerateOptions;
use crate::models::{Header, HttpMethod, Operation, Parameter, ParameterLocation, Response, Schema};
use crate::registry::RefRegistry;
use crate::route::{OutputSpec, Route, StatusCode};
use crate::schema::{SchemaKind, SchemaNode};
use crate::translator::TranslationError;

/// Name given to the single `in: body` parameter
pub const BODY_PARAMETER_NAME: &str = "body";

/// Build the operation for one route.
///
/// Returns the effective path, the method and the operation object.
pub fn assemble(
    route: &Route,
    registry: &mut RefRegistry,
    options: &GenerateOptions,
) -> Result<(String, HttpMethod, Operation), TranslationError> {
    let path = route.effective_path();
    let site = format!("{} {}", route.method, path);
    debug!("Assembling {}", site);

    let meta = &route.metadata;
    let mut operation = Operation {
        tags: meta.tags.clone(),
        summary: meta.summary.clone(),
        description: meta.description.clone(),
        operationId: meta.operation_id.clone(),
        deprecated: meta.deprecated,
        consumes: meta.consumes.clone(),
        produces: meta.produces.clone(),
        ..Default::default()
    };
    if operation.consumes.is_empty() {
        operation.consumes.extend(route.request.content_type.clone());
    }

    operation.parameters = build_parameters(route, &path, &site, registry)?;
    operation.responses = build_responses(route, &site, registry, options)?;

    Ok((path, route.method, operation))
}

fn build_parameters(
    route: &Route,
    path: &str,
    site: &str,
    registry: &mut RefRegistry,
) -> Result<Vec<Parameter>, TranslationError> {
    let request = &route.request;
    let mut parameters = Vec::new();

    let template = path_template_params(path);
    if let Some(params) = &request.params {
        for parameter in property_parameters(params, ParameterLocation::Path, site, "params", registry)? {
            if template.contains(&parameter.name) {
                parameters.push(parameter);
            } else {
                warn!("params.{} on {} has no matching path segment, skipping it", parameter.name, site);
            }
        }
    }

    // Swagger 2.0 requires every templated segment to be declared
    for name in template {
        let declared = parameters
            .iter()
            .any(|p| p.in_type == ParameterLocation::Path && p.name == name);
        if !declared {
            debug!("Declaring implicit path parameter '{}' on {}", name, site);
            parameters.push(Parameter {
                name,
                in_type: ParameterLocation::Path,
                description: None,
                required: true,
                schema: None,
                fragment: Schema::typed("string"),
            });
        }
    }

    if let Some(query) = &request.query {
        parameters.extend(property_parameters(query, ParameterLocation::Query, site, "query", registry)?);
    }

    if let Some(headers) = &request.headers {
        parameters.extend(property_parameters(headers, ParameterLocation::Header, site, "header", registry)?);
    }

    if let Some(body) = &request.body {
        let at = format!("{} body", site);
        let mut schema = registry.resolve(body, request.body_ref.as_deref(), &at)?;
        let description = if schema.ref_.is_none() { schema.description.take() } else { None };
        parameters.push(Parameter {
            name: BODY_PARAMETER_NAME.to_string(),
            in_type: ParameterLocation::Body,
            description,
            required: body.required,
            schema: Some(schema),
            fragment: Schema::default(),
        });
    } else if let Some(reference) = &request.body_ref {
        let schema = registry.reference(reference, &format!("{} body", site))?;
        parameters.push(Parameter {
            name: BODY_PARAMETER_NAME.to_string(),
            in_type: ParameterLocation::Body,
            description: None,
            required: false,
            schema: Some(schema),
            fragment: Schema::default(),
        });
    }

    Ok(parameters)
}

/// One parameter per top-level property of an object schema
fn property_parameters(
    node: &SchemaNode,
    location: ParameterLocation,
    site: &str,
    label: &str,
    registry: &mut RefRegistry,
) -> Result<Vec<Parameter>, TranslationError> {
    if node.kind != SchemaKind::Object {
        warn!("{} schema on {} is a {}, not an object; no parameters emitted", label, site, node.kind);
        return Ok(Vec::new());
    }

    let mut parameters = Vec::new();
    for (name, child) in &node.properties {
        let at = format!("{} {}.{}", site, label, name);
        let schema = registry.resolve(child, None, &at)?;
        let description = schema.description.clone();
        parameters.push(Parameter {
            name: name.clone(),
            in_type: location,
            description,
            required: child.required || location == ParameterLocation::Path,
            schema: None,
            fragment: primitive_fragment(&schema, &at),
        });
    }
    Ok(parameters)
}

/// Reduce a schema to the keywords a non-body parameter (or its `items`)
/// may carry. Anything that is not a primitive or an array degrades to
/// `type: string`.
fn primitive_fragment(schema: &Schema, at: &str) -> Schema {
    let primitive = matches!(
        schema.type_.as_deref(),
        Some("string" | "number" | "integer" | "boolean" | "array")
    );
    if schema.ref_.is_some() || !primitive {
        warn!("{} cannot be described as a primitive parameter, documenting it as a string", at);
        return Schema::typed("string");
    }

    Schema {
        type_: schema.type_.clone(),
        format: schema.format.clone(),
        default: schema.default.clone(),
        enum_values: schema.enum_values.clone(),
        maximum: schema.maximum,
        minimum: schema.minimum,
        maxLength: schema.maxLength,
        minLength: schema.minLength,
        pattern: schema.pattern.clone(),
        maxItems: schema.maxItems,
        minItems: schema.minItems,
        items: schema
            .items
            .as_deref()
            .map(|items| Box::new(primitive_fragment(items, at))),
        ..Default::default()
    }
}

fn build_responses(
    route: &Route,
    site: &str,
    registry: &mut RefRegistry,
    options: &GenerateOptions,
) -> Result<BTreeMap<String, Response>, TranslationError> {
    let mut responses = BTreeMap::new();

    for (code, output) in &route.outputs {
        if !is_valid_status_code(code.as_str()) {
            warn!("Response key '{}' on {} is not a Swagger 2.0 status code, skipping it", code, site);
            continue;
        }
        responses.insert(code.to_string(), build_response(code, output, site, registry)?);
    }

    if let Some(defaults) = options.default_responses.responses() {
        for (code, output) in defaults.iter() {
            if !is_valid_status_code(code.as_str()) {
                warn!("Default response key '{}' is not a Swagger 2.0 status code, skipping it", code);
                continue;
            }
            if !responses.contains_key(code.as_str()) {
                responses.insert(code.to_string(), build_response(code, output, site, registry)?);
            }
        }
    }

    Ok(responses)
}

fn build_response(
    code: &StatusCode,
    output: &OutputSpec,
    site: &str,
    registry: &mut RefRegistry,
) -> Result<Response, TranslationError> {
    let at = format!("{} output.{}", site, code);
    let schema = match (&output.body, &output.reference) {
        (Some(body), reference) => Some(registry.resolve(body, reference.as_deref(), &at)?),
        (None, Some(reference)) => Some(registry.reference(reference, &at)?),
        (None, None) => None,
    };

    let mut headers = BTreeMap::new();
    if let Some(node) = &output.headers {
        for parameter in property_parameters(node, ParameterLocation::Header, site, &format!("output.{}.headers", code), registry)? {
            headers.insert(
                parameter.name,
                Header {
                    type_: parameter.fragment.type_.unwrap_or_else(|| "string".to_string()),
                    format: parameter.fragment.format,
                    description: parameter.description,
                    default: parameter.fragment.default,
                    enum_values: parameter.fragment.enum_values,
                    items: parameter.fragment.items,
                },
            );
        }
    }

    Ok(Response {
        description: output
            .description
            .clone()
            .unwrap_or_else(|| reason_phrase(code.as_str()).to_string()),
        schema,
        headers,
    })
}

fn is_valid_status_code(code: &str) -> bool {
    code == "default"
        || (code.len() == 3
            && code.chars().all(|c| c.is_ascii_digit())
            && ('1'..='5').contains(&code.chars().next().unwrap_or('0')))
}

/// Description used when an output does not declare one
pub fn reason_phrase(code: &str) -> &'static str {
    match code {
        "200" => "OK",
        "201" => "Created",
        "202" => "Accepted",
        "204" => "No Content",
        "301" => "Moved Permanently",
        "302" => "Found",
        "304" => "Not Modified",
        "400" => "Bad Request",
        "401" => "Unauthorized",
        "403" => "Forbidden",
        "404" => "Not Found",
        "409" => "Conflict",
        "422" => "Unprocessable Entity",
        "429" => "Too Many Requests",
        "500" => "Internal Server Error",
        "502" => "Bad Gateway",
        "503" => "Service Unavailable",
        "default" => "Default response",
        _ => "Response",
    }
}
