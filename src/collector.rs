use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CollectOptions;
use crate::models::HttpMethod;
use crate::route::{OutputMap, RequestSchemas, Route, RouterSource};

static REPEATED_SLASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").unwrap());

// :id, :id?, :id(\d+)
static PATH_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)(?:\([^)]*\))?\??").unwrap());

static TEMPLATE_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").unwrap());

/// Effective prefix for `router`: the collection option, then the router's
/// own prefix, then nothing.
pub fn resolve_prefix(router: &impl RouterSource, options: &CollectOptions) -> String {
    options
        .prefix
        .as_deref()
        .or_else(|| router.prefix())
        .unwrap_or("")
        .to_string()
}

/// Join a prefix and a route path with exactly one `/` between them and
/// rewrite koa-style parameters into Swagger path templates.
pub fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let joined = if !prefix.is_empty() && path.trim_matches('/').is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, path)
    };

    let mut joined = REPEATED_SLASH_REGEX.replace_all(&joined, "/").into_owned();
    if !joined.starts_with('/') {
        joined.insert(0, '/');
    }

    PATH_PARAM_REGEX.replace_all(&joined, "{$1}").into_owned()
}

/// Names of the `{templated}` segments of a Swagger path
pub fn path_template_params(path: &str) -> Vec<String> {
    TEMPLATE_PARAM_REGEX
        .captures_iter(path)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Map a joi-router body `type` onto a MIME type
pub fn normalize_mime_type(body_type: &str) -> Option<String> {
    match body_type.trim().to_lowercase().as_str() {
        "json" => Some("application/json".to_string()),
        "form" => Some("application/x-www-form-urlencoded".to_string()),
        "multipart" => Some("multipart/form-data".to_string()),
        mime if mime.contains('/') => Some(mime.to_string()),
        _ => None,
    }
}

/// Normalize every record of `router` into routes, one per method
pub fn collect(router: &impl RouterSource, options: &CollectOptions) -> Vec<Route> {
    let prefix = resolve_prefix(router, options);
    let mut routes = Vec::new();

    for record in router.records() {
        let validate = record.validate.clone().unwrap_or_default();
        let metadata = record
            .meta
            .as_ref()
            .and_then(|meta| meta.swagger.clone())
            .unwrap_or_default();

        // Output outside `validate` is still honored; `validate.output` wins per code
        let mut outputs: OutputMap = record.output.clone().unwrap_or_default();
        if let Some(validate_output) = validate.output {
            outputs.extend(validate_output);
        }

        let content_type = validate.body_type.as_deref().and_then(|body_type| {
            let mime = normalize_mime_type(body_type);
            if mime.is_none() {
                warn!("Unknown body type '{}' on {}, leaving consumes empty", body_type, record.path);
            }
            mime
        });

        let request = RequestSchemas {
            body: validate.body,
            body_ref: validate.reference,
            query: validate.query,
            params: validate.params,
            headers: validate.header,
            content_type,
        };

        for name in record.method.names() {
            let Some(method) = HttpMethod::parse(name) else {
                warn!("Skipping {} {}: method is not supported by Swagger 2.0", name, record.path);
                continue;
            };

            routes.push(Route {
                method,
                path: record.path.clone(),
                prefix: prefix.clone(),
                metadata: metadata.clone(),
                request: request.clone(),
                outputs: outputs.clone(),
            });
        }
    }

    debug!("Collected {} routes with prefix '{}'", routes.len(), prefix);
    routes
}
