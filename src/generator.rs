use log::{debug, warn};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::assembler::assemble;
use crate::collector::collect;
use crate::config::{CollectOptions, DocumentConfig, GenerateOptions};
use crate::models::{Document, PathItem, Schema, SWAGGER_VERSION};
use crate::registry::{RefRegistry, DEFINITIONS_PREFIX};
use crate::route::{Route, RouterSource};
use crate::translator::{translate, TranslationError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Missing required configuration: {0}")]
    Config(&'static str),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Reference `{reference}` has no matching entry in definitions (used at {site})")]
    Reference {
        name: String,
        reference: String,
        site: String,
    },
}

/// Collects routes from any number of routers and turns them into Swagger
/// 2.0 documents.
#[derive(Debug, Default, Clone)]
pub struct SwaggerApi {
    routes: Vec<Route>,
}

impl SwaggerApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every route of `router`, applying the prefix rules of `options`
    pub fn add_router(&mut self, router: &impl RouterSource, options: &CollectOptions) -> &mut Self {
        self.routes.extend(collect(router, options));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Build the document. Each call starts from a fresh reference registry,
    /// so calling it again with the same inputs yields an equal document.
    pub fn generate_spec(
        &self,
        config: &DocumentConfig,
        options: &GenerateOptions,
    ) -> Result<Document, GenerateError> {
        build(&self.routes, config, options)
    }
}

/// Assemble the final document from collected routes and document config
pub fn build(
    routes: &[Route],
    config: &DocumentConfig,
    options: &GenerateOptions,
) -> Result<Document, GenerateError> {
    let info = config.info.clone().ok_or(GenerateError::Config("info"))?;
    let mut registry = RefRegistry::new();

    let mut definitions = BTreeMap::new();
    for (name, node) in &config.definitions {
        // The definition itself is always inlined; only nested tags become refs
        let schema = translate(node, &mut registry, &format!("definitions.{}", name))?;
        definitions.insert(name.clone(), schema);
    }
    debug!("Translated {} definitions", definitions.len());

    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
    for route in routes {
        let (path, method, operation) = assemble(route, &mut registry, options)?;
        let slot = paths.entry(path.clone()).or_default().slot_mut(method);
        if slot.is_some() {
            warn!("Duplicate route {} {}, the later declaration wins", method, path);
        }
        *slot = Some(operation);
    }
    debug!("Assembled {} paths from {} routes", paths.len(), routes.len());

    check_references(&paths, &definitions, &registry)?;

    let base_path = config.base_path.clone().unwrap_or_else(|| {
        debug!("No basePath configured, using /");
        "/".to_string()
    });

    Ok(Document {
        swagger: SWAGGER_VERSION.to_string(),
        info,
        host: config.host.clone(),
        basePath: base_path,
        schemes: config.schemes.clone(),
        consumes: config.consumes.clone(),
        produces: config.produces.clone(),
        paths,
        definitions,
        tags: config.tags.clone(),
    })
}

/// Every `$ref` under `paths` and `definitions` must name a definition
fn check_references(
    paths: &BTreeMap<String, PathItem>,
    definitions: &BTreeMap<String, Schema>,
    registry: &RefRegistry,
) -> Result<(), GenerateError> {
    let mut references: Vec<(&str, String)> = Vec::new();

    for (path, item) in paths {
        for (method, operation) in item.operations() {
            let site = format!("{} {}", method, path);
            let mut found = Vec::new();
            for parameter in &operation.parameters {
                if let Some(schema) = &parameter.schema {
                    schema.collect_references(&mut found);
                }
                parameter.fragment.collect_references(&mut found);
            }
            for response in operation.responses.values() {
                if let Some(schema) = &response.schema {
                    schema.collect_references(&mut found);
                }
            }
            references.extend(found.into_iter().map(|r| (r, site.clone())));
        }
    }

    for (name, schema) in definitions {
        let mut found = Vec::new();
        schema.collect_references(&mut found);
        references.extend(found.into_iter().map(|r| (r, format!("definitions.{}", name))));
    }

    for (reference, site) in references {
        let name = reference.strip_prefix(DEFINITIONS_PREFIX).unwrap_or(reference);
        if !definitions.contains_key(name) {
            let site = registry
                .uses_of(name)
                .first()
                .cloned()
                .unwrap_or(site);
            return Err(GenerateError::Reference {
                name: name.to_string(),
                reference: reference.to_string(),
                site,
            });
        }
    }

    Ok(())
}
