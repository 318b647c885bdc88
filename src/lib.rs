//! Generate Swagger 2.0 documents from joi-router route declarations.
//!
//! Routes carry the same validation schemas used to check live traffic; this
//! crate translates those schemas into the document so the two cannot drift.
//!
//! ```no_run
//! use joi_router_docs::{CollectOptions, DocumentConfig, GenerateOptions, SwaggerApi};
//! # fn run(router: joi_router_docs::JoiRouter, config: DocumentConfig) -> anyhow::Result<()> {
//! let mut api = SwaggerApi::new();
//! api.add_router(&router, &CollectOptions::default());
//! let spec = api.generate_spec(&config, &GenerateOptions::default())?;
//! println!("{}", serde_json::to_string_pretty(&spec)?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod collector;
pub mod config;
pub mod generator;
pub mod loader;
pub mod models;
pub mod registry;
pub mod route;
pub mod schema;
pub mod translator;

pub use config::{CollectOptions, DefaultResponses, DocumentConfig, GenerateOptions};
pub use generator::{GenerateError, SwaggerApi};
pub use models::Document;
pub use route::{JoiRouter, RouterSource};
pub use schema::SchemaNode;
pub use translator::TranslationError;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    use crate::collector::path_template_params;
    use crate::models::{HttpMethod, Info, ParameterLocation};
    use crate::route::{OperationMeta, OutputMap, OutputSpec, RouteRecord, StatusCode, Validate};
    use crate::{loader, CollectOptions, Document, DocumentConfig, GenerateOptions, JoiRouter, SchemaNode, SwaggerApi};

    fn example_config() -> DocumentConfig {
        DocumentConfig::new(
            Info {
                title: "Example API".to_string(),
                version: "1.1".to_string(),
                ..Default::default()
            },
            "/",
        )
    }

    fn output(code: u16, spec: OutputSpec) -> OutputMap {
        let mut map = OutputMap::new();
        map.insert(StatusCode::from(code), spec);
        map
    }

    fn signup_router() -> JoiRouter {
        let mut router = JoiRouter::new();
        router.route(
            RouteRecord::new("get", "/signup")
                .with_meta(OperationMeta {
                    summary: Some("User Signup".to_string()),
                    ..Default::default()
                })
                .with_validate(Validate::default()),
        );
        router
    }

    /// Structural rules of Swagger 2.0 that a document validator enforces
    fn assert_valid_swagger(doc: &Document) {
        let value = serde_json::to_value(doc).unwrap();
        assert_eq!(value["swagger"], "2.0");
        assert!(value["info"]["title"].is_string());
        assert!(value["info"]["version"].is_string());

        for (path, item) in &doc.paths {
            assert!(path.starts_with('/'), "path {} must start with /", path);
            let templated: HashSet<String> = path_template_params(path).into_iter().collect();

            for (method, op) in item.operations() {
                let bodies = op
                    .parameters
                    .iter()
                    .filter(|p| p.in_type == ParameterLocation::Body)
                    .count();
                assert!(bodies <= 1, "{} {} has {} body parameters", method, path, bodies);

                let mut seen = HashSet::new();
                for p in &op.parameters {
                    assert!(seen.insert((p.name.clone(), p.in_type as u8)), "duplicate parameter {}", p.name);
                    match p.in_type {
                        ParameterLocation::Body => assert!(p.schema.is_some()),
                        ParameterLocation::Path => {
                            assert!(p.required);
                            assert!(templated.contains(&p.name), "undeclared path segment {}", p.name);
                            assert!(p.fragment.type_.is_some());
                        }
                        _ => assert!(p.fragment.type_.is_some()),
                    }
                }

                for (code, response) in &op.responses {
                    assert!(
                        code == "default" || (code.len() == 3 && code.chars().all(|c| c.is_ascii_digit())),
                        "{} {} has invalid response key {}",
                        method,
                        path,
                        code
                    );
                    for (name, header) in &response.headers {
                        if header.type_ == "array" {
                            assert!(header.items.is_some(), "array header {} misses items", name);
                        }
                    }
                }

                let declared: HashSet<&String> = op
                    .parameters
                    .iter()
                    .filter(|p| p.in_type == ParameterLocation::Path)
                    .map(|p| &p.name)
                    .collect();
                for segment in &templated {
                    assert!(declared.contains(segment), "{} {} misses path parameter {}", method, path, segment);
                }
                for response in op.responses.values() {
                    assert!(!response.description.is_empty());
                }
            }
        }

        let mut references = Vec::new();
        for item in doc.paths.values() {
            for (_, op) in item.operations() {
                for p in &op.parameters {
                    if let Some(schema) = &p.schema {
                        schema.collect_references(&mut references);
                    }
                }
                for r in op.responses.values() {
                    if let Some(schema) = &r.schema {
                        schema.collect_references(&mut references);
                    }
                }
            }
        }
        for reference in references {
            let name = reference.trim_start_matches("#/definitions/");
            assert!(doc.definitions.contains_key(name), "dangling reference {}", reference);
        }
    }

    #[test]
    fn test_generate_with_valid_data() {
        let mut router = JoiRouter::new();
        router.route(
            RouteRecord::new("get", "/signup")
                .with_meta(OperationMeta {
                    summary: Some("User Signup".to_string()),
                    ..Default::default()
                })
                .with_validate(Validate {
                    body_type: Some("json".to_string()),
                    body: Some(SchemaNode::object([(
                        "username",
                        SchemaNode::string()
                            .pattern("^[a-zA-Z0-9]*$")
                            .min(3.0)
                            .max(30.0)
                            .required(),
                    )])),
                    output: Some(output(
                        200,
                        OutputSpec::body(SchemaNode::object([(
                            "userId",
                            SchemaNode::string().description("Newly created user id"),
                        )])),
                    )),
                    ..Default::default()
                }),
        );

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::default())
            .unwrap();

        let value = serde_json::to_value(&spec).unwrap();
        let keys: HashSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["info", "basePath", "swagger", "paths", "tags"].into_iter().collect()
        );

        let op = &value["paths"]["/signup"]["get"];
        assert_eq!(op["summary"], "User Signup");
        assert_eq!(op["consumes"], json!(["application/json"]));
        assert_eq!(
            op["parameters"][0]["schema"]["properties"]["username"],
            json!({ "type": "string", "minLength": 3, "maxLength": 30, "pattern": "^[a-zA-Z0-9]*$" })
        );
        assert_eq!(
            op["responses"]["200"]["schema"]["properties"]["userId"]["description"],
            "Newly created user id"
        );
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_params_must_match_path_segments() {
        let mut router = JoiRouter::new();
        router.route(RouteRecord::new("get", "/users").with_validate(Validate {
            params: Some(SchemaNode::object([("id", SchemaNode::integer())])),
            output: Some(output(
                200,
                OutputSpec {
                    headers: Some(SchemaNode::object([("x-ids", SchemaNode::array(SchemaNode::string()))])),
                    ..Default::default()
                },
            )),
            ..Default::default()
        }));

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::default())
            .unwrap();

        let op = spec.paths["/users"].get_operation(HttpMethod::Get).unwrap();
        assert!(op.parameters.is_empty());
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_empty_default_response() {
        let mut router = JoiRouter::new();
        router.route(RouteRecord::new("get", "/empty-default-response").with_validate(Validate {
            output: Some(output(
                201,
                OutputSpec::body(SchemaNode::object([("ok", SchemaNode::boolean())])),
            )),
            ..Default::default()
        }));

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::without_default_responses())
            .unwrap();

        let op = spec.paths["/empty-default-response"]
            .get_operation(HttpMethod::Get)
            .unwrap();
        assert_eq!(op.responses.keys().collect::<Vec<_>>(), vec!["201"]);
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_output_placed_outside_of_validate() {
        let mut router = JoiRouter::new();
        router.route(
            RouteRecord::new("get", "/output-outside-validate").with_output(output(
                201,
                OutputSpec::body(SchemaNode::object([("ok", SchemaNode::boolean())])),
            )),
        );

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::default())
            .unwrap();

        let op = spec.paths["/output-outside-validate"]
            .get_operation(HttpMethod::Get)
            .unwrap();
        assert_eq!(op.responses.keys().collect::<Vec<_>>(), vec!["200", "201"]);
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_router_prefix() {
        let router = signup_router().with_prefix("/api");
        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::default())
            .unwrap();

        assert_eq!(spec.paths.keys().collect::<Vec<_>>(), vec!["/api/signup"]);
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_prefix_option_over_router_prefix() {
        let router = signup_router().with_prefix("/api");
        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::with_prefix("/other-api"));
        let spec = api
            .generate_spec(&example_config(), &GenerateOptions::default())
            .unwrap();

        assert_eq!(spec.paths.keys().collect::<Vec<_>>(), vec!["/other-api/signup"]);
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_references() {
        let profile = SchemaNode::object([("profileName", SchemaNode::string())]);
        let mut router = JoiRouter::new();
        router.route(RouteRecord::new("get", "/signup").with_validate(Validate {
            body_type: Some("json".to_string()),
            body: Some(profile.clone()),
            reference: Some("#/definitions/Profile".to_string()),
            output: Some(output(
                200,
                OutputSpec {
                    body: Some(profile.clone()),
                    reference: Some("#/definitions/Profile".to_string()),
                    ..Default::default()
                },
            )),
            ..Default::default()
        }));

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let spec = api
            .generate_spec(
                &example_config().with_definition("Profile", profile),
                &GenerateOptions::default(),
            )
            .unwrap();

        let value = serde_json::to_value(&spec).unwrap();
        let op = &value["paths"]["/signup"]["get"];
        assert_eq!(op["parameters"][0]["schema"], json!({ "$ref": "#/definitions/Profile" }));
        assert_eq!(op["responses"]["200"]["schema"], json!({ "$ref": "#/definitions/Profile" }));
        assert_eq!(
            value["definitions"]["Profile"],
            json!({ "type": "object", "properties": { "profileName": { "type": "string" } } })
        );
        assert_valid_swagger(&spec);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let mut router = signup_router().with_prefix("/api");
        router.route(RouteRecord::new("post", "/users/:id").with_validate(Validate {
            params: Some(SchemaNode::object([("id", SchemaNode::integer())])),
            query: Some(SchemaNode::object([("verbose", SchemaNode::boolean())])),
            ..Default::default()
        }));

        let mut api = SwaggerApi::new();
        api.add_router(&router, &CollectOptions::default());
        let config = example_config();
        let options = GenerateOptions::default();

        let first = api.generate_spec(&config, &options).unwrap();
        let second = api.generate_spec(&config, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_valid_swagger(&first);
    }

    #[test]
    fn test_generate_from_manifest_files() {
        let dir = tempdir().unwrap();
        let routes_dir = dir.path().join("routes");
        fs::create_dir_all(&routes_dir).unwrap();
        fs::write(
            routes_dir.join("users.yaml"),
            r#"
prefix: /api
routes:
  - path: /users/:id
    method: [get, delete]
    validate:
      params:
        kind: object
        properties:
          id:
            kind: integer
            required: true
      output:
        200:
          ref: User
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("api.yaml"),
            r#"
info:
  title: Example API
  version: "1.1"
basePath: /
definitions:
  User:
    kind: object
    properties:
      name:
        kind: string
"#,
        )
        .unwrap();

        let config = loader::load_document_config(dir.path().join("api.yaml")).unwrap();
        let mut api = SwaggerApi::new();
        for file in loader::find_router_files(&[&routes_dir]).unwrap() {
            api.add_router(&loader::load_router(file).unwrap(), &CollectOptions::default());
        }
        let spec = api.generate_spec(&config, &GenerateOptions::default()).unwrap();

        let item = &spec.paths["/api/users/{id}"];
        assert!(item.get.is_some());
        assert!(item.delete.is_some());
        assert_eq!(
            item.get.as_ref().unwrap().responses["200"].schema.as_ref().and_then(|s| s.ref_.as_deref()),
            Some("#/definitions/User")
        );
        assert_valid_swagger(&spec);
    }
}
