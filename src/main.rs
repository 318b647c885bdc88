use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};

use joi_router_docs::{
    loader, CollectOptions, DefaultResponses, GenerateOptions, SwaggerApi,
};

/// Generate Swagger 2.0 documents from joi-router route manifests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the Swagger document
    Generate {
        /// Document config (info, basePath, definitions, tags) as JSON or YAML
        #[arg(short, long)]
        config: String,

        /// Router manifests or directories containing them, comma separated
        #[arg(short, long, default_value = "./routes")]
        routes: String,

        /// Output directory for generated files
        #[arg(short, long, default_value = "./docs")]
        output: String,

        /// Output types to generate (json,yaml)
        #[arg(long = "ot", default_value = "json,yaml")]
        output_types: String,

        /// Prefix applied to every router instead of its own prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Do not add default responses to operations
        #[arg(long, conflicts_with = "default_responses")]
        no_default_responses: bool,

        /// JSON or YAML file with the default responses to add
        #[arg(long)]
        default_responses: Option<String>,

        /// Server URL used to fill host, schemes and basePath
        #[arg(long)]
        server_url: Option<String>,
    },

    /// List the routes that would be documented
    Routes {
        /// Router manifests or directories containing them, comma separated
        #[arg(short, long, default_value = "./routes")]
        routes: String,

        /// Prefix applied to every router instead of its own prefix
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger with appropriate verbosity level
    let env = Env::default().filter_or("RUST_LOG", if cli.verbose { "debug" } else { "info" });
    env_logger::init_from_env(env);

    debug!("Starting joi-router-docs...");

    match &cli.command {
        Commands::Generate {
            config,
            routes,
            output,
            output_types,
            prefix,
            no_default_responses,
            default_responses,
            server_url,
        } => {
            info!("Generating Swagger documentation");

            let mut document_config = loader::load_document_config(config)
                .context(format!("Failed to load document config: {}", config))?;
            if let Some(server_url) = server_url {
                document_config.apply_server_url(server_url)?;
            }

            let options = GenerateOptions {
                default_responses: match (*no_default_responses, default_responses) {
                    (true, _) => DefaultResponses::Disabled,
                    (false, Some(path)) => DefaultResponses::Provided(loader::load_output_map(path)?),
                    (false, None) => DefaultResponses::Unset,
                },
            };
            debug!("Default responses: {:?}", options.default_responses);

            let api = collect_routes(routes, prefix.as_deref())?;
            let document = api.generate_spec(&document_config, &options)?;

            let output_types: Vec<String> = split_list(output_types);
            loader::write_document(&document, output, &output_types)?;

            info!("Swagger documentation generated successfully");
        }
        Commands::Routes { routes, prefix } => {
            let api = collect_routes(routes, prefix.as_deref())?;
            for route in api.routes() {
                println!("{:<7} {}", route.method.to_string(), route.effective_path());
            }
        }
    }

    Ok(())
}

fn collect_routes(routes: &str, prefix: Option<&str>) -> Result<SwaggerApi> {
    let options = CollectOptions {
        prefix: prefix.map(str::to_string),
    };
    let mut api = SwaggerApi::new();

    for file in loader::find_router_files(&split_list(routes)[..])? {
        let router = loader::load_router(&file)?;
        api.add_router(&router, &options);
    }

    debug!("Collected {} routes", api.routes().len());
    Ok(api)
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
