use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::config::DocumentConfig;
use crate::models::Document;
use crate::route::{JoiRouter, OutputMap};

/// Base name of generated files (`swagger.json`, `swagger.yaml`)
const OUTPUT_BASE_NAME: &str = "swagger";

/// Read a JSON or YAML file, picking the format from the extension
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).context(format!("Failed to read file: {:?}", path))?;

    match extension(path).as_deref() {
        Some("json") => serde_json::from_str(&content)
            .context(format!("Failed to parse JSON file: {:?}", path)),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .context(format!("Failed to parse YAML file: {:?}", path)),
        _ => bail!("Unsupported file extension (expected .json, .yaml or .yml): {:?}", path),
    }
}

pub fn load_router(path: impl AsRef<Path>) -> Result<JoiRouter> {
    let path = path.as_ref();
    let router: JoiRouter = load_file(path)?;
    debug!("Loaded {} route records from {:?}", router.routes.len(), path);
    Ok(router)
}

pub fn load_document_config(path: impl AsRef<Path>) -> Result<DocumentConfig> {
    load_file(path)
}

/// Load a `status code -> response` map used as default responses
pub fn load_output_map(path: impl AsRef<Path>) -> Result<OutputMap> {
    load_file(path)
}

/// Find router manifests under the given files or directories.
///
/// Directories are walked recursively; results are sorted so collection
/// order, and with it duplicate-route resolution, is stable.
pub fn find_router_files(locations: &[impl AsRef<Path>]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for location in locations {
        let location = location.as_ref();
        if location.is_file() {
            files.push(location.to_path_buf());
            continue;
        }
        if !location.is_dir() {
            bail!("Route location does not exist: {:?}", location);
        }

        debug!("Scanning for router manifests in directory: {}", location.display());
        let mut found: Vec<PathBuf> = WalkDir::new(location)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| matches!(extension(p).as_deref(), Some("json" | "yaml" | "yml")))
            .collect();
        found.sort();
        files.extend(found);
    }

    debug!("Found {} router manifests", files.len());
    Ok(files)
}

/// Write `document` to `output_dir` in each requested format (`json`, `yaml`)
pub fn write_document(
    document: &Document,
    output_dir: impl AsRef<Path>,
    output_types: &[String],
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::new();
    for output_type in output_types {
        let (content, file_ext) = match output_type.as_str() {
            "json" => (
                serde_json::to_string_pretty(document)
                    .context("Failed to serialize Swagger document to JSON")?,
                "json",
            ),
            "yaml" | "yml" => (
                serde_yaml::to_string(document)
                    .context("Failed to serialize Swagger document to YAML")?,
                "yaml",
            ),
            other => bail!("Unknown output type: {}", other),
        };

        let file_path = output_dir.join(format!("{}.{}", OUTPUT_BASE_NAME, file_ext));
        let mut file = File::create(&file_path)
            .context(format!("Failed to create file: {:?}", file_path))?;
        file.write_all(content.as_bytes())
            .context(format!("Failed to write to file: {:?}", file_path))?;

        info!("Generated file: {:?}", file_path);
        written.push(file_path);
    }

    Ok(written)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
