use super::types::{EndpointDefinition, ProjectConfig};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supplies full configuration snapshots, on startup and on every refresh.
///
/// A source always returns the whole configuration; the catalog never merges
/// partial updates.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> anyhow::Result<ProjectConfig>;
}

impl<F> ConfigSource for F
where
    F: Fn() -> anyhow::Result<ProjectConfig> + Send + Sync,
{
    fn load(&self) -> anyhow::Result<ProjectConfig> {
        self()
    }
}

/// Reads the project configuration from a YAML (or JSON) file on disk.
#[derive(Debug, Clone)]
pub struct YamlConfigSource {
    path: PathBuf,
}

impl YamlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for YamlConfigSource {
    fn load(&self) -> anyhow::Result<ProjectConfig> {
        load_config(&self.path)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Load a project configuration file and every endpoint file it references.
///
/// Endpoint files are resolved relative to the directory of the main file and
/// appended after the inline endpoints, in the order they are listed.
pub fn load_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let parsed: anyhow::Result<ProjectConfig> = if is_json(path) {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_yaml::from_str(&content).map_err(anyhow::Error::from)
    };
    let mut config =
        parsed.with_context(|| format!("failed to parse config file {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    for file in std::mem::take(&mut config.endpoint_files) {
        let endpoint_path = base_dir.join(&file);
        let endpoint = load_endpoint(&endpoint_path)?;
        debug!(
            file = %endpoint_path.display(),
            url_path = %endpoint.url_path,
            "Endpoint file loaded"
        );
        config.endpoints.push(endpoint);
    }

    info!(
        config_file = %path.display(),
        project = %config.project.project_name,
        endpoints_count = config.endpoints.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load a single endpoint definition file.
pub fn load_endpoint(path: &Path) -> anyhow::Result<EndpointDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read endpoint file {}", path.display()))?;
    let endpoint = if is_json(path) {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_yaml::from_str(&content).map_err(anyhow::Error::from)
    };
    endpoint.with_context(|| format!("failed to parse endpoint file {}", path.display()))
}
