use std::path::Path;

use anyhow::anyhow;
use serde::Deserialize;

/// Rendering options, read from a TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub graph_name: String,
    pub table_shape: String,
    pub column_shape: Option<String>,
    pub join_edge_style: Option<String>,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Graphviz layout program, looked up on `PATH` unless absolute.
    pub command: String,
    /// Output format passed as `-T<format>`.
    pub format: String,
    /// Leave the intermediate `.dot` file next to the image.
    pub keep_dot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph_name: "UMLDiagram".to_owned(),
            table_shape: "box".to_owned(),
            column_shape: None,
            join_edge_style: None,
            renderer: RendererConfig::default(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: "dot".to_owned(),
            format: "png".to_owned(),
            keep_dot: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).map_err(|err| anyhow!("Invalid configuration: {}", err))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            anyhow!(
                "Failed to read configuration file {}",
                path.display().to_string()
            )
        })?;
        Self::from_toml_str(&content).map_err(|err| {
            anyhow!(
                "Failed to load configuration from {} due to error: {}",
                path.display(),
                err
            )
        })
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
