use crate::error::ConfigError;
use crate::runner::OutputMode;
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the directory the optimizer binaries live in.
pub const TOOLS_DIR_ENV: &str = "PNG_SQUEEZE_TOOLS_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Root of a bundled tool tree; `None` searches `PATH`.
    pub base_dir: Option<PathBuf>,
    /// Explicit binary per strategy, taking precedence over `base_dir`.
    pub overrides: HashMap<StrategyKind, PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub strategies: Vec<StrategyKind>,
    /// Run every strategy at once instead of one after another.
    pub parallel: bool,
    /// Where scratch directories are created; the system temp dir otherwise.
    pub work_dir: Option<PathBuf>,
    pub capture_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::ALL.to_vec(),
            parallel: true,
            work_dir: None,
            capture_output: true,
        }
    }
}

impl PipelineConfig {
    pub fn output_mode(&self) -> OutputMode {
        if self.capture_output {
            OutputMode::Captured
        } else {
            OutputMode::Inherit
        }
    }
}

impl Config {
    pub fn from_yaml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml(path, &contents)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("png-squeeze").join("config.yaml"))
    }

    /// Reads `explicit` if given, else the per-user config file if it exists,
    /// else defaults. `PNG_SQUEEZE_TOOLS_DIR` fills in a missing `base_dir`.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path).await?,
            None => match Self::default_path() {
                Some(path) if is_file(&path).await => Self::load(&path).await?,
                _ => Self::default(),
            },
        };

        if config.tools.base_dir.is_none() {
            if let Some(dir) = std::env::var_os(TOOLS_DIR_ENV) {
                config.tools.base_dir = Some(PathBuf::from(dir));
            }
        }

        Ok(config)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
