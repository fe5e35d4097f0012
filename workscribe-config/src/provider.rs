//! Configuration provider using Figment

use crate::error::{ConfigError, ConfigResult};
use crate::types::TrackerConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Directory searched for configuration files
pub const CONFIG_DIR_NAME: &str = ".workscribe";

/// Base name of configuration files inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_STEM: &str = "workscribe";

/// Prefix of environment variables; `__` separates nested keys
pub const ENV_PREFIX: &str = "WORKSCRIBE_";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat {
                format: other.unwrap_or("<none>").to_string(),
            }),
        }
    }
}

/// Loads [`TrackerConfig`] from all sources.
///
/// Precedence, later overriding earlier:
/// 1. Built-in defaults
/// 2. Discovered files in `<search dir>/.workscribe/` (toml, then yaml/yml, then json)
/// 3. An explicit file passed with [`ConfigProvider::with_file`]
/// 4. `WORKSCRIBE_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    search_dir: Option<PathBuf>,
    explicit_file: Option<PathBuf>,
    skip_env: bool,
}

impl ConfigProvider {
    /// Create a provider that searches the current working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for `.workscribe/` under `dir` instead of the working directory
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Load an explicit configuration file on top of discovered ones
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Ignore environment variables (used by tests that must not see the host env)
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<TrackerConfig> {
        let config: TrackerConfig = self.build_figment()?.extract()?;
        config.validate()?;
        debug!(
            db = %config.store.path.display(),
            lock_timeout_ms = config.store.lock_timeout_ms,
            "loaded tracker configuration"
        );
        Ok(config)
    }

    fn build_figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(TrackerConfig::default()));

        for path in self.discover_files() {
            trace!("merging discovered config file {}", path.display());
            figment = merge_file(figment, &path)?;
        }

        if let Some(path) = &self.explicit_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path: path.clone() });
            }
            trace!("merging explicit config file {}", path.display());
            figment = merge_file(figment, path)?;
        }

        if !self.skip_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn discover_files(&self) -> Vec<PathBuf> {
        let base = match &self.search_dir {
            Some(dir) => dir.clone(),
            None => match std::env::current_dir() {
                Ok(dir) => dir,
                Err(_) => return Vec::new(),
            },
        };
        let dir = base.join(CONFIG_DIR_NAME);

        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            .filter(|p| p.is_file())
            .collect()
    }
}

fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    Ok(match ConfigFormat::from_path(path)? {
        ConfigFormat::Toml => figment.merge(Toml::file(path)),
        ConfigFormat::Yaml => figment.merge(Yaml::file(path)),
        ConfigFormat::Json => figment.merge(Json::file(path)),
    })
}

/// Load configuration from the working directory and environment
pub fn load_configuration() -> ConfigResult<TrackerConfig> {
    ConfigProvider::new().load()
}
