//! Configuration loading for JFramework
//!
//! A [`FrameworkConfig`] is assembled from layers, later ones overriding
//! earlier ones key by key:
//!
//! 1. built-in defaults
//! 2. configuration files (JSON, TOML or `.env` syntax), in the order added
//! 3. a `.env` file, if requested
//! 4. the process environment, if requested
//!
//! Environment keys use a prefix (default `JFRAMEWORK`) and `__` for
//! nesting, so `JFRAMEWORK_ARCHITECTURE__INIT_FAILURE=continue` sets
//! `architecture.init_failure`.
//!
//! ```no_run
//! use jframework_config::FrameworkConfig;
//!
//! let config = FrameworkConfig::builder()
//!     .add_file("jframework.toml")
//!     .load_dotenv(None)
//!     .load_env()
//!     .build()?;
//!
//! let _guard = config.log_config().init();
//! println!("starting {}", config.architecture.name);
//! # Ok::<(), jframework_config::ConfigError>(())
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat, merge_values};
pub use validation::{ConfigValidator, Validate};

use jframework_architecture::{Architecture, ArchitectureConfig, ArchitectureSetup};
use jframework_core::logging::{LogConfig, LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Logging section of [`FrameworkConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Raise the level to at least `debug`
    pub debug: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            debug: false,
        }
    }
}

/// Complete framework configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub architecture: ArchitectureConfig,
    pub log: LogSettings,
}

impl FrameworkConfig {
    pub fn builder() -> FrameworkConfigBuilder {
        FrameworkConfigBuilder::new()
    }

    /// Defaults overlaid with a single file, format taken from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().add_file(path).build()
    }

    /// Defaults overlaid with `JFRAMEWORK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().load_env().build()
    }

    pub fn architecture_config(&self) -> ArchitectureConfig {
        self.architecture.clone()
    }

    pub fn log_config(&self) -> LogConfig {
        let level = match self.log.level {
            LogLevel::Info | LogLevel::Warn | LogLevel::Error if self.log.debug => LogLevel::Debug,
            level => level,
        };
        LogConfig::new().level(level).format(self.log.format)
    }

    /// Create an architecture named and tuned by this configuration
    pub fn create_architecture(
        &self,
        setup: impl ArchitectureSetup + 'static,
    ) -> Arc<Architecture> {
        Architecture::with_config(setup, self.architecture_config())
    }
}

impl Validate for FrameworkConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.architecture.name, "architecture.name")
    }
}

/// Builder layering the configuration sources
pub struct FrameworkConfigBuilder {
    files: Vec<(PathBuf, Option<FileFormat>)>,
    dotenv: Option<Option<PathBuf>>,
    load_env: bool,
    env_prefix: String,
}

impl FrameworkConfigBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            dotenv: None,
            load_env: false,
            env_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Add a configuration file, format detected from its extension
    pub fn add_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push((path.as_ref().to_path_buf(), None));
        self
    }

    pub fn add_file_with_format(mut self, path: impl AsRef<Path>, format: FileFormat) -> Self {
        self.files.push((path.as_ref().to_path_buf(), Some(format)));
        self
    }

    /// Read a `.env` file. With `None` the usual lookup is used and a
    /// missing file is not an error.
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.dotenv = Some(path);
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Set the environment variable prefix used by `.env` and env layers
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge every layer, deserialize and validate
    pub fn build(self) -> Result<FrameworkConfig> {
        let env_loader = EnvLoader::new(self.env_prefix.clone());
        let mut tree = serde_json::to_value(FrameworkConfig::default())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        for (path, format) in &self.files {
            let loader = match format {
                Some(format) => ConfigLoader::new(*format),
                None => ConfigLoader::auto(path)?,
            };
            let value = loader.load_file(path)?;
            let value = if loader.format() == FileFormat::Env {
                env_table(&env_loader, value)
            } else {
                value
            };
            merge_values(&mut tree, value);
        }

        if let Some(path) = &self.dotenv {
            let pairs = read_dotenv(path.as_deref())?;
            merge_values(&mut tree, env_loader.collect_pairs(pairs));
        }

        if self.load_env {
            merge_values(&mut tree, env_loader.load());
        }

        let config: FrameworkConfig = serde_json::from_value(tree)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        config.validate()?;

        debug!(
            architecture = %config.architecture.name,
            init_failure = config.architecture.init_failure.as_str(),
            files = self.files.len(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

impl Default for FrameworkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-key a flat `.env`-style table through the env nesting rules
fn env_table(loader: &EnvLoader, value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pairs = map.into_iter().filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                _ => None,
            });
            loader.collect_pairs(pairs)
        }
        other => other,
    }
}

fn read_dotenv(path: Option<&Path>) -> Result<Vec<(String, String)>> {
    let iter = match path {
        Some(path) => dotenvy::from_path_iter(path),
        None => dotenvy::dotenv_iter(),
    };
    let iter = match iter {
        Ok(iter) => iter,
        Err(e) if path.is_none() && e.not_found() => {
            debug!("No .env file found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ConfigError::LoadError(e.to_string())),
    };
    iter.map(|item| item.map_err(|e| ConfigError::ParseError(e.to_string())))
        .collect()
}
