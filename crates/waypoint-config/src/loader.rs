//! Configuration loader.
//!
//! [`ConfigLoader`] layers, later layers overriding earlier ones:
//! 1. Default values (every flag off)
//! 2. An optional TOML file
//! 3. Variables from a `.env` file
//! 4. Process environment variables
//!
//! The `.env` file is read without touching the process environment.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{ConfigError, ConfigResult, WaypointConfig};

/// Default prefix for environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "WAYPOINT";

/// Default env file location.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use waypoint_config::ConfigLoader;
///
/// # fn main() -> Result<(), waypoint_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("waypoint.toml")?
///     .with_dotenv()
///     .load()?;
///
/// if config.trace_request {
///     println!("request tracing enabled");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: WaypointConfig,
    env_prefix: String,
    env_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from [`WaypointConfig::default`], reading
    /// variables prefixed with `WAYPOINT_`.
    ///
    /// ```
    /// use waypoint_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().load_from_vars(Vec::<(String, String)>::new());
    /// assert!(!config.dev);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: WaypointConfig::default(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env_file: None,
        }
    }

    /// Start from the given configuration instead of the defaults.
    #[must_use]
    pub fn with_base(mut self, config: WaypointConfig) -> Self {
        self.config = config;
        self
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read, or
    /// is not a valid configuration.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.with_string(&content)
    }

    /// Load a TOML file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// ```
    /// use waypoint_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("trace_request = true")
    ///     .unwrap()
    ///     .load_from_vars(Vec::<(String, String)>::new());
    ///
    /// assert!(config.trace_request);
    /// ```
    pub fn with_string(mut self, content: &str) -> ConfigResult<Self> {
        self.config = toml::from_str(content)?;
        Ok(self)
    }

    /// Set the environment variable prefix (`PREFIX_DEV`, `PREFIX_TRACE_REQUEST`).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.trim_end_matches('_').to_uppercase();
        self
    }

    /// Read variables from `./.env` when it exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        self.with_dotenv_file(DEFAULT_ENV_FILE)
    }

    /// Read variables from the given env file when it exists.
    #[must_use]
    pub fn with_dotenv_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Finalize using the env file (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the env file exists but is malformed.
    pub fn load(self) -> ConfigResult<WaypointConfig> {
        let mut vars = match &self.env_file {
            Some(path) => read_env_file(path)?,
            None => HashMap::new(),
        };
        vars.extend(env::vars());

        Ok(self.load_from_vars(vars))
    }

    /// Finalize using an explicit set of variables instead of the environment.
    #[must_use]
    pub fn load_from_vars<I, K, V>(mut self, vars: I) -> WaypointConfig
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let dev_key = format!("{}_DEV", self.env_prefix);
        let trace_key = format!("{}_TRACE_REQUEST", self.env_prefix);

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let slot = if key == dev_key {
                &mut self.config.dev
            } else if key == trace_key {
                &mut self.config.trace_request
            } else {
                continue;
            };

            *slot = parse_bool(value).unwrap_or_else(|| {
                warn!(var = key, value, "non-boolean configuration value, using false");
                false
            });
        }

        debug!(dev = self.config.dev, trace_request = self.config.trace_request, "configuration loaded");
        self.config
    }
}

fn read_env_file(path: &Path) -> ConfigResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::env_file(path, e))?;
    iter.map(|item| item.map_err(|e| ConfigError::env_file(path, e)))
        .collect()
}

/// Parse a boolean flag, case-insensitively.
///
/// Accepts `true`/`false`, `t`/`f` and `1`/`0`.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}
