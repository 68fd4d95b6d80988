//! Client configuration file and environment variable support.
//!
//! Configuration is read from an optional `skyquery.toml`:
//!
//! ```toml
//! timeout_secs = 120
//!
//! [exoplanet]
//! url_api = "https://exoplanetarchive.ipac.caltech.edu/cgi-bin/nstedAPI/nph-nstedAPI"
//! url_tap = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync"
//!
//! [esasky]
//! row_limit = 500
//!
//! [replay]
//! generate_env_var = "NASA_EXOPLANET_ARCHIVE_GENERATE_RESPONSES"
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::QueryError;

pub const DEFAULT_EXOPLANET_API_URL: &str =
    "https://exoplanetarchive.ipac.caltech.edu/cgi-bin/nstedAPI/nph-nstedAPI";
pub const DEFAULT_EXOPLANET_TAP_URL: &str = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync";
pub const DEFAULT_ESASKY_TAP_URL: &str = "https://sky.esa.int/esasky-tap/tap/sync";
pub const DEFAULT_ESASKY_CATALOGS_URL: &str = "https://sky.esa.int/esasky-tap/catalogs";
pub const DEFAULT_GENERATE_ENV_VAR: &str = "NASA_EXOPLANET_ARCHIVE_GENERATE_RESPONSES";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub exoplanet: ExoplanetSettings,
    #[serde(default)]
    pub esasky: EsaSkySettings,
    #[serde(default)]
    pub replay: ReplaySettings,
}

/// NASA Exoplanet Archive endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExoplanetSettings {
    #[serde(default = "default_exoplanet_api_url")]
    pub url_api: String,
    #[serde(default = "default_exoplanet_tap_url")]
    pub url_tap: String,
}

/// ESASky endpoints and query limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsaSkySettings {
    #[serde(default = "default_esasky_tap_url")]
    pub url_tap: String,
    #[serde(default = "default_esasky_catalogs_url")]
    pub url_catalogs: String,
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
}

/// Fixture replay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Environment variable whose presence turns on fixture generation.
    #[serde(default = "default_generate_env_var")]
    pub generate_env_var: String,
    /// Index file name inside the fixture directory.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_user_agent() -> String {
    format!("skyquery/{}", env!("CARGO_PKG_VERSION"))
}

fn default_exoplanet_api_url() -> String {
    DEFAULT_EXOPLANET_API_URL.to_string()
}

fn default_exoplanet_tap_url() -> String {
    DEFAULT_EXOPLANET_TAP_URL.to_string()
}

fn default_esasky_tap_url() -> String {
    DEFAULT_ESASKY_TAP_URL.to_string()
}

fn default_esasky_catalogs_url() -> String {
    DEFAULT_ESASKY_CATALOGS_URL.to_string()
}

fn default_row_limit() -> u32 {
    10_000
}

fn default_generate_env_var() -> String {
    DEFAULT_GENERATE_ENV_VAR.to_string()
}

fn default_index_file() -> String {
    "responses.json".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            exoplanet: ExoplanetSettings::default(),
            esasky: EsaSkySettings::default(),
            replay: ReplaySettings::default(),
        }
    }
}

impl Default for ExoplanetSettings {
    fn default() -> Self {
        Self {
            url_api: default_exoplanet_api_url(),
            url_tap: default_exoplanet_tap_url(),
        }
    }
}

impl Default for EsaSkySettings {
    fn default() -> Self {
        Self {
            url_tap: default_esasky_tap_url(),
            url_catalogs: default_esasky_catalogs_url(),
            row_limit: default_row_limit(),
        }
    }
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            generate_env_var: default_generate_env_var(),
            index_file: default_index_file(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` if successful
    /// * `Err(QueryError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QueryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            QueryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, QueryError> {
        toml::from_str(content).map_err(|e| {
            QueryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `skyquery.toml` in the current directory and in `backend/`.
    /// Falls back to the built-in defaults when neither exists.
    pub fn from_default_location() -> Result<Self, QueryError> {
        let search_paths = [
            PathBuf::from("skyquery.toml"),
            PathBuf::from("backend/skyquery.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Apply environment variable overrides on top of this configuration.
    ///
    /// # Environment Variables
    /// - `SKYQUERY_EXOPLANET_API_URL`: legacy API endpoint
    /// - `SKYQUERY_EXOPLANET_TAP_URL`: exoplanet TAP sync endpoint
    /// - `SKYQUERY_ESASKY_TAP_URL`: ESASky TAP sync endpoint
    /// - `SKYQUERY_ESASKY_CATALOGS_URL`: ESASky catalog metadata endpoint
    /// - `SKYQUERY_TIMEOUT_SECS`: HTTP timeout in seconds
    /// - `SKYQUERY_USER_AGENT`: User-Agent header
    ///
    /// # Errors
    /// Returns an error if `SKYQUERY_TIMEOUT_SECS` is not a valid number.
    pub fn with_env_overrides(mut self) -> Result<Self, QueryError> {
        if let Ok(url) = env::var("SKYQUERY_EXOPLANET_API_URL") {
            self.exoplanet.url_api = url;
        }
        if let Ok(url) = env::var("SKYQUERY_EXOPLANET_TAP_URL") {
            self.exoplanet.url_tap = url;
        }
        if let Ok(url) = env::var("SKYQUERY_ESASKY_TAP_URL") {
            self.esasky.url_tap = url;
        }
        if let Ok(url) = env::var("SKYQUERY_ESASKY_CATALOGS_URL") {
            self.esasky.url_catalogs = url;
        }
        if let Ok(timeout) = env::var("SKYQUERY_TIMEOUT_SECS") {
            self.timeout_secs = timeout.parse().map_err(|_| {
                QueryError::configuration("SKYQUERY_TIMEOUT_SECS must be a whole number of seconds")
            })?;
        }
        if let Ok(agent) = env::var("SKYQUERY_USER_AGENT") {
            self.user_agent = agent;
        }
        Ok(self)
    }

    /// Default location plus environment overrides.
    pub fn from_env() -> Result<Self, QueryError> {
        Self::from_default_location()?.with_env_overrides()
    }
}
