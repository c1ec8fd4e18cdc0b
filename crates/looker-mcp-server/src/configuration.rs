use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Process settings for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where `POST /mcp` is forwarded; unset means the endpoint answers 503.
    #[serde(default)]
    pub toolbox_url: Option<String>,
    #[serde(default)]
    pub log_format: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Settings {
    /// Reads `HOST`, `PORT`, `TOOLBOX_URL` and `LOG_FORMAT` from the process
    /// environment.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder().add_source(environment).build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.toolbox_url = settings.toolbox_url.filter(|url| !url.trim().is_empty());
        Ok(settings)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

/// Credentials and connection options for the Looker instance the toolbox
/// talks to. Loaded once at startup from `LOOKER_*` variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LookerConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_verify_ssl() -> bool {
    true
}

fn default_api_version() -> String {
    "4.0".to_string()
}

impl Default for LookerConfig {
    fn default() -> Self {
        LookerConfig {
            base_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            verify_ssl: default_verify_ssl(),
            api_version: default_api_version(),
        }
    }
}

impl LookerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix("LOOKER"))
    }

    /// Same as `from_env` but reads from `vars` (keys as in the environment,
    /// e.g. `LOOKER_BASE_URL`).
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix("LOOKER").source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder().add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Checks every required field and reports all of the missing ones at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("LOOKER_BASE_URL", &self.base_url),
            ("LOOKER_CLIENT_ID", &self.client_id),
            ("LOOKER_CLIENT_SECRET", &self.client_secret),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingFields(missing))
        }
    }
}
