use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RelayError;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_WEBSOCKET_PATH: &str = "/ws";
const DEFAULT_HTTP_PATH: &str = "/log";
const DEFAULT_WORKERS: usize = 5;
const DEFAULT_QUEUE_CAPACITY: usize = 1000;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Path reserved for the health endpoint.
pub const HEALTH_PATH: &str = "/v1/health";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub port: u16,
    #[serde(default = "default_websocket_path")]
    pub websocket_path: String,
    #[serde(default = "default_http_path")]
    pub http_path: String,
    #[serde(default)]
    pub users: Vec<UserSettings>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub outputs: Vec<SinkSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSettings {
    pub username: String,
    pub password: String,
}

/// One entry of the `outputs` list, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SinkSettings {
    #[serde(rename = "stdout")]
    Stdout { level: i64 },

    #[serde(rename = "fileout")]
    File { level: i64, path: PathBuf },

    /// Chat-bot notifications. `chats` maps chat id to that chat's own threshold.
    #[serde(rename = "TGBot")]
    Telegram {
        #[serde(rename = "API_KEY")]
        api_key: String,
        #[serde(default)]
        chats: BTreeMap<i64, i64>,
        #[serde(default = "default_telegram_api_url")]
        api_url: String,
    },

    #[serde(rename = "Elastic")]
    Elastic {
        level: i64,
        host: String,
        index: String,
        #[serde(default)]
        login: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

fn default_websocket_path() -> String {
    DEFAULT_WEBSOCKET_PATH.to_string()
}

fn default_http_path() -> String {
    DEFAULT_HTTP_PATH.to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

impl Settings {
    /// Parse settings from a YAML document without validating them.
    pub fn from_yaml(contents: &str) -> Result<Self, RelayError> {
        serde_yaml::from_str(contents).map_err(|e| RelayError::Config(e.to_string()))
    }

    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<(), RelayError> {
        validate_port(self.port)?;
        validate_route(&self.http_path)?;
        validate_route(&self.websocket_path)?;
        if self.http_path == self.websocket_path {
            return Err(RelayError::Config(
                "http_path and websocket_path must differ".into(),
            ));
        }
        if self.workers == 0 {
            return Err(RelayError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(RelayError::Config(
                "queue_capacity must be at least 1".into(),
            ));
        }
        validate_users(&self.users)?;
        for output in &self.outputs {
            output.validate()?;
        }
        Ok(())
    }
}

impl SinkSettings {
    fn validate(&self) -> Result<(), RelayError> {
        match self {
            Self::Stdout { .. } | Self::Telegram { .. } => Ok(()),
            Self::File { path, .. } => {
                if path.as_os_str().is_empty() {
                    return Err(RelayError::Config("fileout path cannot be empty".into()));
                }
                Ok(())
            }
            Self::Elastic { host, index, .. } => {
                validate_host(host)?;
                if index.trim().is_empty() {
                    return Err(RelayError::Config("Elastic index cannot be empty".into()));
                }
                Ok(())
            }
        }
    }
}

/// Validates that the host is not empty or whitespace-only.
fn validate_host(host: &str) -> Result<(), RelayError> {
    if host.trim().is_empty() {
        return Err(RelayError::Config("Host cannot be empty".into()));
    }
    Ok(())
}

/// Validates that the port is in valid range (1-65535).
fn validate_port(port: u16) -> Result<(), RelayError> {
    if port == 0 {
        return Err(RelayError::Config("Port cannot be 0".into()));
    }
    Ok(())
}

/// Ingress paths are registered as literal routes.
fn validate_route(path: &str) -> Result<(), RelayError> {
    if !path.starts_with('/') {
        return Err(RelayError::Config(format!(
            "Path {path:?} must start with '/'"
        )));
    }
    if path == HEALTH_PATH {
        return Err(RelayError::Config(format!("Path {path:?} is reserved")));
    }
    let has_capture = path.contains(['{', '}'])
        || path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
    if has_capture {
        return Err(RelayError::Config(format!(
            "Path {path:?} must not contain route parameters"
        )));
    }
    Ok(())
}

fn validate_users(users: &[UserSettings]) -> Result<(), RelayError> {
    let mut seen = HashSet::new();
    for user in users {
        if user.username.trim().is_empty() {
            return Err(RelayError::Config("Username cannot be empty".into()));
        }
        if !seen.insert(user.username.as_str()) {
            return Err(RelayError::Config(format!(
                "Duplicate user {:?}",
                user.username
            )));
        }
    }
    Ok(())
}

/// Resolve the configuration path: first CLI argument, then `RELAY_CONFIG`,
/// then `config.yaml` in the working directory.
pub fn config_path() -> PathBuf {
    if let Some(arg) = env::args().nth(1) {
        return PathBuf::from(arg);
    }
    env::var("RELAY_CONFIG")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

pub fn get_configuration(path: &Path) -> Result<Settings, RelayError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("failed to read {}: {e}", path.display())))?;
    let mut settings = Settings::from_yaml(&contents)?;

    if let Ok(raw) = env::var("HTTP_PORT") {
        settings.port = raw
            .parse::<u16>()
            .map_err(|e| RelayError::Config(format!("invalid HTTP_PORT {raw:?}: {e}")))?;
    }

    // Validate settings before returning
    settings.validate()?;

    Ok(settings)
}
