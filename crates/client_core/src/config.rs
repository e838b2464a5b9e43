use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("processing endpoint is not configured; set IMAGE_API_URL or APP__ENDPOINT")]
    MissingEndpoint,
    #[error("invalid processing endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },
    #[error("invalid request timeout '{0}': expected whole seconds")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: Url,
    /// `None` disables the timeout.
    pub request_timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Loads settings from `client.toml` and the process environment.
pub fn load_settings() -> Result<ClientSettings, ConfigError> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional config file, then environment overrides.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let file_cfg = read_file_settings(config_path);

    let mut endpoint = file_cfg.endpoint;
    if let Some(v) = env("IMAGE_API_URL") {
        endpoint = Some(v);
    }
    if let Some(v) = env("APP__ENDPOINT") {
        endpoint = Some(v);
    }

    let mut request_timeout = match file_cfg.request_timeout_secs {
        Some(secs) => timeout_from_secs(secs),
        None => Some(DEFAULT_REQUEST_TIMEOUT),
    };
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout(v.clone()))?;
        request_timeout = timeout_from_secs(secs);
    }

    let endpoint = endpoint
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingEndpoint)?;

    Ok(ClientSettings::new(&endpoint)?.with_request_timeout(request_timeout))
}

fn read_file_settings(path: &Path) -> FileSettings {
    let Ok(raw) = fs::read_to_string(path) else {
        return FileSettings::default();
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable client config");
            FileSettings::default()
        }
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
