use crate::config::HEALTH_PATH;
use reqwest::StatusCode;
use std::time::Duration;

/// Default HTTP port for health checks
const DEFAULT_HTTP_PORT: u16 = 9600;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum HealthcheckError {
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("health endpoint returned status: {0}")]
    Status(StatusCode),
}

/// Pick the port to probe: explicit argument, then `HTTP_PORT`, then 9600.
pub fn resolve_port(arg: Option<&str>, env_port: Option<&str>) -> Result<u16, HealthcheckError> {
    match arg.or(env_port) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| HealthcheckError::InvalidPort(raw.to_string())),
        None => Ok(DEFAULT_HTTP_PORT),
    }
}

/// Probe the local relay, taking the port from `arg` or the environment.
pub async fn healthcheck_from_arg(arg: Option<&str>) -> Result<(), HealthcheckError> {
    let env_port = std::env::var("HTTP_PORT").ok();
    healthcheck_with_port(resolve_port(arg, env_port.as_deref())?).await
}

/// Perform a health check against the default port
pub async fn healthcheck() -> Result<(), HealthcheckError> {
    healthcheck_from_arg(None).await
}

/// Perform a health check against a specific port
pub async fn healthcheck_with_port(port: u16) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(HealthcheckError::Client)?;

    let url = format!("http://127.0.0.1:{port}{HEALTH_PATH}");
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(HealthcheckError::Request)?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(HealthcheckError::Status(resp.status()))
    }
}
