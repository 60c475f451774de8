use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_TITLE: &str = "Chat";

pub const ENDPOINT_VAR: &str = "CHAT_API_URL";
pub const TIMEOUT_VAR: &str = "CHAT_TIMEOUT_SECS";
pub const TITLE_VAR: &str = "CHAT_TITLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Values given on the command line. They take precedence over the
/// environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the chat service; requests go to `{endpoint}/chat`.
    pub endpoint: Url,
    /// Request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub title: String,
}

impl ChatConfig {
    /// Resolve the configuration from CLI overrides and the process
    /// environment.
    pub fn resolve(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    pub fn resolve_with<F>(overrides: Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = overrides
            .endpoint
            .or_else(|| lookup(ENDPOINT_VAR))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = parse_endpoint(&endpoint)?;

        let timeout = match overrides.timeout_secs {
            Some(secs) => Some(secs.to_string()),
            None => lookup(TIMEOUT_VAR).filter(|value| !value.trim().is_empty()),
        };
        let timeout = timeout.map(|value| parse_timeout(&value)).transpose()?;

        let title = overrides
            .title
            .or_else(|| lookup(TITLE_VAR))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Ok(Self {
            endpoint,
            timeout,
            title,
        })
    }

    /// Full URL of the chat route. `chat` is appended to the endpoint
    /// path; any query string stays at the end.
    pub fn chat_url(&self) -> String {
        let mut url = self.endpoint.clone();
        // Never fails for http(s) URLs
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("chat");
        }
        url.to_string()
    }
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}
