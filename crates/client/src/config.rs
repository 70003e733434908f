use std::time::Duration;

/// Default base URL of the scheduling API.
pub const DEFAULT_API_URL: &str = "https://localhost:7291/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`RotaApi`](crate::RotaApi).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `https://host/api`.
    pub api_url: String,
    /// Bearer token attached to every request when set.
    pub api_token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
