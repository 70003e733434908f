use std::time::Duration;

use rota_client::config::{ClientConfig, DEFAULT_API_URL};
use rota_core::error::CoreError;
use rota_editor::EditorConfig;

/// Binary configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                       |
    /// |-----------------------------|-------------------------------|
    /// | `ROTA_API_URL`              | `https://localhost:7291/api`  |
    /// | `ROTA_API_TOKEN`            | unset                         |
    /// | `ROTA_REQUEST_TIMEOUT_SECS` | `30`                          |
    /// | `ROTA_SAVE_STEP_DELAY_MS`   | `150`                         |
    /// | `ROTA_TOAST_TIMEOUT_MS`     | `7000` (`0` keeps toasts)     |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let api_url = lookup("ROTA_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let api_token = lookup("ROTA_API_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let request_timeout_secs = parse_u64(&lookup, "ROTA_REQUEST_TIMEOUT_SECS", 30)?;
        let save_step_delay_ms = parse_u64(&lookup, "ROTA_SAVE_STEP_DELAY_MS", 150)?;
        let toast_timeout_ms = parse_u64(&lookup, "ROTA_TOAST_TIMEOUT_MS", 7000)?;

        let mut client = ClientConfig::new(api_url);
        client.api_token = api_token;
        client.request_timeout = Duration::from_secs(request_timeout_secs);

        Ok(Self {
            client,
            editor: EditorConfig {
                save_step_delay: Duration::from_millis(save_step_delay_ms),
                toast_timeout: Duration::from_millis(toast_timeout_ms),
            },
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<u64, CoreError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("{name} must be a valid u64, got '{raw}'"))),
    }
}
