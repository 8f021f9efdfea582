//! Backend API connection settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the notification backend lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the REST API, without a trailing slash
    /// (e.g. `https://eventsphere.example.com/api`).
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
    /// Bearer token used when no token file is configured.
    #[serde(default)]
    pub token: Option<String>,
    /// File holding the bearer token of the current session. Re-read on
    /// every request so a re-login is picked up without a restart.
    #[serde(default)]
    pub token_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            token: None,
            token_file: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    15
}
