//! Credential providers backed by session storage.

use std::path::PathBuf;
use std::sync::Arc;

use eventsphere_core::config::ApiConfig;
use eventsphere_core::traits::{CredentialProvider, StaticCredentials};

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV_VAR: &str = "EVENTSPHERE_TOKEN";

/// Reads the token from a file on every call, so a login or logout done
/// by another process is picked up immediately.
#[derive(Debug, Clone)]
pub struct TokenFileCredentials {
    path: PathBuf,
}

impl TokenFileCredentials {
    /// Credentials stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for TokenFileCredentials {
    fn bearer_token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                tracing::debug!("No session token at {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    /// Credentials stored in the variable `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

impl CredentialProvider for EnvCredentials {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Pick the credential source described by the configuration: the token
/// file if set, else the inline token, else [`TOKEN_ENV_VAR`].
pub fn credentials_from_config(config: &ApiConfig) -> Arc<dyn CredentialProvider> {
    if let Some(path) = &config.token_file {
        return Arc::new(TokenFileCredentials::new(path));
    }
    if let Some(token) = &config.token {
        return Arc::new(StaticCredentials::new(token.clone()));
    }
    Arc::new(EnvCredentials::default())
}
