//! Session credential access.

use std::fmt;

/// Supplies the bearer token of the current session.
///
/// The engine asks on every request instead of caching, so logging out
/// elsewhere is observed on the next call. `None` means there is no
/// session.
pub trait CredentialProvider: Send + Sync + fmt::Debug + 'static {
    /// Return the current bearer token, if a session exists.
    fn bearer_token(&self) -> Option<String>;

    /// Whether a session currently exists.
    fn has_session(&self) -> bool {
        self.bearer_token().is_some()
    }
}

/// A fixed token, or a fixed absence of one.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    /// Credentials for an authenticated session.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Credentials representing a logged-out client.
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.trim().is_empty())
    }
}
