//! `reqwest` implementation of [`NotificationApi`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use eventsphere_core::config::ApiConfig;
use eventsphere_core::error::{AppError, ErrorKind};
use eventsphere_core::result::AppResult;
use eventsphere_core::traits::CredentialProvider;
use eventsphere_core::types::NotificationId;
use eventsphere_entity::notification::{Notification, UnreadCount};

use crate::api::NotificationApi;
use crate::response::extract_error_message;

/// Notifications API over HTTP with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    /// Shared connection pool.
    client: Client,
    /// API root without trailing slash.
    base_url: Url,
    /// Source of the session token.
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpNotificationApi {
    /// Build a client from the API configuration.
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialProvider>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid API base URL '{}': {e}", config.base_url),
                e,
            )
        })?;
        base_url
            .path_segments_mut()
            .map_err(|_| {
                AppError::configuration(format!(
                    "API base URL '{}' cannot carry a path",
                    config.base_url
                ))
            })?
            .pop_if_empty();

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append `segments` to the API root, percent-encoding each one so ids
    /// can never escape their path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Send a request and return the body of a 2xx response, or `None` for
    /// 204 No Content.
    async fn send(&self, method: Method, segments: &[&str]) -> AppResult<Option<String>> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or_else(|| AppError::authentication("No active session"))?;

        let url = self.url(segments);
        let logged_path = url.path().to_owned();
        let path = logged_path.as_str();

        let start = Instant::now();
        let response = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error(&method, path, e))?;

        let status = response.status();
        tracing::debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Notifications API call"
        );

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&method, path, e))?;

        if !status.is_success() {
            let message = extract_error_message(status.as_u16(), &body);
            return Err(AppError::from_status(status.as_u16(), message));
        }

        Ok(Some(body))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let path = segments.join("/");
        let body = self
            .send(Method::GET, segments)
            .await?
            .ok_or_else(|| AppError::serialization(format!("Empty response from {path}")))?;

        serde_json::from_str(&body).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Malformed response from {path}: {e}"),
                e,
            )
        })
    }

    async fn send_empty(&self, method: Method, segments: &[&str]) -> AppResult<()> {
        self.send(method, segments).await.map(|_| ())
    }
}

fn transport_error(method: &Method, path: &str, err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        format!("{method} {path} timed out")
    } else if err.is_connect() {
        format!("Could not reach the server for {method} {path}")
    } else {
        format!("{method} {path} failed: {err}")
    };
    AppError::with_source(ErrorKind::Transport, message, err)
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list(&self) -> AppResult<Vec<Notification>> {
        self.get_json(&["notifications"]).await
    }

    async fn list_unread(&self) -> AppResult<Vec<Notification>> {
        self.get_json(&["notifications", "unread"]).await
    }

    async fn unread_count(&self) -> AppResult<u64> {
        match self.get_json::<UnreadCount>(&["notifications", "count"]).await {
            Ok(body) => Ok(body.count),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Count endpoint missing, falling back to unread list length");
                Ok(self.list_unread().await?.len() as u64)
            }
            Err(e) => Err(e),
        }
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.send_empty(Method::PATCH, &["notifications", id.as_str(), "read"])
            .await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.send_empty(Method::PATCH, &["notifications", "read-all"])
            .await
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        self.send_empty(Method::DELETE, &["notifications", id.as_str()])
            .await
    }
}
