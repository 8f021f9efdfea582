//! # eventsphere-client
//!
//! Remote side of the notification engine:
//!
//! - [`NotificationApi`], the contract the sync engine consumes
//! - [`HttpNotificationApi`], its `reqwest` implementation
//! - credential providers backed by a token file or the environment

pub mod api;
pub mod http;
pub mod response;
pub mod session;

pub use api::NotificationApi;
pub use http::HttpNotificationApi;
pub use session::{EnvCredentials, TokenFileCredentials, credentials_from_config};
