//! Port traits defined in `eventsphere-core` and satisfied by adapters in
//! other crates (or by test fakes).

pub mod alert;
pub mod credentials;

pub use alert::{AlertPermission, AlertPort, NoopAlertPort};
pub use credentials::{CredentialProvider, StaticCredentials};
