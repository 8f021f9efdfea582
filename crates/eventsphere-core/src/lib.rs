//! # eventsphere-core
//!
//! Core crate for the EventSphere notification client. Contains the
//! configuration schemas, typed identifiers, the injected port traits
//! (credentials and platform alerts), and the unified error system.
//!
//! This crate has **no** internal dependencies on other EventSphere crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
