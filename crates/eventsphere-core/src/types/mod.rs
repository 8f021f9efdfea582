//! Core type definitions used across the EventSphere workspace.

pub mod id;

pub use id::*;
