//! New-notification detection, alert formatting, and alert dispatch.

pub mod alerts;
pub mod detector;
pub mod formatter;

pub use alerts::AlertDispatcher;
pub use detector::detect_new;
pub use formatter::AlertFormatter;
