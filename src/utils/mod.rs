//! Utils Module
pub mod hardening;
pub mod telemetry;
pub mod truncate;

pub use hardening::StartupChecks;
pub use telemetry::init_tracing;
pub use truncate::{truncate_chars, truncate_json, truncate_text};
