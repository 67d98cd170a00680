/// Environment-driven configuration.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
