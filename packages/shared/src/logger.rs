//! Logging setup utilities for the ChitChat binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers this crate, the calling crate and `tower_http`, so the
/// HTTP trace layer shows up next to the application logs. The level can be
/// overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The calling crate, as seen by tracing targets (e.g. `chitchat_server`)
/// * `default_log_level` - The default log level (e.g. "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use chitchat_shared::logger::setup_logger;
///
/// setup_logger(env!("CARGO_CRATE_NAME"), "debug");
/// ```
pub fn setup_logger(crate_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                default_directives(crate_name, default_log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(crate_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},{}={},tower_http={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_log_level,
        crate_name.replace('-', "_"),
        default_log_level,
        default_log_level
    )
}
