//! Logging setup for the HireWire binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every `hirewire_*` crate and the binary itself log at `default_log_level`.
/// `RUST_LOG` overrides the whole filter when set.
///
/// # Examples
///
/// ```no_run
/// use hirewire_shared::logger::setup_logger;
///
/// setup_logger("hirewire_server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    [
        "hirewire_shared",
        "hirewire_server",
        "hirewire_client",
        binary.as_str(),
        "tower_http",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}
