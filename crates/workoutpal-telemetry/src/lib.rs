//! Logging for WorkoutPal
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a `fmt`
//! layer in text or JSON form

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use workoutpal_config::{LogFormat, TelemetryConfig};

/// Initialize logging from configuration
///
/// Filter directives come from `RUST_LOG` when set, then from the config
/// file, then from `default_filter`. Invalid directives fall back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directives(config, default_filter)).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Pick the filter directives to use
fn filter_directives(config: &TelemetryConfig, default_filter: &str) -> String {
    std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| config.filter.clone())
        .unwrap_or_else(|| default_filter.to_owned())
}
