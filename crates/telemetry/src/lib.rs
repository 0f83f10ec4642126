//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use shelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the event filter; `RUST_LOG` wins over the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .map_err(|err| anyhow!("invalid telemetry filter '{}': {}", settings.filter, err)),
    }
}

/// Install the global tracing subscriber. Fails if one is already set.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;

    tracing::info!(
        target: "shelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}
