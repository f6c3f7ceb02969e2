// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::error::{TrackmapError, TrackmapResult};
use crate::utils::logging::{LogFormat, LoggingConfig};

/// Build the filter: `RUST_LOG` wins when set, the configured level otherwise
pub fn env_filter(config: &LoggingConfig) -> TrackmapResult<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .map_err(|e| TrackmapError::Config {
                message: format!("Invalid RUST_LOG directives: {}", e),
            }),
        _ => Ok(EnvFilter::new(config.level.as_filter())),
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine readable.
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> TrackmapResult<bool> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.target)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(level = ?config.level, format = ?config.format, "Tracing initialized");
    }
    Ok(installed)
}
