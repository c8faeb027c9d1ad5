// Logging module - tracing subscriber setup
//
// Human-readable logs go to stdout. When file logging is enabled, a second
// layer writes JSON lines to a rotating file through a non-blocking writer.
//
// Precedence: RUST_LOG env var > config file > default "info"

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogRotation, LoggingConfig};

/// Default directive set for a given level
fn default_filter(level: &str) -> String {
    format!("chatgate={level},tower_http={level}")
}

/// Install the global subscriber
///
/// The returned guard must be kept alive for the duration of the program so
/// buffered file logs are flushed on exit.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.level).into());

    let (file_layer, guard) = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let file_appender = match config.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
                    }
                };

                // Writes happen on a background thread
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                // Subscriber isn't up yet
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_configured_level() {
        assert_eq!(default_filter("debug"), "chatgate=debug,tower_http=debug");
    }

    #[test]
    fn test_default_filter_parses() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(default_filter(level)).is_ok(), "{level}");
        }
    }
}
