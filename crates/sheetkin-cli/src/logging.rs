//! Structured logging to stderr.
//!
//! Stdout carries CSV, JSON or feature text, so every log line goes to
//! stderr.

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn filter_from_config(config: &AppConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the global subscriber.
///
/// Log level precedence (highest to lowest):
///
/// 1. CLI `--log-level`
/// 2. `SHEETKIN_LOG_LEVEL`
/// 3. `warn`
///
/// A subscriber that is already installed is kept.
pub(crate) fn init_logging(config: &AppConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    // The first subscriber wins.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn init_logging_is_idempotent() {
        let config = AppConfig::default();
        init_logging(&config);
        init_logging(&config);
    }

    #[test]
    fn filter_uses_config_log_level() {
        let config = AppConfig::default().apply_overrides(Some(LogLevel::Debug), None);
        assert_eq!(filter_from_config(&config).to_string(), "debug");
    }
}
