//! Configuration read from `SHEETKIN_*` environment variables.
//!
//! Command-line flags take precedence over the environment; see
//! [`AppConfig::apply_overrides`].

use std::str::FromStr;

use thiserror::Error;

/// Environment variable holding the log level.
pub(crate) const LOG_LEVEL_VAR: &str = "SHEETKIN_LOG_LEVEL";
/// Environment variable enabling background injection for `expand`.
pub(crate) const INJECT_BACKGROUND_VAR: &str = "SHEETKIN_INJECT_BACKGROUND";

/// Configuration errors. These exit with status 2.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Log level enumeration matching tracing crate levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LogLevel {
    /// Most verbose logging.
    Trace,
    /// Parse diagnostics and per-outline details.
    Debug,
    /// One summary line per file.
    Info,
    /// Only problems.
    #[default]
    Warn,
    /// Only failures.
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    pub(crate) const fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidConfig(format!(
            "invalid value '{value}' for {name}, expected true or false"
        ))),
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AppConfig {
    /// Log level for the stderr subscriber.
    pub log_level: LogLevel,
    /// Inline Background steps when expanding outlines.
    pub inject_background: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if a variable holds an
    /// invalid value.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Missing variables fall back to defaults.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(value) => value.parse()?,
            None => LogLevel::default(),
        };
        let inject_background = match lookup(INJECT_BACKGROUND_VAR) {
            Some(value) => parse_flag(INJECT_BACKGROUND_VAR, &value)?,
            None => false,
        };
        Ok(Self {
            log_level,
            inject_background,
        })
    }

    /// Apply command-line overrides on top of environment values.
    #[must_use]
    pub(crate) fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        inject_background: Option<bool>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if let Some(inject) = inject_background {
            self.inject_background = inject;
        }
        self
    }
}
