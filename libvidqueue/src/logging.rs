//! Logging setup for vidqueue binaries
//!
//! The library only emits `tracing` events. A binary installs one
//! subscriber at startup, writing to stderr so stdout stays free for
//! session output.
//!
//! A bare level such as `debug` applies to the vidqueue crates only; sqlx
//! and the other dependencies stay at `warn` so per-query chatter does not
//! bury store events. A full `EnvFilter` directive (anything with `=` or a
//! `,`) is passed through untouched, and `RUST_LOG` wins over both.
//!
//! ```no_run
//! use libvidqueue::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Crates whose level follows the configured one
const OWN_TARGETS: [&str; 2] = ["libvidqueue", "vq_session"];

const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain lines without colors
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line with colors and source locations
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for the vidqueue crates, or a complete filter directive
    pub level: String,
    /// Forces `debug` for the vidqueue crates
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read `VIDQUEUE_LOG_FORMAT` and `VIDQUEUE_LOG_LEVEL`; text at `warn`
    /// when unset or unparseable
    pub fn from_env() -> Self {
        let format = std::env::var("VIDQUEUE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let level = std::env::var("VIDQUEUE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
        Self::new(format, level, false)
    }

    /// Filter directive used when `RUST_LOG` is unset
    fn directive(&self) -> String {
        let level = if self.verbose { "debug" } else { self.level.trim() };
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }

        let mut directive = DEPENDENCY_LEVEL.to_string();
        for target in OWN_TARGETS {
            directive.push_str(&format!(",{}={}", target, level));
        }
        directive
    }

    /// Install the global subscriber.
    ///
    /// Returns `false` when one was already installed (tests, embedding
    /// applications); the existing subscriber is left alone.
    pub fn init(&self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directive()));

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_current_span(false)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .try_init(),
        };
        installed.is_ok()
    }
}
