//! Logging setup for the command-line tool.
//!
//! Log records go to stderr so that stdout stays clean for `--dry-run`
//! output. `RUST_LOG` always takes precedence over the configured filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DEFAULT_LOG_LEVEL;

/// Choose the filter directive: `RUST_LOG` if set, otherwise `debug` when
/// verbose, otherwise the configured level or the default.
pub fn filter_directive(rust_log: Option<&str>, level: Option<&str>, verbose: bool) -> String {
    match (rust_log, verbose, level) {
        (Some(env), _, _) if !env.trim().is_empty() => env.to_string(),
        (_, true, _) => "debug".to_string(),
        (_, false, Some(level)) => level.to_string(),
        _ => DEFAULT_LOG_LEVEL.to_string(),
    }
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(level: Option<&str>, verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(rust_log.as_deref(), level, verbose);
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_takes_precedence() {
        assert_eq!(
            filter_directive(Some("reqgen=trace"), Some("info"), true),
            "reqgen=trace"
        );
    }

    #[test]
    fn test_blank_rust_log_is_ignored() {
        assert_eq!(filter_directive(Some("  "), Some("info"), false), "info");
    }

    #[test]
    fn test_verbose_overrides_level() {
        assert_eq!(filter_directive(None, Some("error"), true), "debug");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(filter_directive(None, None, false), "warn");
    }
}
