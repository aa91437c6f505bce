//! Logging and tracing configuration
//!
//! Logs go to stderr so the submission report on stdout stays parseable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter used when `RUST_LOG` is unset
///
/// `verbosity` applies to this crate, dependencies stay at WARN.
pub fn default_filter(verbosity: &str) -> String {
    let level = match verbosity.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "fatal" | "panic" => "error",
        _ => "info",
    };
    format!("genesis={},warn", level)
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable, falling back
/// to the configured verbosity.
pub fn init_cli(verbosity: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter("INFO"), "genesis=info,warn");
        assert_eq!(default_filter("Debug"), "genesis=debug,warn");
        assert_eq!(default_filter("fatal"), "genesis=error,warn");
        assert_eq!(default_filter("nonsense"), "genesis=info,warn");
    }
}
