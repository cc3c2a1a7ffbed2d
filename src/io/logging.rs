//! Diagnostic logging for the `td` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. Output goes to stderr so stdout stays clean for ids and
//! `--json` payloads.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive (e.g. `debug`, `taskdesk=info`)
pub const LOG_ENV: &str = "TASKDESK_LOG";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the stderr subscriber once. `TASKDESK_LOG` overrides `default_level`.
pub fn init(default_level: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directive = filter_directive(std::env::var(LOG_ENV).ok(), default_level);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .without_time()
                .with_filter(filter),
        );

        // A subscriber may already be set (tests, embedding hosts)
        if subscriber.try_init().is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

fn filter_directive(env: Option<String>, default_level: &str) -> String {
    match env {
        Some(value) if !value.trim().is_empty() => value,
        _ => default_level.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_config_level() {
        assert_eq!(filter_directive(Some("debug".into()), "warn"), "debug");
        assert_eq!(filter_directive(Some("  ".into()), "warn"), "warn");
        assert_eq!(filter_directive(None, "info"), "info");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
