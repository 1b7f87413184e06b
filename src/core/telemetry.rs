use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Installs the global subscriber. RUST_LOG takes precedence over the
/// configured level so verbosity can be raised per target at runtime.
pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();

    let subscriber = fmt()
        .with_env_filter(build_env_filter(&telemetry.log_level))
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let installed =
        if telemetry.json { subscriber.json().try_init() } else { subscriber.try_init() };

    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::build_env_filter;
    use crate::test_support;

    #[tokio::test]
    async fn filter_falls_back_to_configured_level() {
        let _guard = test_support::env_lock().await;
        std::env::remove_var("RUST_LOG");

        assert_eq!(build_env_filter("warn").to_string(), "warn");
    }

    #[tokio::test]
    async fn rust_log_overrides_configured_level() {
        let _guard = test_support::env_lock().await;
        std::env::set_var("RUST_LOG", "debug");

        assert_eq!(build_env_filter("warn").to_string(), "debug");
        std::env::remove_var("RUST_LOG");
    }
}
