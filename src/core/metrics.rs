use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder once per process. Every series carries
/// a `service` label so the API and the worker binaries can share a single
/// scrape job.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle =
        PrometheusBuilder::new().add_global_label("service", "codetrack").install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

#[cfg(test)]
mod tests {
    use super::{init, render};
    use crate::core::config::Settings;
    use crate::test_support;

    #[tokio::test]
    async fn init_is_idempotent_when_enabled() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("PROMETHEUS_ENABLED", "1");

        let settings = Settings::load().expect("settings");
        init(&settings).expect("first init");
        init(&settings).expect("second init");
        assert!(render().is_some());

        std::env::remove_var("PROMETHEUS_ENABLED");
    }
}
