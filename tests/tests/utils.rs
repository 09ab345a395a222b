use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use mock_service::MockConfig;
use shopload::prelude::*;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install logging and a Prometheus recorder once per test binary.
#[allow(unused)]
pub fn init() -> &'static PrometheusHandle {
    static ONCE_LOCK: OnceLock<PrometheusHandle> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("shopload=debug,mock_service=debug"))
            .with_test_writer()
            .try_init();

        PrometheusBuilder::new()
            .install_recorder()
            .expect("metrics recorder already installed")
    })
}

/// Start a fresh mock service and return its base URL.
#[allow(unused)]
pub async fn mock(config: MockConfig) -> url::Url {
    let addr = mock_service::spawn(config)
        .await
        .expect("mock service failed to bind");
    format!("http://{addr}").parse().expect("valid mock url")
}

/// Short waits and a short run, suitable for tests.
#[allow(unused)]
pub fn quick(host: url::Url, kind: ProfileKind) -> RunConfig {
    RunConfig::new(host, kind)
        .users(4)
        .spawn_rate(20.)
        .wait(WaitTime::between(Duration::from_millis(10), Duration::from_millis(30)).unwrap())
        .duration(Duration::from_secs(2))
        .report_interval(Duration::from_millis(500))
        .timeout(Duration::from_secs(2))
        .seed(7)
}
