use anyhow::Context;
use clap::Parser;
use shopload::prelude::*;
#[cfg(feature = "metrics")]
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use url::Url;

/// Randomized load against the payment, order and favourite services.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the system under test.
    #[arg(long, env = "SHOPLOAD_HOST")]
    host: Url,

    /// Workload to run: combined, favourite, order or payment.
    #[arg(long, env = "SHOPLOAD_PROFILE", default_value = "combined")]
    profile: ProfileKind,

    /// Number of concurrent virtual users.
    #[arg(short, long, env = "SHOPLOAD_USERS", default_value_t = 1)]
    users: usize,

    /// Users started per second.
    #[arg(short = 'r', long, env = "SHOPLOAD_SPAWN_RATE", default_value_t = 1.)]
    spawn_rate: f64,

    /// Stop after this long (e.g. `90s`, `5m`). Runs until Ctrl-C otherwise.
    #[arg(short = 't', long, env = "SHOPLOAD_RUN_TIME", value_parser = humantime::parse_duration)]
    run_time: Option<Duration>,

    /// Seed for reproducible payloads and task choices.
    #[arg(long, env = "SHOPLOAD_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "SHOPLOAD_WAIT_MIN", default_value = "1s", value_parser = humantime::parse_duration)]
    wait_min: Duration,

    #[arg(long, env = "SHOPLOAD_WAIT_MAX", default_value = "3s", value_parser = humantime::parse_duration)]
    wait_max: Duration,

    /// Global cap on requests per second across all users.
    #[arg(long, env = "SHOPLOAD_MAX_RPS")]
    max_rps: Option<NonZeroU32>,

    /// Per-request timeout.
    #[arg(long, env = "SHOPLOAD_TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    #[arg(long, env = "SHOPLOAD_REPORT_INTERVAL", default_value = "5s", value_parser = humantime::parse_duration)]
    report_interval: Duration,

    /// Serve Prometheus metrics on this address.
    #[cfg(feature = "metrics")]
    #[arg(long, env = "SHOPLOAD_METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let wait = WaitTime::between(self.wait_min, self.wait_max)?;
        let mut config = RunConfig::new(self.host, self.profile)
            .users(self.users)
            .spawn_rate(self.spawn_rate)
            .wait(wait)
            .report_interval(self.report_interval);

        config.duration = self.run_time;
        config.seed = self.seed;
        config.max_rps = self.max_rps;
        config.timeout = self.timeout;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopload=info".into()),
        )
        .init();

    let cli = Cli::parse();

    #[cfg(feature = "metrics")]
    if let Some(addr) = cli.metrics_addr {
        install_exporter(addr)?;
    }

    let config = cli.into_config()?;
    info!("Configuration: {}", serde_json::to_string(&config)?);

    let stats = Runner::new(config)
        .context("Invalid run configuration")?
        .run()
        .await?;
    println!("{stats}");
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Unable to install Prometheus exporter")?;
    info!("Serving metrics on {addr}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use shopload_core::ConfigError;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(["shopload", "--host", "http://localhost:8080"].iter().chain(args))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_config() {
        let config = parse(&["--profile", "order", "-u", "25", "-r", "5", "-t", "5m", "--max-rps", "40"])
            .unwrap()
            .into_config()
            .unwrap();

        assert_eq!(config.profile, ProfileKind::Order);
        assert_eq!(config.users, 25);
        assert_eq!(config.spawn_rate, 5.);
        assert_eq!(config.duration, Some(Duration::from_secs(300)));
        assert_eq!(config.max_rps, NonZeroU32::new(40));
        assert_eq!(config.wait, WaitTime::default());
        assert_eq!(config.report_interval, Duration::from_secs(5));
    }

    #[test]
    fn inverted_wait_window_is_rejected() {
        let cli = parse(&["-t", "5m", "--wait-min", "2s", "--wait-max", "1s"]).unwrap();
        assert_eq!(cli.run_time, Some(Duration::from_secs(300)));

        let err = cli.into_config().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvertedWait { .. })
        ));
    }

    #[test]
    fn unknown_profile_fails_to_parse() {
        assert!(parse(&["--profile", "cart"]).is_err());
        assert!(parse(&["--max-rps", "0"]).is_err());
    }

    #[test]
    fn environment_fills_missing_flags() {
        std::env::set_var("SHOPLOAD_TIMEOUT", "750ms");
        let cli = parse(&[]).unwrap();
        std::env::remove_var("SHOPLOAD_TIMEOUT");

        assert_eq!(cli.timeout, Some(Duration::from_millis(750)));
    }
}
