//! Spawns virtual users and collects run statistics.
use crate::collector::Collector;
use crate::error::RunError;
use crate::measurement::Measurement;
use crate::profile::Profile;
use crate::session::Session;
use crate::timer::Timer;
use crate::transaction::{TransactionData, TRANSACTION_HOOK};
use crate::transport::{HttpTransport, Transport};
use crate::user::VirtualUser;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use shopload_core::{RunConfig, RunStatistics};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Drives one load test run.
///
/// # Example
/// ```no_run
/// use shopload::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), RunError> {
///     let host = "http://localhost:8080".parse().unwrap();
///     let config = RunConfig::new(host, ProfileKind::Payment)
///         .users(20)
///         .spawn_rate(2.)
///         .duration(Duration::from_secs(120));
///
///     let stats = Runner::new(config)?.run().await?;
///     println!("{stats}");
///     Ok(())
/// }
/// ```
pub struct Runner {
    config: RunConfig,
    transport: Arc<dyn Transport>,
}

impl Runner {
    pub fn new(config: RunConfig) -> Result<Self, RunError> {
        config.validate()?;
        let transport = HttpTransport::new(&config.host, config.timeout)?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    pub fn with_transport(
        config: RunConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the built-in profile selected in the configuration.
    pub async fn run(self) -> Result<RunStatistics, RunError> {
        let profile = Profile::builtin(self.config.profile)?;
        Ok(self.run_profile(Arc::new(profile)).await)
    }

    /// Run an arbitrary profile until the configured duration elapses or the
    /// process receives Ctrl-C.
    #[instrument(name = "runner", skip_all, fields(profile = %profile.kind()))]
    pub async fn run_profile(self, profile: Arc<Profile>) -> RunStatistics {
        let config = &self.config;
        info!(
            "Running {} users against {} (spawn rate {}/s, wait {})",
            config.users, config.host, config.spawn_rate, config.wait
        );

        let collector = Arc::new(Collector::new());
        let data = TransactionData {
            limiter: config.max_rps.map(|rps| Arc::new(rate_limiter(rps))),
            collector: collector.clone(),
        };

        let start = Instant::now();
        let stop = wait_for_stop(config.duration.map(|d| start + d));
        tokio::pin!(stop);

        let mut users = Vec::with_capacity(config.users);
        self.spawn_user(&mut users, &profile, &data);

        let mut spawn_timer = Timer::new(config.spawn_interval()).await;
        let mut report_timer = Timer::new(config.report_interval).await;
        debug!("Reporting every {report_timer}");

        let mut total = Measurement::new();
        loop {
            tokio::select! {
                _ = spawn_timer.tick(), if users.len() < config.users => {
                    self.spawn_user(&mut users, &profile, &data);
                    if users.len() == config.users {
                        info!("All {} users spawned", users.len());
                    }
                }
                elapsed = report_timer.tick() => {
                    let sample = collector.collect(elapsed);
                    total.absorb(&sample);
                    info!("users={} {}", users.len(), Measurement::from(&sample));
                }
                reason = &mut stop => {
                    info!("Stopping run: {reason}");
                    break;
                }
            }
        }

        let spawned = users.len();
        for handle in &users {
            handle.abort();
        }
        for handle in users {
            let _ = handle.await;
        }

        total.absorb(&collector.collect(report_timer.since_last_tick()));
        let elapsed = start.elapsed();

        let stats = RunStatistics {
            profile: profile.kind(),
            users: spawned,
            elapsed,
            requests: total.total(),
            failures: total.error,
            task_errors: total.task_errors,
            rps: if elapsed.is_zero() {
                0.
            } else {
                total.total() as f64 / elapsed.as_secs_f64()
            },
            error_rate: total.error_rate(),
            latency_p50: total.latency(0.5),
            latency_p90: total.latency(0.9),
            latency_p99: total.latency(0.99),
            endpoints: collector.endpoints(),
        };
        info!("Run complete: {total}");
        stats
    }

    fn spawn_user(
        &self,
        users: &mut Vec<JoinHandle<()>>,
        profile: &Arc<Profile>,
        data: &TransactionData,
    ) {
        let id = users.len();
        let rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => SmallRng::from_entropy(),
        };
        let session = Session::new(self.transport.clone(), rng);
        let user = VirtualUser::new(id, profile.clone(), session, self.config.wait);

        users.push(tokio::spawn(
            TRANSACTION_HOOK
                .scope(data.clone(), user.run())
                .in_current_span(),
        ));

        #[cfg(feature = "metrics")]
        metrics::gauge!(shopload_core::USERS_METRIC).set(users.len() as f64);
        trace!("Spawned user {id}");
    }
}

async fn wait_for_stop(deadline: Option<Instant>) -> &'static str {
    match deadline {
        Some(deadline) => tokio::select! {
            _ = tokio::time::sleep_until(deadline) => "duration elapsed",
            Ok(()) = tokio::signal::ctrl_c() => "interrupted",
        },
        None => match tokio::signal::ctrl_c().await {
            Ok(()) => "interrupted",
            Err(err) => {
                error!("Unable to listen for Ctrl-C, running until killed: {err}");
                std::future::pending().await
            }
        },
    }
}

fn rate_limiter(max_rps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(max_rps).allow_burst(NonZeroU32::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::transport::tests::RecordingTransport;
    use crate::transport::Response;
    use reqwest::StatusCode;
    use shopload_core::{ConfigError, ProfileKind, WaitTime};
    use std::time::Duration;

    fn config(kind: ProfileKind) -> RunConfig {
        RunConfig::new("http://localhost:8080".parse().unwrap(), kind).seed(1)
    }

    #[tokio::test(start_paused = true)]
    async fn counts_every_request() {
        let transport = RecordingTransport::ok();
        let config = config(ProfileKind::Order)
            .users(3)
            .spawn_rate(1.)
            .duration(Duration::from_secs(60));

        let stats = Runner::with_transport(config, transport.clone())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(stats.profile, ProfileKind::Order);
        assert_eq!(stats.users, 3);
        assert_eq!(stats.requests, transport.requests().len() as u64);
        assert!(stats.requests > 30);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.error_rate, 0.);
        assert!(stats.endpoint("GET /orders").is_some());
        let per_endpoint: u64 = stats.endpoints.iter().map(|e| e.requests).sum();
        assert_eq!(per_endpoint, stats.requests);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_rate_paces_users() {
        let config = config(ProfileKind::Favourite)
            .users(100)
            .spawn_rate(2.)
            .duration(Duration::from_secs(10));

        let stats = Runner::with_transport(config, RecordingTransport::ok())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!((19..=21).contains(&stats.users), "{}", stats.users);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_counted() {
        let transport = RecordingTransport::new(|req| {
            if req.path.ends_with("/health") {
                Err(ClientError::Other("refused".into()))
            } else {
                Ok(Response::new(StatusCode::INTERNAL_SERVER_ERROR, ""))
            }
        });
        let config = config(ProfileKind::Payment)
            .users(2)
            .spawn_rate(10.)
            .duration(Duration::from_secs(30));

        let stats = Runner::with_transport(config, transport)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!(stats.requests > 0);
        assert_eq!(stats.failures, stats.requests);
        assert_eq!(stats.error_rate, 1.);
        assert_eq!(stats.task_errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_traffic() {
        async fn paths() -> Vec<String> {
            let transport = RecordingTransport::ok();
            let config = config(ProfileKind::Combined)
                .users(1)
                .duration(Duration::from_secs(20));
            Runner::with_transport(config, transport.clone())
                .unwrap()
                .run()
                .await
                .unwrap();
            transport.requests().into_iter().map(|r| r.path).collect()
        }

        assert_eq!(paths().await, paths().await);
    }

    #[tokio::test]
    async fn max_rps_caps_throughput() {
        let config = config(ProfileKind::Order)
            .users(4)
            .spawn_rate(100.)
            .wait(WaitTime::none())
            .max_rps(NonZeroU32::new(5).unwrap())
            .duration(Duration::from_secs(2));

        let stats = Runner::with_transport(config, RecordingTransport::ok())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!((5..=14).contains(&stats.requests), "{}", stats.requests);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let res = Runner::with_transport(config(ProfileKind::Order).users(0), RecordingTransport::ok());
        assert!(matches!(res, Err(RunError::Config(ConfigError::NoUsers))));

        let res = Runner::with_transport(
            config(ProfileKind::Order).report_interval(Duration::ZERO),
            RecordingTransport::ok(),
        );
        assert!(matches!(
            res,
            Err(RunError::Config(ConfigError::ZeroReportInterval))
        ));

        let res = Runner::with_transport(config(ProfileKind::Order).spawn_rate(1e12), RecordingTransport::ok());
        assert!(matches!(
            res,
            Err(RunError::Config(ConfigError::InvalidSpawnRate(_)))
        ));
    }
}
