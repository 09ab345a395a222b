use crate::{
    DEFAULT_REPORT_INTERVAL, DEFAULT_SPAWN_RATE, DEFAULT_USERS, DEFAULT_WAIT_MAX, DEFAULT_WAIT_MIN,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown profile `{0}` (expected combined, favourite, order or payment)")]
    UnknownProfile(String),

    #[error("Wait window is inverted: min {min:?} > max {max:?}")]
    InvertedWait { min: Duration, max: Duration },

    #[error("At least one virtual user is required")]
    NoUsers,

    #[error("Spawn rate must be a positive number of users per second, got {0}")]
    InvalidSpawnRate(f64),

    #[error("Report interval must be greater than zero")]
    ZeroReportInterval,

    #[error("Host `{0}` cannot be used as a base URL")]
    InvalidHost(String),
}

/// The workload a virtual user executes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// All three services behind the gateway prefix.
    Combined,
    Favourite,
    Order,
    Payment,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::Combined,
        ProfileKind::Favourite,
        ProfileKind::Order,
        ProfileKind::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Combined => "combined",
            ProfileKind::Favourite => "favourite",
            ProfileKind::Order => "order",
            ProfileKind::Payment => "payment",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownProfile(s.to_string()))
    }
}

/// Uniformly random pause between two tasks of the same virtual user.
#[serde_as]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaitTime {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    min: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    max: Duration,
}

impl WaitTime {
    pub fn between(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedWait { min, max });
        }
        Ok(Self { min, max })
    }

    /// No pause at all. Mostly useful in tests.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl Default for WaitTime {
    fn default() -> Self {
        Self {
            min: DEFAULT_WAIT_MIN,
            max: DEFAULT_WAIT_MAX,
        }
    }
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            humantime::format_duration(self.min),
            humantime::format_duration(self.max)
        )
    }
}

/// Everything a run needs besides the workload itself.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub host: Url,
    pub profile: ProfileKind,
    pub users: usize,
    pub spawn_rate: f64,
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub duration: Option<Duration>,
    pub wait: WaitTime,
    pub seed: Option<u64>,
    pub max_rps: Option<NonZeroU32>,
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub timeout: Option<Duration>,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub report_interval: Duration,
}

impl RunConfig {
    pub fn new(host: Url, profile: ProfileKind) -> Self {
        Self {
            host,
            profile,
            users: DEFAULT_USERS,
            spawn_rate: DEFAULT_SPAWN_RATE,
            duration: None,
            wait: WaitTime::default(),
            seed: None,
            max_rps: None,
            timeout: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    pub fn spawn_rate(mut self, spawn_rate: f64) -> Self {
        self.spawn_rate = spawn_rate;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn wait(mut self, wait: WaitTime) -> Self {
        self.wait = wait;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_rps(mut self, max_rps: NonZeroU32) -> Self {
        self.max_rps = Some(max_rps);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::NoUsers);
        }
        if self.checked_spawn_interval().is_none() {
            return Err(ConfigError::InvalidSpawnRate(self.spawn_rate));
        }
        if self.report_interval.is_zero() {
            return Err(ConfigError::ZeroReportInterval);
        }
        if self.host.cannot_be_a_base() {
            return Err(ConfigError::InvalidHost(self.host.to_string()));
        }
        WaitTime::between(self.wait.min, self.wait.max)?;
        Ok(())
    }

    /// Delay between two consecutive user spawns.
    ///
    /// Falls back to one second for a spawn rate rejected by [`validate`](Self::validate).
    pub fn spawn_interval(&self) -> Duration {
        self.checked_spawn_interval()
            .unwrap_or(Duration::from_secs(1))
    }

    fn checked_spawn_interval(&self) -> Option<Duration> {
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.) {
            return None;
        }
        Duration::try_from_secs_f64(1. / self.spawn_rate)
            .ok()
            .filter(|interval| !interval.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn host() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn profile_kind_parses_case_insensitively() {
        assert_eq!("Payment".parse::<ProfileKind>(), Ok(ProfileKind::Payment));
        assert_eq!(" combined ".parse::<ProfileKind>(), Ok(ProfileKind::Combined));
        assert_eq!(
            "cart".parse::<ProfileKind>(),
            Err(ConfigError::UnknownProfile("cart".to_string()))
        );
    }

    #[test]
    fn wait_time_samples_inside_window() {
        let wait = WaitTime::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let pause = wait.sample(&mut rng);
            assert!(pause >= Duration::from_secs(1) && pause <= Duration::from_secs(3));
        }
    }

    #[test]
    fn wait_time_rejects_inverted_window() {
        let res = WaitTime::between(Duration::from_secs(3), Duration::from_secs(1));
        assert!(matches!(res, Err(ConfigError::InvertedWait { .. })));
        assert_eq!(WaitTime::none().sample(&mut rand::thread_rng()), Duration::ZERO);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = RunConfig::new(host(), ProfileKind::Order);
        assert!(config.validate().is_ok());
        assert_eq!(config.clone().users(0).validate(), Err(ConfigError::NoUsers));
        assert_eq!(
            config.clone().spawn_rate(0.).validate(),
            Err(ConfigError::InvalidSpawnRate(0.))
        );
        assert_eq!(config.spawn_rate(4.).spawn_interval(), Duration::from_millis(250));
    }

    #[test]
    fn validate_rejects_zero_report_interval() {
        let config = RunConfig::new(host(), ProfileKind::Payment).report_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroReportInterval));
    }

    #[test]
    fn validate_rejects_spawn_rates_without_a_usable_interval() {
        let config = RunConfig::new(host(), ProfileKind::Combined);
        for rate in [1e12, 1e-320, f64::INFINITY, f64::NAN, -1.] {
            let config = config.clone().spawn_rate(rate);
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidSpawnRate(_))),
                "{rate}"
            );
            assert!(!config.spawn_interval().is_zero(), "{rate}");
        }
        assert!(config.spawn_rate(1e6).validate().is_ok());
    }

    #[test]
    fn config_serializes_durations_as_seconds() {
        let config = RunConfig::new(host(), ProfileKind::Favourite).duration(Duration::from_secs(90));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["profile"], "favourite");
        assert_eq!(json["duration"], 90.0);
        assert_eq!(json["wait"]["min"], 1.0);

        let back: RunConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.duration, Some(Duration::from_secs(90)));
        assert_eq!(back.wait, WaitTime::default());
    }
}
