use crate::ProfileKind;
use std::fmt;
use std::time::Duration;

/// Per request-name counters of a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointStatistics {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub mean_latency: Duration,
}

/// Statistics for a completed run.
///
/// Latency quantiles are estimated from a TDigest and cover every request of
/// the run, successful or not.
#[derive(Clone, Debug)]
pub struct RunStatistics {
    pub profile: ProfileKind,
    pub users: usize,
    pub elapsed: Duration,
    pub requests: u64,
    pub failures: u64,
    pub task_errors: u64,
    pub rps: f64,
    pub error_rate: f64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    pub endpoints: Vec<EndpointStatistics>,
}

impl RunStatistics {
    pub fn endpoint(&self, name: &str) -> Option<&EndpointStatistics> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "profile={} users={} elapsed={}",
            self.profile,
            self.users,
            humantime::format_duration(Duration::from_secs(self.elapsed.as_secs()))
        )?;
        writeln!(
            f,
            "{:<48} {:>10} {:>10} {:>12}",
            "Name", "# reqs", "# fails", "avg"
        )?;
        for endpoint in &self.endpoints {
            writeln!(
                f,
                "{:<48} {:>10} {:>10} {:>12?}",
                endpoint.name, endpoint.requests, endpoint.failures, endpoint.mean_latency
            )?;
        }
        writeln!(
            f,
            "{:<48} {:>10} {:>10}",
            "Aggregated", self.requests, self.failures
        )?;
        write!(
            f,
            "RPS={:.2}, ErrorRate={:.4}, TaskErrors={}, p50={:?}, p90={:?}, p99={:?}",
            self.rps,
            self.error_rate,
            self.task_errors,
            self.latency_p50,
            self.latency_p90,
            self.latency_p99
        )
    }
}
