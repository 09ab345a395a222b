use crate::collector::Sample;
use pdatastructs::tdigest::{TDigest, K1};
use std::fmt;
use std::time::Duration;
use tracing::error;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Aggregate of one or more [`Sample`]s.
#[derive(Debug, Clone)]
pub(crate) struct Measurement {
    pub success: u64,
    pub error: u64,
    pub task_errors: u64,
    pub elapsed: Duration,
    latency: TDigest<K1>,
    latency_count: usize,
}

impl Measurement {
    pub fn new() -> Self {
        Self {
            success: 0,
            error: 0,
            task_errors: 0,
            elapsed: Duration::ZERO,
            latency: default_tdigest(),
            latency_count: 0,
        }
    }

    pub fn absorb(&mut self, sample: &Sample) {
        self.success += sample.success;
        self.error += sample.error;
        self.task_errors += sample.task_errors;
        self.elapsed += sample.elapsed;
        for latency in &sample.latencies {
            self.latency.insert(latency.as_secs_f64());
        }
        self.latency_count += sample.latencies.len();
    }

    pub fn total(&self) -> u64 {
        self.success + self.error
    }

    pub fn rps(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.;
        }
        self.total() as f64 / self.elapsed.as_secs_f64()
    }

    pub fn error_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.;
        }
        self.error as f64 / self.total() as f64
    }

    pub fn latency(&self, quantile: f64) -> Duration {
        if self.latency_count == 0 {
            return Duration::ZERO;
        }

        let secs = self.latency.quantile(quantile);

        // TDigest can hand back NaN on sparse data.
        let secs = if secs.is_finite() && secs >= 0. {
            secs
        } else {
            error!("NaN latency calculation for quantile {quantile}.");
            0.
        };

        Duration::from_secs_f64(secs)
    }
}

impl From<&Sample> for Measurement {
    fn from(sample: &Sample) -> Self {
        let mut measurement = Measurement::new();
        measurement.absorb(sample);
        measurement
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RPS={:.2}, ErrorRate={:.2}, TaskErrors={}, p50={:?}, p90={:?}, p99={:?}",
            self.rps(),
            self.error_rate(),
            self.task_errors,
            self.latency(0.5),
            self.latency(0.90),
            self.latency(0.99),
        )
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}
