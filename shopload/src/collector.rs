use metrics_util::AtomicBucket;
use shopload_core::EndpointStatistics;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Counters shared by every virtual user of a run.
///
/// Interval counters are drained by [`Collector::collect`]; per-endpoint
/// counters are cumulative for the whole run.
pub(crate) struct Collector {
    success: AtomicU64,
    error: AtomicU64,
    task_errors: AtomicU64,
    latency: AtomicBucket<Duration>,
    endpoints: RwLock<HashMap<String, Arc<EndpointAtomics>>>,
}

#[derive(Default)]
struct EndpointAtomics {
    success: AtomicU64,
    error: AtomicU64,
    latency_nanos: AtomicU64,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            error: AtomicU64::new(0),
            task_errors: AtomicU64::new(0),
            latency: AtomicBucket::new(),
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    pub fn record(&self, name: &str, success: bool, elapsed: Duration) {
        let endpoint = self.endpoint(name);
        if success {
            self.success.fetch_add(1, Ordering::Relaxed);
            endpoint.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.error.fetch_add(1, Ordering::Relaxed);
            endpoint.error.fetch_add(1, Ordering::Relaxed);
        }
        endpoint
            .latency_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        self.latency.push(elapsed);
    }

    pub fn record_task_error(&self) {
        self.task_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn collect(&self, elapsed: Duration) -> Sample {
        let success = self.success.swap(0, Ordering::Relaxed);
        let error = self.error.swap(0, Ordering::Relaxed);
        let task_errors = self.task_errors.swap(0, Ordering::Relaxed);
        let mut latencies = vec![];
        self.latency.clear_with(|dur| {
            latencies.extend_from_slice(dur);
        });

        Sample {
            success,
            error,
            task_errors,
            elapsed,
            latencies,
        }
    }

    /// Cumulative per request-name statistics, sorted by name.
    pub fn endpoints(&self) -> Vec<EndpointStatistics> {
        let map = match self.endpoints.read() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut endpoints: Vec<_> = map
            .iter()
            .map(|(name, atomics)| {
                let success = atomics.success.load(Ordering::Relaxed);
                let failures = atomics.error.load(Ordering::Relaxed);
                let requests = success + failures;
                let total_nanos = atomics.latency_nanos.load(Ordering::Relaxed);
                let mean_latency = if requests == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_nanos(total_nanos / requests)
                };

                EndpointStatistics {
                    name: name.clone(),
                    requests,
                    failures,
                    mean_latency,
                }
            })
            .collect();
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));
        endpoints
    }

    fn endpoint(&self, name: &str) -> Arc<EndpointAtomics> {
        let read = match self.endpoints.read() {
            Ok(map) => map.get(name).cloned(),
            Err(poisoned) => poisoned.into_inner().get(name).cloned(),
        };
        if let Some(endpoint) = read {
            return endpoint;
        }

        let mut map = match self.endpoints.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        let endpoint = map.entry(name.to_string()).or_default().clone();
        endpoint
    }
}

/// Interval counters drained from a [`Collector`].
#[derive(Debug, Clone)]
pub(crate) struct Sample {
    pub success: u64,
    pub error: u64,
    pub task_errors: u64,
    pub elapsed: Duration,
    pub latencies: Vec<Duration>,
}

impl Sample {
    pub fn count(&self) -> u64 {
        self.success + self.error
    }
}
