use crate::collector::Collector;
use crate::error::ClientError;
use crate::transport::Response;
use governor::DefaultDirectRateLimiter;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, trace};

/// Wraps every request sent by a [`Session`](crate::Session).
///
/// Waits on the run's rate limiter, times the request and records the outcome
/// in the collector of the enclosing virtual user. Outside of a run the
/// request is sent untouched.
pub async fn transaction_hook<T>(name: &str, func: T) -> T::Output
where
    T: Future<Output = Result<Response, ClientError>>,
{
    let Ok(hook) = TRANSACTION_HOOK.try_with(|v| v.clone()) else {
        trace!("No hook available for {name}.");
        return func.await;
    };

    if let Some(limiter) = &hook.limiter {
        limiter.until_ready().await;
    }

    let start = Instant::now();
    let res = func.await;
    let elapsed = start.elapsed();

    let success = match &res {
        Ok(response) if response.is_failure() => {
            debug!("{name} returned {}", response.status());
            false
        }
        Ok(_) => true,
        Err(error) => {
            debug!("{name} failed: {error}");
            false
        }
    };

    hook.collector.record(name, success, elapsed);
    record_metrics(name, success, elapsed);

    res
}

pub(crate) fn record_task_error() {
    let _ = TRANSACTION_HOOK.try_with(|hook| hook.collector.record_task_error());

    #[cfg(feature = "metrics")]
    metrics::counter!(shopload_core::TASK_ERROR_METRIC).increment(1);
}

#[cfg(feature = "metrics")]
fn record_metrics(name: &str, success: bool, elapsed: Duration) {
    let labels = shopload_core::REQUEST_LABELS;
    let name = name.to_string();

    metrics::histogram!(labels.latency, "name" => name.clone()).record(elapsed.as_secs_f64());
    if success {
        metrics::counter!(labels.success, "name" => name).increment(1);
    } else {
        metrics::counter!(labels.error, "name" => name).increment(1);
    }
}

#[cfg(not(feature = "metrics"))]
fn record_metrics(_name: &str, _success: bool, _elapsed: Duration) {}

#[derive(Clone)]
pub(crate) struct TransactionData {
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
    pub collector: Arc<Collector>,
}

tokio::task_local! {
    pub(crate) static TRANSACTION_HOOK: TransactionData;
}
