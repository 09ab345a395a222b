/// Metric names emitted for every request.
#[derive(Copy, Clone, Debug)]
pub struct RequestLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

pub const REQUEST_LABELS: RequestLabels = RequestLabels {
    success: "shopload_request_success",
    error: "shopload_request_error",
    latency: "shopload_request_latency",
};

pub const TASK_ERROR_METRIC: &str = "shopload_task_error";
pub const USERS_METRIC: &str = "shopload_users";
