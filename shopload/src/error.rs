use rand::distributions::WeightedError;
use shopload_core::{ConfigError, ProfileKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failure injected by test transports.
    #[cfg(test)]
    #[error("Request failed: {0}")]
    Other(String),
}

/// Failure of a task after its requests were already recorded.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Response to {request} is not valid JSON: {source}")]
    InvalidBody {
        request: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile {kind} has no usable task weights: {source}")]
    Weights {
        kind: ProfileKind,
        #[source]
        source: WeightedError,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Unable to build HTTP client: {0}")]
    Client(#[from] ClientError),
}
