use core_types::Provider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to build or send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to serialize the request payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("No client configured for provider '{0}'")]
    UnconfiguredProvider(Provider),
}
