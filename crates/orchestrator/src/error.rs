use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Failed to record an observation: {0}")]
    Sink(#[from] database::DbError),

    #[error("Failed to construct a provider client: {0}")]
    Client(#[from] probes::error::ProbeError),

    #[error("No providers are configured for this run")]
    NoProviders,
}
