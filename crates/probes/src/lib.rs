use crate::error::ProbeError;
use async_trait::async_trait;
use core_types::Provider;

pub mod classifier;
pub mod clients;
pub mod error;
pub mod extractor;
pub mod probe;
pub mod validator;

// --- Public API ---
pub use clients::{build_client, AlchemyClient, CodexClient, CoingeckoClient, MobulaClient};
pub use probe::{probe_price, probe_wallet_balance};

/// The raw outcome of one provider HTTP call: the status code and the
/// unparsed body. Kept as text so the probe can record the response size
/// and classify in-body error signals even when parsing fails.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The generic, abstract interface to one data provider's API.
/// This trait is the contract the orchestrator drives, allowing the
/// underlying implementation (live or stub) to be swapped out.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The tag this client reports on its observations.
    fn provider(&self) -> Provider;

    /// Issues exactly one price-lookup request for the given token symbol.
    async fn fetch_price(&self, symbol: &str) -> Result<RawResponse, ProbeError>;

    /// Issues exactly one wallet-holdings request for the given address.
    async fn fetch_wallet_balance(&self, address: &str) -> Result<RawResponse, ProbeError>;
}
