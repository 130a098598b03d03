use crate::error::ProbeError;
use crate::{ProviderClient, RawResponse};
use async_trait::async_trait;
use configuration::ProviderCredentials;
use core_types::Provider;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const ALCHEMY_PRICES_URL: &str = "https://api.g.alchemy.com";
const ALCHEMY_RPC_URL: &str = "https://eth-mainnet.g.alchemy.com";
const MOBULA_URL: &str = "https://api.mobula.io";
const CODEX_URL: &str = "https://graph.codex.io";
const COINGECKO_URL: &str = "https://api.coingecko.com";

/// Builds the concrete client for one provider behind the shared trait.
/// Adding a provider means one new variant here plus its extractor arm.
pub fn build_client(
    provider: Provider,
    credentials: &ProviderCredentials,
    timeout: Duration,
) -> Result<Arc<dyn ProviderClient>, ProbeError> {
    let client: Arc<dyn ProviderClient> = match provider {
        Provider::Alchemy => Arc::new(AlchemyClient::new(credentials, timeout)?),
        Provider::Mobula => Arc::new(MobulaClient::new(credentials, timeout)?),
        Provider::Codex => Arc::new(CodexClient::new(credentials, timeout)?),
        Provider::Coingecko => Arc::new(CoingeckoClient::new(credentials, timeout)?),
    };
    Ok(client)
}

/// Drains a response into the raw (status, body) pair the probe works on.
async fn into_raw(response: reqwest::Response) -> Result<RawResponse, ProbeError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(RawResponse { status, body })
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProbeError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

// --- Alchemy ---

/// Client for the Alchemy Prices API and the JSON-RPC token balance endpoint.
#[derive(Clone)]
pub struct AlchemyClient {
    client: reqwest::Client,
    api_key: String,
    prices_base: String,
    rpc_base: String,
}

impl AlchemyClient {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProbeError> {
        // A base_url override (used by tests) redirects both endpoints.
        let (prices_base, rpc_base) = match &credentials.base_url {
            Some(base) => (base.clone(), base.clone()),
            None => (ALCHEMY_PRICES_URL.to_string(), ALCHEMY_RPC_URL.to_string()),
        };
        Ok(Self {
            client: http_client(timeout)?,
            api_key: credentials.api_key.clone(),
            prices_base,
            rpc_base,
        })
    }
}

#[async_trait]
impl ProviderClient for AlchemyClient {
    fn provider(&self) -> Provider {
        Provider::Alchemy
    }

    async fn fetch_price(&self, symbol: &str) -> Result<RawResponse, ProbeError> {
        let url = format!(
            "{}/prices/v1/{}/tokens/by-symbol",
            self.prices_base, self.api_key
        );
        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbol)])
            .send()
            .await?;
        into_raw(response).await
    }

    async fn fetch_wallet_balance(&self, address: &str) -> Result<RawResponse, ProbeError> {
        let url = format!("{}/v2/{}", self.rpc_base, self.api_key);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "alchemy_getTokenBalances",
            "params": [address],
        });
        let response = self.client.post(&url).json(&payload).send().await?;
        into_raw(response).await
    }
}

// --- Mobula ---

/// Client for the Mobula market-data and wallet-portfolio endpoints.
#[derive(Clone)]
pub struct MobulaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MobulaClient {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProbeError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: credentials.api_key.clone(),
            base_url: credentials
                .base_url
                .clone()
                .unwrap_or_else(|| MOBULA_URL.to_string()),
        })
    }
}

#[async_trait]
impl ProviderClient for MobulaClient {
    fn provider(&self) -> Provider {
        Provider::Mobula
    }

    async fn fetch_price(&self, symbol: &str) -> Result<RawResponse, ProbeError> {
        let url = format!("{}/api/1/market/data", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        into_raw(response).await
    }

    async fn fetch_wallet_balance(&self, address: &str) -> Result<RawResponse, ProbeError> {
        let url = format!("{}/api/1/wallet/portfolio", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[("wallet", address)])
            .send()
            .await?;
        into_raw(response).await
    }
}

// --- Codex ---

/// Client for the Codex GraphQL API. Price lookups address tokens by
/// contract address on Ethereum mainnet (network id 1).
#[derive(Clone)]
pub struct CodexClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CodexClient {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProbeError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: credentials.api_key.clone(),
            base_url: credentials
                .base_url
                .clone()
                .unwrap_or_else(|| CODEX_URL.to_string()),
        })
    }

    async fn execute(&self, query: String) -> Result<RawResponse, ProbeError> {
        let url = format!("{}/graphql", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query }))
            .send()
            .await?;
        into_raw(response).await
    }
}

/// Maps a token symbol to its Ethereum mainnet contract address. Unmapped
/// symbols are passed through; the provider reports them as not found and
/// the probe records that outcome like any other.
fn token_address(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "USDT" => "0xdac17f958d2ee523a2206206994597c13d831ec7".to_string(),
        "USDC" => "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
        "ETH" | "WETH" => "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2".to_string(),
        "WBTC" => "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ProviderClient for CodexClient {
    fn provider(&self) -> Provider {
        Provider::Codex
    }

    async fn fetch_price(&self, symbol: &str) -> Result<RawResponse, ProbeError> {
        let query = format!(
            r#"{{ getTokenPrices(inputs: [{{ address: "{}", networkId: 1 }}]) {{ priceUsd }} }}"#,
            token_address(symbol)
        );
        self.execute(query).await
    }

    async fn fetch_wallet_balance(&self, address: &str) -> Result<RawResponse, ProbeError> {
        let query = format!(
            r#"{{ balances(input: {{ walletId: "1:{}" }}) {{ items {{ tokenId balance }} }} }}"#,
            address
        );
        self.execute(query).await
    }
}

// --- Coingecko (reference/oracle) ---

/// Client for the Coingecko public price API. Works without an API key; a
/// demo key, when configured, is sent in the documented header.
#[derive(Clone)]
pub struct CoingeckoClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CoingeckoClient {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Result<Self, ProbeError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: credentials.api_key.clone(),
            base_url: credentials
                .base_url
                .clone()
                .unwrap_or_else(|| COINGECKO_URL.to_string()),
        })
    }
}

/// Maps a token symbol to the Coingecko coin id used by the simple-price
/// endpoint. Unmapped symbols fall back to the lowercased symbol.
fn coin_id(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "USDT" => "tether".to_string(),
        "USDC" => "usd-coin".to_string(),
        "ETH" | "WETH" => "ethereum".to_string(),
        "BTC" => "bitcoin".to_string(),
        "WBTC" => "wrapped-bitcoin".to_string(),
        "SOL" => "solana".to_string(),
        other => other.to_lowercase(),
    }
}

#[async_trait]
impl ProviderClient for CoingeckoClient {
    fn provider(&self) -> Provider {
        Provider::Coingecko
    }

    async fn fetch_price(&self, symbol: &str) -> Result<RawResponse, ProbeError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("ids", coin_id(symbol)), ("vs_currencies", "usd".to_string())]);
        if !self.api_key.is_empty() {
            request = request.header("x-cg-demo-api-key", &self.api_key);
        }
        into_raw(request.send().await?).await
    }

    async fn fetch_wallet_balance(&self, _address: &str) -> Result<RawResponse, ProbeError> {
        Err(ProbeError::UnconfiguredProvider(Provider::Coingecko))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_map_to_contract_addresses() {
        assert!(token_address("usdt").starts_with("0xdac17f"));
        assert_eq!(token_address("MYSTERY"), "MYSTERY");
    }

    #[test]
    fn known_symbols_map_to_coin_ids() {
        assert_eq!(coin_id("USDT"), "tether");
        assert_eq!(coin_id("eth"), "ethereum");
        assert_eq!(coin_id("PEPE"), "pepe");
    }
}
