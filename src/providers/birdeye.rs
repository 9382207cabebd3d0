use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::price_provider::PriceProvider;

const SOURCE_NAME: &str = "birdeye";
const BASE_URL: &str = "https://public-api.birdeye.so";

/// Price provider backed by the Birdeye API. Requires an API key, so it is
/// only constructed when one is configured.
pub struct BirdeyePriceProvider {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    success: bool,
    data: Option<PriceData>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    value: f64,
}

impl BirdeyePriceProvider {
    pub fn new(api_key: String) -> Self {
        Self { client: Client::new(), api_key }
    }

    fn parse_price(body: &str, mint: &Pubkey) -> Result<f64, ProviderError> {
        let response: PriceResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::malformed(SOURCE_NAME, e.to_string()))?;

        if !response.success {
            return Err(ProviderError::token_not_found(SOURCE_NAME, *mint));
        }

        response
            .data
            .map(|data| data.value)
            .ok_or_else(|| ProviderError::token_not_found(SOURCE_NAME, *mint))
    }
}

#[async_trait]
impl PriceProvider for BirdeyePriceProvider {
    async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError> {
        let url = format!("{BASE_URL}/defi/price?address={mint}");

        let body = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .header("x-chain", "solana")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let price = Self::parse_price(&body, mint)?;
        debug!("Birdeye price for {}: ${}", mint, price);
        Ok(price)
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }
}
