use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::price_provider::PriceProvider;

const SOURCE_NAME: &str = "jupiter";
const DEFAULT_BASE_URL: &str = "https://lite-api.jup.ag";

/// Price provider backed by the Jupiter price API (keyless).
pub struct JupiterPriceProvider {
    client: Client,
    base_url: String,
}

/// Jupiter returns one entry per requested mint, `null` for mints it does
/// not know. Prices come back as decimal strings.
#[derive(Debug, Deserialize)]
struct PriceResponse {
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: String,
}

impl JupiterPriceProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self { client: Client::new(), base_url }
    }

    fn parse_price(body: &str, mint: &Pubkey) -> Result<f64, ProviderError> {
        let response: PriceResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::malformed(SOURCE_NAME, e.to_string()))?;

        let entry = response
            .data
            .get(&mint.to_string())
            .and_then(|entry| entry.as_ref())
            .ok_or_else(|| ProviderError::token_not_found(SOURCE_NAME, *mint))?;

        entry.price.parse::<f64>().map_err(|_| {
            ProviderError::malformed(
                SOURCE_NAME,
                format!("non-numeric price {:?}", entry.price),
            )
        })
    }
}

impl Default for JupiterPriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for JupiterPriceProvider {
    async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError> {
        let url = format!("{}/price/v2?ids={}", self.base_url, mint);

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let price = Self::parse_price(&body, mint)?;
        debug!("Jupiter price for {}: ${}", mint, price);
        Ok(price)
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }
}
