use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::traits::price_provider::PriceProvider;

/// Retry discipline applied per provider before failing over.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, delay: Duration::from_secs(1) }
    }
}

/// Price provider that walks an explicit ordered list of sources.
///
/// Transient errors are retried against the same source per the policy;
/// definitive answers ("token not found", malformed body) move straight to
/// the next source. When every source has failed, the caller gets a distinct
/// exhaustion error - never a substitute value.
pub struct FailoverPriceProvider {
    providers: Vec<Arc<dyn PriceProvider>>,
    retry: RetryPolicy,
}

impl FailoverPriceProvider {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    async fn try_provider(
        &self,
        provider: &Arc<dyn PriceProvider>,
        mint: &Pubkey,
    ) -> Result<f64, ProviderError> {
        let mut attempt = 1;
        loop {
            match provider.fetch_price(mint).await {
                Ok(price) => return Ok(price),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(
                        "Price source {} attempt {}/{} failed: {}",
                        provider.source_name(),
                        attempt,
                        self.retry.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl PriceProvider for FailoverPriceProvider {
    async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError> {
        for provider in &self.providers {
            match self.try_provider(provider, mint).await {
                Ok(price) => {
                    debug!("Price from {}: ${}", provider.source_name(), price);
                    return Ok(price);
                }
                Err(e) => {
                    warn!("Price source {} gave up: {}", provider.source_name(), e);
                }
            }
        }

        Err(ProviderError::Exhausted { tried: self.providers.len() })
    }

    fn source_name(&self) -> &str {
        "failover"
    }
}
