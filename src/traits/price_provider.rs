use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::error::ProviderError;

/// Trait for price feed providers.
///
/// A provider that cannot produce a price returns an error; it never
/// substitutes a placeholder number.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Get the USD price for a mint.
    async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError>;

    /// Short source name for logs and error messages.
    fn source_name(&self) -> &str;
}
