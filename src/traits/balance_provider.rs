use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::error::ProviderError;
use crate::models::token::TokenBalance;

/// Core trait for fetching the tracked token's balance.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Fetch the wallet's balance of one mint.
    ///
    /// A wallet holding no account for the mint is a zero balance, not an
    /// error; decimals still reflect the mint.
    async fn fetch_token_balance(
        &self,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TokenBalance, ProviderError>;
}
