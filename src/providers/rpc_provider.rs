use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use solana_account_decoder_client_types::token::UiTokenAccount;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Mint;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ProviderError;
use crate::models::token::TokenBalance;
use crate::traits::balance_provider::BalanceProvider;

/// RPC-based balance provider (polling approach).
pub struct RpcBalanceProvider {
    rpc_client: Arc<RpcClient>,
    decimals_cache: Arc<RwLock<HashMap<Pubkey, u8>>>,
}

impl RpcBalanceProvider {
    /// Create a new RPC balance provider.
    pub fn new(rpc_url: String) -> Self {
        let client = RpcClient::new_with_commitment(
            rpc_url,
            CommitmentConfig { commitment: CommitmentLevel::Processed },
        );

        Self {
            rpc_client: Arc::new(client),
            decimals_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Decimals for a mint, from the mint account itself.
    ///
    /// Needed when the wallet holds no token account for the mint, so the
    /// account response cannot tell us. Unpacked once and cached.
    async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, ProviderError> {
        {
            let cache = self.decimals_cache.read().await;
            if let Some(&decimals) = cache.get(mint) {
                return Ok(decimals);
            }
        }

        let data = self.rpc_client.get_account_data(mint).await?;

        let mint_state = Mint::unpack(&data).map_err(|_| {
            ProviderError::malformed("rpc", format!("account {mint} is not a token mint"))
        })?;

        let decimals = mint_state.decimals;

        {
            let mut cache = self.decimals_cache.write().await;
            cache.insert(*mint, decimals);
        }

        Ok(decimals)
    }
}

#[async_trait]
impl BalanceProvider for RpcBalanceProvider {
    async fn fetch_token_balance(
        &self,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TokenBalance, ProviderError> {
        let accounts = self
            .rpc_client
            .get_token_accounts_by_owner(wallet, TokenAccountsFilter::Mint(*mint))
            .await?;

        // A wallet can hold several token accounts for the same mint;
        // the balance is their sum.
        let mut total_amount: u64 = 0;
        let mut decimals: Option<u8> = None;

        for keyed_account in accounts {
            let solana_account_decoder::UiAccountData::Json(parsed_account) =
                keyed_account.account.data
            else {
                continue;
            };

            let Some(info) = parsed_account.parsed.get("info") else {
                continue;
            };

            let token_data = serde_json::from_value::<UiTokenAccount>(info.clone())
                .map_err(|e| {
                    ProviderError::malformed("rpc", format!("token account: {e}"))
                })?;

            let token_amount = token_data.token_amount;
            let amount = token_amount.amount.parse::<u64>().map_err(|_| {
                ProviderError::malformed(
                    "rpc",
                    format!("non-integer token amount {:?}", token_amount.amount),
                )
            })?;

            total_amount = total_amount.saturating_add(amount);
            decimals.get_or_insert(token_amount.decimals);
        }

        let decimals = match decimals {
            Some(d) => d,
            // No token account for this mint: zero balance, decimals from
            // the mint account.
            None => self.get_mint_decimals(mint).await?,
        };

        debug!("Balance for {}: {} raw units ({} decimals)", mint, total_amount, decimals);

        Ok(TokenBalance::new(total_amount, decimals))
    }
}
