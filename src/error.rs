use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors surfaced by balance and price providers.
///
/// Providers never substitute placeholder values for data they could not
/// fetch; every failure mode is a distinct variant so the tracker can report
/// an honest "unavailable" state.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response from {source_name}: {detail}")]
    MalformedResponse { source_name: String, detail: String },

    #[error("token {mint} not known to {source_name}")]
    TokenNotFound { source_name: String, mint: Pubkey },

    #[error("all {tried} price providers failed")]
    Exhausted { tried: usize },
}

impl ProviderError {
    /// Transient errors are worth retrying against the same provider;
    /// anything else should move on to the next one.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::Http(_))
    }

    pub fn malformed(source_name: &str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            source_name: source_name.to_string(),
            detail: detail.into(),
        }
    }

    pub fn token_not_found(source_name: &str, mint: Pubkey) -> Self {
        Self::TokenNotFound { source_name: source_name.to_string(), mint }
    }
}
