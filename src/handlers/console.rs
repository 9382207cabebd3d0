use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::error::ProviderError;
use crate::models::snapshot::{Direction, ValueChange, ValueUpdate};
use crate::traits::event_handler::ValueEventHandler;
use crate::utils::helper::{
    format_currency, format_number, format_pubkey, format_token_price,
};

/// Console renderer for value updates. Owns no tracker state.
pub struct ConsoleEventHandler {
    wallet: Pubkey,
    mint: Pubkey,
}

impl ConsoleEventHandler {
    /// Create a new console event handler
    pub fn new(wallet: Pubkey, mint: Pubkey) -> Self {
        Self { wallet, mint }
    }

    fn delta_indicator(change: Option<&ValueChange>) -> String {
        let Some(change) = change else {
            return String::new();
        };

        let arrow = match change.direction {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Neutral => return String::new(),
        };

        format!("  {} {:.2}%", arrow, change.percentage.abs())
    }
}

#[async_trait]
impl ValueEventHandler for ConsoleEventHandler {
    async fn on_update(&self, update: &ValueUpdate) {
        let snapshot = &update.snapshot;

        info!("{}", "=".repeat(80));
        info!("SOLANA TOKEN TRACKER");
        info!("{}", "-".repeat(80));
        info!("Wallet:  {}", format_pubkey(&self.wallet));
        info!("Token:   {}", format_pubkey(&self.mint));
        info!(
            "Value:   {}{}",
            format_currency(snapshot.usd_value),
            Self::delta_indicator(update.change.as_ref())
        );
        info!("Balance: {}", format_number(snapshot.balance));
        info!("Price:   {}", format_token_price(snapshot.price));

        if let Some(since_start) = &update.since_start {
            if !since_start.is_neutral() {
                info!("Since start:{}", Self::delta_indicator(Some(since_start)));
            }
        }

        info!(
            "Updated: {}",
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        info!("{}", "=".repeat(80));
    }

    async fn on_unavailable(&self, error: &ProviderError) {
        warn!("{}", "=".repeat(80));
        warn!("Unable to fetch token data: {}", error);
        warn!("Value display is unavailable until the next successful poll.");
        warn!("{}", "=".repeat(80));
    }
}
