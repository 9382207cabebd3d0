//! Token Value Tracker Library
//!
//! Tracks the USD value of one SPL token held by one wallet, polling a
//! Solana RPC node for the balance and external price APIs for the price.

// Public modules - these are the API surface
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use error::ProviderError;
pub use handlers::console::ConsoleEventHandler;
pub use models::{
    snapshot::{Direction, TokenSnapshot, ValueChange, ValueHistory, ValueUpdate},
    token::TokenBalance,
};
pub use providers::{
    birdeye::BirdeyePriceProvider,
    failover::{FailoverPriceProvider, RetryPolicy},
    jupiter::JupiterPriceProvider,
    rpc_provider::RpcBalanceProvider,
};
pub use tracker::value_tracker::{RefreshHandle, TrackerState, ValueTracker};
pub use traits::{
    balance_provider::BalanceProvider,
    event_handler::ValueEventHandler,
    price_provider::PriceProvider,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
