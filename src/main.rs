use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solana_token_tracker::providers::{
    birdeye::BirdeyePriceProvider,
    failover::{FailoverPriceProvider, RetryPolicy},
    jupiter::JupiterPriceProvider,
    rpc_provider::RpcBalanceProvider,
};
use solana_token_tracker::handlers::console::ConsoleEventHandler;
use solana_token_tracker::tracker::value_tracker::{RefreshHandle, ValueTracker};
use solana_token_tracker::traits::price_provider::PriceProvider;
use solana_token_tracker::utils::helper::parse_pubkey;

// Defaults track the original deployment's pair; both are overridable.
const DEFAULT_WALLET: &str = "H8r7GkQktUQNdA98tpVHuE3VupjTKpjTGpQsPRHsd9zE";
const DEFAULT_MINT: &str = "2LmeQwAKJPcyUeQKS7CzNMRGyoQt1FsZbUrHCQBdbonk";
const DEFAULT_TICK_INTERVAL_MS: u64 = 10_000;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    tokio::runtime::Runtime::new()?.block_on(async {
        let rpc_url = std::env::var("SOLANA_RPC_URL")
            .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());

        let wallet_address_str =
            std::env::var("WALLET_ADDRESS").unwrap_or_else(|_| DEFAULT_WALLET.to_string());
        let token_mint_str =
            std::env::var("TOKEN_MINT").unwrap_or_else(|_| DEFAULT_MINT.to_string());

        let tick_interval = std::env::var("TICK_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS);

        info!("Initializing token value tracker...");
        info!("RPC URL: {}", rpc_url);
        info!("Wallet Address: {}", wallet_address_str);
        info!("Token Mint: {}", token_mint_str);

        let wallet = parse_pubkey(&wallet_address_str)?;
        let mint = parse_pubkey(&token_mint_str)?;

        let balance_provider = Arc::new(RpcBalanceProvider::new(rpc_url));

        // Ordered price sources: Jupiter first, Birdeye when a key is set.
        let mut price_sources: Vec<Arc<dyn PriceProvider>> =
            vec![Arc::new(JupiterPriceProvider::new())];

        match std::env::var("BIRDEYE_API_KEY") {
            Ok(api_key) if !api_key.is_empty() => {
                info!("Birdeye enabled as secondary price source");
                price_sources.push(Arc::new(BirdeyePriceProvider::new(api_key)));
            }
            _ => {
                info!("Birdeye disabled. Set BIRDEYE_API_KEY to enable a second price source.");
            }
        }

        let price_provider =
            Arc::new(FailoverPriceProvider::new(price_sources, RetryPolicy::default()));

        let event_handler = Arc::new(ConsoleEventHandler::new(wallet, mint));

        let tracker = Arc::new(ValueTracker::new(
            wallet,
            mint,
            balance_provider,
            price_provider,
            event_handler,
        ));

        let (refresh_handle, refresh_rx) = RefreshHandle::channel();

        // Newline on stdin requests an immediate refresh.
        tokio::spawn(stdin_refresh_loop(refresh_handle));

        let tracker_for_task = tracker.clone();
        tokio::spawn(async move {
            if let Err(e) = tracker_for_task.run(tick_interval, refresh_rx).await {
                tracing::error!("Tracking error: {}", e);
            }
        });

        info!("Token tracker is running. Press Enter to refresh, Ctrl+C to stop.");
        info!("View on Explorer: https://explorer.solana.com/address/{}", wallet);

        tokio::signal::ctrl_c().await?;

        info!("Shutting down...");

        Ok(())
    })
}

async fn stdin_refresh_loop(refresh: RefreshHandle) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(_)) = lines.next_line().await {
        refresh.request();
    }
}
