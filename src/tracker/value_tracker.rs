use std::sync::Arc;
use std::time::{Duration, Instant};

use solana_sdk::pubkey::Pubkey;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::models::snapshot::{TokenSnapshot, ValueHistory, ValueUpdate};
use crate::traits::balance_provider::BalanceProvider;
use crate::traits::event_handler::ValueEventHandler;
use crate::traits::price_provider::PriceProvider;

/// Lifecycle of the tracked value.
///
/// `Loading` is re-entered on every tick and manual refresh; a failed poll
/// lands in `Unavailable` rather than carrying stale or fabricated numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState {
    Idle,
    Loading,
    Ready(TokenSnapshot),
    Unavailable,
}

/// Cloneable handle for requesting an immediate poll.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Create a handle and the receiver end for [`ValueTracker::run`].
    pub fn channel() -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(4);
        (Self { tx }, rx)
    }

    /// Request a refresh. Requests arriving while one is already queued
    /// are coalesced.
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Polls the providers for one (wallet, mint) pair and derives the USD
/// value and its delta against the previous observation.
pub struct ValueTracker {
    wallet: Pubkey,
    mint: Pubkey,
    balance_provider: Arc<dyn BalanceProvider>,
    price_provider: Arc<dyn PriceProvider>,
    event_handler: Arc<dyn ValueEventHandler>,
    state: Arc<Mutex<TrackerState>>,
    history: Arc<Mutex<ValueHistory>>,
}

impl ValueTracker {
    /// Create a new value tracker.
    pub fn new(
        wallet: Pubkey,
        mint: Pubkey,
        balance_provider: Arc<dyn BalanceProvider>,
        price_provider: Arc<dyn PriceProvider>,
        event_handler: Arc<dyn ValueEventHandler>,
    ) -> Self {
        Self {
            wallet,
            mint,
            balance_provider,
            price_provider,
            event_handler,
            state: Arc::new(Mutex::new(TrackerState::Idle)),
            history: Arc::new(Mutex::new(ValueHistory::new())),
        }
    }

    pub fn wallet(&self) -> &Pubkey {
        &self.wallet
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    /// Current state of the tracked value.
    pub async fn state(&self) -> TrackerState {
        self.state.lock().await.clone()
    }

    /// Fetch balance and price concurrently and combine them.
    async fn take_snapshot(&self) -> Result<TokenSnapshot, ProviderError> {
        let (balance, price) = tokio::try_join!(
            self.balance_provider.fetch_token_balance(&self.wallet, &self.mint),
            self.price_provider.fetch_price(&self.mint),
        )?;

        Ok(TokenSnapshot::new(balance.ui_amount(), price))
    }

    /// Run one poll cycle and report the resulting state.
    pub async fn poll_once(&self) -> TrackerState {
        *self.state.lock().await = TrackerState::Loading;

        let new_state = match self.take_snapshot().await {
            Ok(snapshot) => {
                let (change, since_start) = {
                    let mut history = self.history.lock().await;
                    let change = history.observe(&snapshot);
                    let since_start = history.since_start(&snapshot);
                    (change, since_start)
                };

                let update =
                    ValueUpdate { snapshot: snapshot.clone(), change, since_start };
                self.event_handler.on_update(&update).await;

                TrackerState::Ready(snapshot)
            }
            Err(e) => {
                self.event_handler.on_unavailable(&e).await;
                TrackerState::Unavailable
            }
        };

        *self.state.lock().await = new_state.clone();
        new_state
    }

    /// Poll until cancelled, on a fixed interval, servicing manual refresh
    /// requests immediately.
    ///
    /// Polls are strictly sequential: one completes before the next starts,
    /// so a slow response can never overwrite a newer one.
    pub async fn run(
        &self,
        tick_interval_ms: u64,
        mut refresh_rx: mpsc::Receiver<()>,
    ) -> anyhow::Result<()> {
        info!("Started tracking wallet: {}", self.wallet);
        info!("Tracked mint: {}", self.mint);
        info!("Tracking interval: {}ms", tick_interval_ms);

        self.poll_once().await;

        let mut timedelta = Instant::now();

        loop {
            let sleep_ms =
                tick_interval_ms as i128 - timedelta.elapsed().as_millis() as i128;

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(sleep_ms.max(0) as u64)) => {}
                Some(()) = refresh_rx.recv() => {
                    info!("Manual refresh requested");
                }
            }
            timedelta = Instant::now();

            let start_time = Instant::now();
            self.poll_once().await;
            debug!("Tick completed in {:?}", start_time.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::snapshot::Direction;
    use crate::models::token::TokenBalance;

    struct FixedBalance(TokenBalance);

    #[async_trait]
    impl BalanceProvider for FixedBalance {
        async fn fetch_token_balance(
            &self,
            _wallet: &Pubkey,
            _mint: &Pubkey,
        ) -> Result<TokenBalance, ProviderError> {
            Ok(self.0)
        }
    }

    /// Returns each scripted price in turn, then repeats the last.
    struct ScriptedPrices(StdMutex<Vec<f64>>);

    impl ScriptedPrices {
        fn new(prices: &[f64]) -> Self {
            let mut reversed: Vec<f64> = prices.to_vec();
            reversed.reverse();
            Self(StdMutex::new(reversed))
        }
    }

    #[async_trait]
    impl PriceProvider for ScriptedPrices {
        async fn fetch_price(&self, _mint: &Pubkey) -> Result<f64, ProviderError> {
            let mut prices = self.0.lock().unwrap();
            if prices.len() > 1 {
                Ok(prices.pop().unwrap())
            } else {
                Ok(*prices.last().unwrap())
            }
        }

        fn source_name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingPrices;

    #[async_trait]
    impl PriceProvider for FailingPrices {
        async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError> {
            Err(ProviderError::token_not_found("failing", *mint))
        }

        fn source_name(&self) -> &str {
            "failing"
        }
    }

    /// Fails on the first call, succeeds afterwards.
    struct FailOnce(std::sync::atomic::AtomicBool);

    #[async_trait]
    impl PriceProvider for FailOnce {
        async fn fetch_price(&self, mint: &Pubkey) -> Result<f64, ProviderError> {
            if self.0.swap(true, std::sync::atomic::Ordering::SeqCst) {
                Ok(1.0)
            } else {
                Err(ProviderError::token_not_found("fail-once", *mint))
            }
        }

        fn source_name(&self) -> &str {
            "fail-once"
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        updates: StdMutex<Vec<ValueUpdate>>,
        errors: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl ValueEventHandler for RecordingHandler {
        async fn on_update(&self, update: &ValueUpdate) {
            self.updates.lock().unwrap().push(update.clone());
        }

        async fn on_unavailable(&self, error: &ProviderError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    fn tracker_with(
        price_provider: Arc<dyn PriceProvider>,
        handler: Arc<RecordingHandler>,
    ) -> ValueTracker {
        ValueTracker::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Arc::new(FixedBalance(TokenBalance::new(1_000_000_000, 9))),
            price_provider,
            handler,
        )
    }

    #[tokio::test]
    async fn starts_idle() {
        let handler = Arc::new(RecordingHandler::default());
        let tracker = tracker_with(Arc::new(ScriptedPrices::new(&[1.0])), handler);

        assert_eq!(tracker.state().await, TrackerState::Idle);
    }

    #[tokio::test]
    async fn successful_poll_lands_in_ready_with_derived_value() {
        let handler = Arc::new(RecordingHandler::default());
        let tracker =
            tracker_with(Arc::new(ScriptedPrices::new(&[0.052])), handler.clone());

        let state = tracker.poll_once().await;

        let TrackerState::Ready(snapshot) = state else {
            panic!("expected Ready, got {state:?}");
        };
        assert_eq!(snapshot.balance, 1.0);
        assert_eq!(snapshot.price, 0.052);
        assert_eq!(snapshot.usd_value, 1.0 * 0.052);

        let updates = handler.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].change.is_none());
    }

    #[tokio::test]
    async fn second_poll_carries_delta_against_previous() {
        let handler = Arc::new(RecordingHandler::default());
        let tracker =
            tracker_with(Arc::new(ScriptedPrices::new(&[1.0, 1.1])), handler.clone());

        tracker.poll_once().await;
        tracker.poll_once().await;

        let updates = handler.updates.lock().unwrap();
        let change = updates[1].change.as_ref().unwrap();
        assert_eq!(change.direction, Direction::Up);
        assert!((change.percentage - 10.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn failed_poll_is_unavailable_and_never_fabricates_data() {
        let handler = Arc::new(RecordingHandler::default());
        let tracker = tracker_with(Arc::new(FailingPrices), handler.clone());

        let state = tracker.poll_once().await;

        assert_eq!(state, TrackerState::Unavailable);
        assert!(handler.updates.lock().unwrap().is_empty());
        assert_eq!(handler.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recovers_from_unavailable_on_next_success() {
        let handler = Arc::new(RecordingHandler::default());
        let tracker = tracker_with(
            Arc::new(FailOnce(std::sync::atomic::AtomicBool::new(false))),
            handler.clone(),
        );

        assert_eq!(tracker.poll_once().await, TrackerState::Unavailable);

        let state = tracker.poll_once().await;
        assert!(matches!(state, TrackerState::Ready(_)));
        assert_eq!(handler.errors.lock().unwrap().len(), 1);
        assert_eq!(handler.updates.lock().unwrap().len(), 1);
    }
}
