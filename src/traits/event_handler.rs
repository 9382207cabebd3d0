use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::snapshot::ValueUpdate;

/// Handler for tracker events.
#[async_trait]
pub trait ValueEventHandler: Send + Sync {
    /// Called after every successful poll with the fresh snapshot and deltas.
    async fn on_update(&self, update: &ValueUpdate);

    /// Called when a poll fails and no data is available.
    async fn on_unavailable(&self, error: &ProviderError);
}
