use std::time::Duration;

use assist_api::domain::disambiguation::DEFAULT_DISAMBIGUATION_TTL_SECS;
use assist_api::domain::fee::DisambiguationOption;
use assist_api::service::disambiguation_store_service::DisambiguationStore;
use async_trait::async_trait;
use moka::future::Cache;
use uuid::Uuid;

/// Disambiguation Store: a short-lived, TTL-evicted `{token -> options}`
/// map. `moka`'s own expiry sweep handles the passive case; `sweep` exists
/// for callers that want to force eviction (e.g. a scheduled housekeeping
/// tick).
pub struct DisambiguationStoreImpl {
    entries: Cache<String, Vec<DisambiguationOption>>,
}

impl DisambiguationStoreImpl {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Cache::builder().time_to_live(ttl).build() }
    }
}

impl Default for DisambiguationStoreImpl {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_DISAMBIGUATION_TTL_SECS))
    }
}

#[async_trait]
impl DisambiguationStore for DisambiguationStoreImpl {
    async fn put(&self, options: Vec<DisambiguationOption>) -> String {
        let token = Uuid::new_v4().to_string();
        self.entries.insert(token.clone(), options).await;
        token
    }

    async fn take(&self, token: &str) -> Option<Vec<DisambiguationOption>> {
        let options = self.entries.get(token).await;
        if options.is_some() {
            self.entries.invalidate(token).await;
        }
        options
    }

    async fn sweep(&self) {
        self.entries.run_pending_tasks().await;
    }
}
