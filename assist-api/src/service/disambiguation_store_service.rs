use async_trait::async_trait;

use crate::domain::fee::DisambiguationOption;

/// Disambiguation Store: `put`/`take`/`sweep` over a short-lived keyed
/// store of pending multi-option fee queries. `take` is single-use: a
/// second `take` on the same token returns `None`.
#[async_trait]
pub trait DisambiguationStore: Send + Sync {
    async fn put(&self, options: Vec<DisambiguationOption>) -> String;
    async fn take(&self, token: &str) -> Option<Vec<DisambiguationOption>>;
    async fn sweep(&self);
}
