use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::conversation::{ConversationTurn, Role};
use crate::error::CoreResult;

/// Conversation Memory: per-session append-only message log with
/// bounded retrieval. `recent` returns the last `n` turns in
/// chronological order.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    async fn append(
        &self,
        session: Uuid,
        role: Role,
        content: String,
        ts: DateTime<Utc>,
    ) -> CoreResult<()>;

    async fn recent(&self, session: Uuid, n: usize) -> CoreResult<Vec<ConversationTurn>>;

    async fn clear(&self, session: Uuid) -> CoreResult<()>;
}
