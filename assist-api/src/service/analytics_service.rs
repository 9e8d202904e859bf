use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::analytics::{AnalyticsTurn, DailyMetrics, QueryFrequency};
use crate::domain::conversation::ConversationTurn;
use crate::error::CoreResult;

/// Analytics Recorder. `record` is idempotent per
/// `(session_id, user_turn_seq)`.
#[async_trait]
pub trait AnalyticsRecorder: Send + Sync {
    async fn record(&self, turn: AnalyticsTurn) -> CoreResult<()>;

    async fn daily_metrics(&self, last_n_days: u32) -> CoreResult<Vec<DailyMetrics>>;

    async fn most_asked(&self, limit: usize) -> CoreResult<Vec<QueryFrequency>>;

    async fn unanswered(&self, limit: usize) -> CoreResult<Vec<QueryFrequency>>;

    async fn conversation_log(&self, session: Uuid) -> CoreResult<Vec<ConversationTurn>>;
}
