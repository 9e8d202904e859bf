use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{AnalyticsTurnModel, ConversationTurnModel};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone)]
pub struct DailyMetricsRow {
    pub day: NaiveDate,
    pub total_turns: i64,
    pub answered_turns: i64,
    pub by_source: Vec<(String, i64)>,
    pub average_latency_ms: f64,
}

#[derive(Debug, Clone)]
pub struct QueryFrequencyRow {
    pub normalized_query: String,
    pub count: i64,
}

/// Backing table for the Analytics Recorder. `record` is implemented
/// as an upsert-on-conflict-do-nothing against the
/// `(session_id, user_turn_seq)` unique index, giving idempotency without
/// an application-level existence check.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, turn: AnalyticsTurnModel) -> Result<(), RepositoryError>;
    async fn daily_metrics(&self, last_n_days: u32) -> Result<Vec<DailyMetricsRow>, RepositoryError>;
    async fn most_asked(&self, limit: i64) -> Result<Vec<QueryFrequencyRow>, RepositoryError>;
    async fn unanswered(&self, limit: i64) -> Result<Vec<QueryFrequencyRow>, RepositoryError>;
    async fn conversation_log(&self, session_id: Uuid) -> Result<Vec<ConversationTurnModel>, RepositoryError>;
}
