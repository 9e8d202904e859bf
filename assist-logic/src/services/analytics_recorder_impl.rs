use std::sync::Arc;

use assist_api::domain::analytics::{AnalyticsTurn, DailyMetrics, QueryFrequency};
use assist_api::domain::conversation::ConversationTurn;
use assist_api::error::{CoreError, CoreResult};
use assist_api::service::analytics_service::AnalyticsRecorder;
use assist_db::repository::AnalyticsRepository;
use async_trait::async_trait;
use uuid::Uuid;

use crate::mappers::{AnalyticsMapper, ConversationMapper};

/// Analytics Recorder: a thin repository wrapper. Idempotency on
/// `(session_id, user_turn_seq)` is enforced at the SQL layer (upsert
/// on-conflict-do-nothing), not here.
pub struct AnalyticsRecorderImpl {
    repository: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsRecorderImpl {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AnalyticsRecorder for AnalyticsRecorderImpl {
    async fn record(&self, turn: AnalyticsTurn) -> CoreResult<()> {
        let model = AnalyticsMapper::turn_to_model(turn).map_err(CoreError::Internal)?;
        self.repository.record(model).await.map_err(repo_err)
    }

    async fn daily_metrics(&self, last_n_days: u32) -> CoreResult<Vec<DailyMetrics>> {
        let rows = self.repository.daily_metrics(last_n_days).await.map_err(repo_err)?;
        rows.into_iter().map(|r| AnalyticsMapper::daily_metrics_from_row(r).map_err(CoreError::Internal)).collect()
    }

    async fn most_asked(&self, limit: usize) -> CoreResult<Vec<QueryFrequency>> {
        let rows = self.repository.most_asked(limit as i64).await.map_err(repo_err)?;
        Ok(rows.into_iter().map(AnalyticsMapper::query_frequency_from_row).collect())
    }

    async fn unanswered(&self, limit: usize) -> CoreResult<Vec<QueryFrequency>> {
        let rows = self.repository.unanswered(limit as i64).await.map_err(repo_err)?;
        Ok(rows.into_iter().map(AnalyticsMapper::query_frequency_from_row).collect())
    }

    async fn conversation_log(&self, session: Uuid) -> CoreResult<Vec<ConversationTurn>> {
        let models = self.repository.conversation_log(session).await.map_err(repo_err)?;
        models.into_iter().map(|m| ConversationMapper::turn_from_model(m).map_err(CoreError::Internal)).collect()
    }
}

fn repo_err(e: assist_db::repository::RepositoryError) -> CoreError {
    CoreError::Repository(e.to_string())
}
