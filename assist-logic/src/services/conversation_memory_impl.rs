use std::sync::Arc;

use assist_api::domain::conversation::{ConversationTurn, Role};
use assist_api::error::{CoreError, CoreResult};
use assist_api::service::conversation_memory_service::ConversationMemory;
use assist_db::repository::ConversationRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::mappers::ConversationMapper;

/// Conversation Memory: a thin repository wrapper, mapping between the
/// domain `ConversationTurn` and its bounded-string DB model.
pub struct ConversationMemoryImpl {
    repository: Arc<dyn ConversationRepository>,
}

impl ConversationMemoryImpl {
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ConversationMemory for ConversationMemoryImpl {
    async fn append(&self, session: Uuid, role: Role, content: String, ts: DateTime<Utc>) -> CoreResult<()> {
        let turn = ConversationTurn { session_id: session, role, content, timestamp: ts };
        let model = ConversationMapper::turn_to_model(turn).map_err(CoreError::Internal)?;
        self.repository.append(model).await.map_err(repo_err)
    }

    async fn recent(&self, session: Uuid, n: usize) -> CoreResult<Vec<ConversationTurn>> {
        let models = self.repository.recent(session, n as i64).await.map_err(repo_err)?;
        models.into_iter().map(|m| ConversationMapper::turn_from_model(m).map_err(CoreError::Internal)).collect()
    }

    async fn clear(&self, session: Uuid) -> CoreResult<()> {
        self.repository.clear(session).await.map_err(repo_err)
    }
}

fn repo_err(e: assist_db::repository::RepositoryError) -> CoreError {
    CoreError::Repository(e.to_string())
}
