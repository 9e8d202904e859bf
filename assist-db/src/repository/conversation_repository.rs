use async_trait::async_trait;
use uuid::Uuid;

use crate::models::ConversationTurnModel;
use crate::repository::errors::RepositoryError;

/// Backing table for Conversation Memory. `recent` orders by
/// `(session_id, timestamp)` ascending at the SQL level.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn append(&self, turn: ConversationTurnModel) -> Result<(), RepositoryError>;
    async fn recent(&self, session_id: Uuid, n: i64) -> Result<Vec<ConversationTurnModel>, RepositoryError>;
    async fn clear(&self, session_id: Uuid) -> Result<(), RepositoryError>;
}
