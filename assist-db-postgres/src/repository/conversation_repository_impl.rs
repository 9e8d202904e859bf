use async_trait::async_trait;
use assist_db::models::ConversationTurnModel;
use assist_db::repository::{ConversationRepository, RepositoryError};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::utils::{get_heapless_string, TryFromRow};

/// Postgres-backed Conversation Memory. A window of `n` turns is
/// cheap here: `(session_id, timestamp)` is the table's natural access
/// path and carries a btree index.
pub struct ConversationRepositoryImpl {
    pool: PgPool,
}

impl ConversationRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFromRow<sqlx::postgres::PgRow> for ConversationTurnModel {
    fn try_from_row(row: &sqlx::postgres::PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(ConversationTurnModel {
            session_id: row.try_get("session_id")?,
            role: get_heapless_string(row, "role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

#[async_trait]
impl ConversationRepository for ConversationRepositoryImpl {
    async fn append(&self, turn: ConversationTurnModel) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO conversation_turns (session_id, role, content, timestamp) VALUES ($1, $2, $3, $4)")
            .bind(turn.session_id)
            .bind(turn.role.as_str())
            .bind(&turn.content)
            .bind(turn.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!("failed to append conversation turn for session {}: {e}", turn.session_id);
                RepositoryError::Backend(e.to_string())
            })?;
        Ok(())
    }

    async fn recent(&self, session_id: Uuid, n: i64) -> Result<Vec<ConversationTurnModel>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, role, content, timestamp FROM (
                SELECT session_id, role, content, timestamp
                FROM conversation_turns
                WHERE session_id = $1
                ORDER BY timestamp DESC
                LIMIT $2
            ) recent_window
            ORDER BY timestamp ASC
            "#,
        )
        .bind(session_id)
        .bind(n)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(ConversationTurnModel::try_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM conversation_turns WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Backend(e.to_string()))?;
        tracing::debug!("cleared conversation memory for session {session_id}");
        Ok(())
    }
}
