use async_trait::async_trait;
use assist_db::models::{AnalyticsTurnModel, ConversationTurnModel};
use assist_db::repository::{AnalyticsRepository, DailyMetricsRow, QueryFrequencyRow, RepositoryError};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

/// Postgres-backed Analytics Recorder.
///
/// `record` upserts on the `(session_id, user_turn_seq)` unique index with
/// `DO NOTHING`: a retried write (e.g. the orchestrator re-sends after a
/// timed-out response) is a no-op rather than a duplicate row.
///
/// ```sql
/// create unique index analytics_turns_dedup on analytics_turns (session_id, user_turn_seq);
/// ```
pub struct AnalyticsRepositoryImpl {
    pool: PgPool,
}

impl AnalyticsRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFromRow<sqlx::postgres::PgRow> for AnalyticsTurnModel {
    fn try_from_row(row: &sqlx::postgres::PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(AnalyticsTurnModel {
            session_id: row.try_get("session_id")?,
            user_turn_seq: row.try_get("user_turn_seq")?,
            query_text: row.try_get("query_text")?,
            normalized_query: row.try_get("normalized_query")?,
            was_answered: row.try_get("was_answered")?,
            backing_source: get_heapless_string(row, "backing_source")?,
            latency_ms: row.try_get("latency_ms")?,
            created_at: row.try_get("created_at")?,
            client_ip: get_optional_heapless_string(row, "client_ip")?,
        })
    }
}

#[async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    async fn record(&self, turn: AnalyticsTurnModel) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO analytics_turns (
                session_id, user_turn_seq, query_text, normalized_query, was_answered,
                backing_source, latency_ms, created_at, client_ip
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id, user_turn_seq) DO NOTHING
            "#,
        )
        .bind(turn.session_id)
        .bind(turn.user_turn_seq)
        .bind(&turn.query_text)
        .bind(&turn.normalized_query)
        .bind(turn.was_answered)
        .bind(turn.backing_source.as_str())
        .bind(turn.latency_ms)
        .bind(turn.created_at)
        .bind(turn.client_ip.as_ref().map(|s| s.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                "duplicate analytics write ignored for session {} turn {}",
                turn.session_id,
                turn.user_turn_seq
            );
        }
        Ok(())
    }

    async fn daily_metrics(&self, last_n_days: u32) -> Result<Vec<DailyMetricsRow>, RepositoryError> {
        let day_rows = sqlx::query(
            r#"
            SELECT created_at::date AS day,
                   count(*) AS total_turns,
                   count(*) FILTER (WHERE was_answered) AS answered_turns,
                   avg(latency_ms)::float8 AS average_latency_ms
            FROM analytics_turns
            WHERE created_at >= now() - ($1 || ' days')::interval
            GROUP BY day
            ORDER BY day DESC
            "#,
        )
        .bind(last_n_days as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        let source_rows = sqlx::query(
            r#"
            SELECT created_at::date AS day, backing_source, count(*) AS cnt
            FROM analytics_turns
            WHERE created_at >= now() - ($1 || ' days')::interval
            GROUP BY day, backing_source
            "#,
        )
        .bind(last_n_days as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        let mut result = Vec::with_capacity(day_rows.len());
        for row in &day_rows {
            let day: chrono::NaiveDate = row.try_get("day").map_err(|e| RepositoryError::Backend(e.to_string()))?;
            let by_source = source_rows
                .iter()
                .filter(|r| r.try_get::<chrono::NaiveDate, _>("day").ok() == Some(day))
                .map(|r| -> Result<(String, i64), RepositoryError> {
                    let source: String = r.try_get("backing_source").map_err(|e| RepositoryError::Backend(e.to_string()))?;
                    let cnt: i64 = r.try_get("cnt").map_err(|e| RepositoryError::Backend(e.to_string()))?;
                    Ok((source, cnt))
                })
                .collect::<Result<Vec<_>, _>>()?;

            result.push(DailyMetricsRow {
                day,
                total_turns: row.try_get("total_turns").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                answered_turns: row.try_get("answered_turns").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                by_source,
                average_latency_ms: row.try_get("average_latency_ms").map_err(|e| RepositoryError::Backend(e.to_string()))?,
            });
        }
        Ok(result)
    }

    async fn most_asked(&self, limit: i64) -> Result<Vec<QueryFrequencyRow>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT normalized_query, count(*) AS count
            FROM analytics_turns
            GROUP BY normalized_query
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(QueryFrequencyRow {
                    normalized_query: row.try_get("normalized_query").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                    count: row.try_get("count").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn unanswered(&self, limit: i64) -> Result<Vec<QueryFrequencyRow>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT normalized_query, count(*) AS count
            FROM analytics_turns
            WHERE NOT was_answered
            GROUP BY normalized_query
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(QueryFrequencyRow {
                    normalized_query: row.try_get("normalized_query").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                    count: row.try_get("count").map_err(|e| RepositoryError::Backend(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn conversation_log(&self, session_id: Uuid) -> Result<Vec<ConversationTurnModel>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT session_id, role, content, timestamp FROM conversation_turns WHERE session_id = $1 ORDER BY timestamp ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(ConversationTurnModel::try_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Backend(e.to_string()))
    }
}
