use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackingSource {
    FeeEngine,
    KnowledgeStore,
    Directory,
    ModelOnly,
    None,
}

/// One recorded turn for aggregation. `user_turn_seq` is a per-session
/// monotonically increasing counter, carried alongside `session_id` as the
/// idempotency key for `record`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsTurn {
    pub session_id: Uuid,
    pub user_turn_seq: i64,
    pub query_text: String,
    pub normalized_query: String,
    pub was_answered: bool,
    pub backing_source: BackingSource,
    pub latency_ms: i64,
    pub created_at: DateTime<Utc>,
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub day: NaiveDate,
    pub total_turns: i64,
    pub answered_turns: i64,
    pub by_source: Vec<(BackingSource, i64)>,
    pub average_latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFrequency {
    pub normalized_query: String,
    pub count: i64,
}
