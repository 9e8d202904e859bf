use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsTurnModel {
    pub session_id: Uuid,
    pub user_turn_seq: i64,
    pub query_text: String,
    pub normalized_query: String,
    pub was_answered: bool,
    pub backing_source: HeaplessString<20>,
    pub latency_ms: i64,
    pub created_at: DateTime<Utc>,
    pub client_ip: Option<HeaplessString<64>>,
}
