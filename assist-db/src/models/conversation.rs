use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurnModel {
    pub session_id: Uuid,
    pub role: HeaplessString<12>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
