use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::fee::DisambiguationOption;

/// Default TTL for a pending disambiguation.
pub const DEFAULT_DISAMBIGUATION_TTL_SECS: u64 = 15 * 60;

/// A short-lived keyed record of pending fee-rule options awaiting a
/// follow-up turn's selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationEntry {
    pub token: String,
    pub options: Vec<DisambiguationOption>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
