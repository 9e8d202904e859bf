use chrono::NaiveDate;
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database model for a fee rule row. Variant-typed fields
/// (`discriminators`, `fee`, `condition`) are stored as JSON — the natural
/// Postgres-native shape for a discriminated union that has no fixed
/// column layout.
///
/// `discriminator_hash` is a generated column (`blake3` over the
/// canonicalized discriminator JSON) used by the uniqueness and overlap
/// constraints — see `assist-db-postgres::repository::rule_repository_impl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRuleModel {
    pub rule_id: Uuid,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub product_line: HeaplessString<24>,
    pub discriminators: serde_json::Value,
    pub discriminator_hash: [u8; 32],
    pub fee: serde_json::Value,
    pub fee_basis: HeaplessString<24>,
    pub condition: serde_json::Value,
    pub priority: i32,
    pub status: HeaplessString<12>,
}
