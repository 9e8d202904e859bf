use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::FeeRuleModel;
use crate::repository::errors::RepositoryError;

/// Result of a rule lookup: a tri-state, not a plain `Option`, because
/// "multiple active matches" is a distinct, meaningful outcome from
/// "no match".
#[derive(Debug, Clone)]
pub enum RuleLookupRow {
    Unique(FeeRuleModel),
    Ambiguous(Vec<FeeRuleModel>),
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct RuleFilters {
    pub product_line: Option<String>,
    pub status: Option<String>,
    pub charge_type: Option<String>,
}

/// Rule Store: typed read access to fee rules, plus the write path
/// used by the (out-of-scope) admin surface — the core itself never
/// mutates rows.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// `charge_type` is a real, indexed column and narrows the SQL scan;
    /// `query_discriminators` carries the caller's full concrete
    /// discriminator tuple (as JSON) so the wildcard-aware comparison
    /// against each candidate row's stored discriminators — a rule field
    /// of `null` matches any query value — happens once against a small,
    /// already-narrowed candidate set rather than in SQL.
    async fn lookup(
        &self,
        product_line: &str,
        charge_type: &str,
        query_discriminators: &serde_json::Value,
        as_of_date: NaiveDate,
    ) -> Result<RuleLookupRow, RepositoryError>;

    async fn list(
        &self,
        filters: RuleFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeeRuleModel>, RepositoryError>;

    /// Used by the external admin path only; the core never calls this.
    async fn insert_rule(&self, rule: FeeRuleModel) -> Result<FeeRuleModel, RepositoryError>;
}
