use async_trait::async_trait;
use assist_api::domain::fee::Discriminators;
use assist_db::models::FeeRuleModel;
use assist_db::repository::{RepositoryError, RuleFilters, RuleLookupRow, RuleRepository};
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::utils::{get_heapless_string, TryFromRow};

/// Postgres-backed Rule Store.
///
/// At most one active row per `(product_line, discriminators,
/// effective_from)`, and no overlapping active effective ranges for the
/// same discriminators, are enforced by two database constraints, not by
/// application code:
///
/// ```sql
/// create extension if not exists btree_gist;
///
/// create table fee_rules (
///     rule_id              uuid primary key,
///     effective_from       date not null,
///     effective_to         date,
///     product_line         text not null,
///     charge_type           text not null,
///     discriminators        jsonb not null,
///     discriminator_hash    bytea not null,
///     fee                   jsonb not null,
///     fee_basis             text not null,
///     condition             jsonb not null,
///     priority              int not null default 0,
///     status                text not null default 'active'
/// );
///
/// create unique index fee_rules_i1
///     on fee_rules (product_line, discriminator_hash, effective_from)
///     where status = 'active';
///
/// alter table fee_rules add constraint fee_rules_i2 exclude using gist (
///     product_line with =,
///     discriminator_hash with =,
///     daterange(effective_from, effective_to) with &&
/// ) where (status = 'active');
/// ```
///
/// `discriminator_hash` is a blake3 hash of the canonical discriminator JSON,
/// computed by the writer (the out-of-scope admin path) before `insert_rule`
/// is called — a fixed-width `bytea` is what the gist exclusion constraint
/// needs to compare, and jsonb has no native equality operator class for it.
pub struct RuleRepositoryImpl {
    pool: PgPool,
}

impl RuleRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFromRow<sqlx::postgres::PgRow> for FeeRuleModel {
    fn try_from_row(row: &sqlx::postgres::PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(FeeRuleModel {
            rule_id: row.try_get("rule_id")?,
            effective_from: row.try_get("effective_from")?,
            effective_to: row.try_get("effective_to")?,
            product_line: get_heapless_string(row, "product_line")?,
            discriminators: row.try_get("discriminators")?,
            discriminator_hash: {
                let bytes: Vec<u8> = row.try_get("discriminator_hash")?;
                let mut buf = [0u8; 32];
                if bytes.len() == 32 {
                    buf.copy_from_slice(&bytes);
                }
                buf
            },
            fee: row.try_get("fee")?,
            fee_basis: get_heapless_string(row, "fee_basis")?,
            condition: row.try_get("condition")?,
            priority: row.try_get("priority")?,
            status: get_heapless_string(row, "status")?,
        })
    }
}

#[async_trait]
impl RuleRepository for RuleRepositoryImpl {
    async fn lookup(
        &self,
        product_line: &str,
        charge_type: &str,
        query_discriminators: &serde_json::Value,
        as_of_date: NaiveDate,
    ) -> Result<RuleLookupRow, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT rule_id, effective_from, effective_to, product_line, discriminators,
                   discriminator_hash, fee, fee_basis, condition, priority, status
            FROM fee_rules
            WHERE product_line = $1
              AND charge_type = $2
              AND status = 'active'
              AND effective_from <= $3
              AND (effective_to IS NULL OR effective_to > $3)
            "#,
        )
        .bind(product_line)
        .bind(charge_type)
        .bind(as_of_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        let query: Discriminators = serde_json::from_value(query_discriminators.clone())
            .map_err(|e| RepositoryError::Backend(format!("invalid query discriminators: {e}")))?;

        let mut candidates = Vec::new();
        for row in &rows {
            let model = FeeRuleModel::try_from_row(row).map_err(|e| RepositoryError::Backend(e.to_string()))?;
            let rule_discriminators: Discriminators = serde_json::from_value(model.discriminators.clone())
                .map_err(|e| RepositoryError::Backend(format!("corrupt rule discriminators: {e}")))?;
            if rule_discriminators.matches(&query) {
                candidates.push(model);
            }
        }

        if candidates.is_empty() {
            return Ok(RuleLookupRow::NotFound);
        }

        let max_priority = candidates.iter().map(|c| c.priority).max().unwrap();
        let mut top: Vec<FeeRuleModel> = candidates
            .into_iter()
            .filter(|c| c.priority == max_priority)
            .collect();

        if top.len() == 1 {
            Ok(RuleLookupRow::Unique(top.pop().unwrap()))
        } else {
            tracing::warn!(
                "ambiguous rule lookup: {} rows tied at priority {max_priority} for {product_line}/{charge_type}",
                top.len()
            );
            Ok(RuleLookupRow::Ambiguous(top))
        }
    }

    async fn list(
        &self,
        filters: RuleFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeeRuleModel>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT rule_id, effective_from, effective_to, product_line, discriminators,
                   discriminator_hash, fee, fee_basis, condition, priority, status
            FROM fee_rules
            WHERE ($1::text IS NULL OR product_line = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR charge_type = $3)
            ORDER BY effective_from DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.product_line)
        .bind(filters.status)
        .bind(filters.charge_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| FeeRuleModel::try_from_row(row).map_err(|e| RepositoryError::Backend(e.to_string())))
            .collect()
    }

    async fn insert_rule(&self, rule: FeeRuleModel) -> Result<FeeRuleModel, RepositoryError> {
        let charge_type = rule
            .discriminators
            .get("charge_type")
            .and_then(|v| v.as_str())
            .or_else(|| {
                // nested shapes (Card/RetailAsset/Generic) store charge_type one level down
                rule.discriminators
                    .as_object()
                    .and_then(|o| o.values().next())
                    .and_then(|inner| inner.get("charge_type"))
                    .and_then(|v| v.as_str())
            })
            .ok_or_else(|| RepositoryError::Backend("discriminators missing charge_type".to_string()))?
            .to_string();

        let row = sqlx::query(
            r#"
            INSERT INTO fee_rules (
                rule_id, effective_from, effective_to, product_line, charge_type,
                discriminators, discriminator_hash, fee, fee_basis, condition, priority, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING rule_id, effective_from, effective_to, product_line, discriminators,
                      discriminator_hash, fee, fee_basis, condition, priority, status
            "#,
        )
        .bind(rule.rule_id)
        .bind(rule.effective_from)
        .bind(rule.effective_to)
        .bind(rule.product_line.as_str())
        .bind(charge_type)
        .bind(&rule.discriminators)
        .bind(rule.discriminator_hash.to_vec())
        .bind(&rule.fee)
        .bind(rule.fee_basis.as_str())
        .bind(&rule.condition)
        .bind(rule.priority)
        .bind(rule.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        FeeRuleModel::try_from_row(&row).map_err(|e| RepositoryError::Backend(e.to_string()))
    }
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            tracing::warn!("rule insert rejected by unique constraint: {}", db_err.message());
            return RepositoryError::UniqueViolation(db_err.message().to_string());
        }
        if db_err.code().as_deref() == Some("23P01") {
            tracing::warn!("rule insert rejected by overlap constraint: {}", db_err.message());
            return RepositoryError::OverlapViolation(db_err.message().to_string());
        }
    }
    RepositoryError::Backend(e.to_string())
}
