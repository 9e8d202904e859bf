use std::str::FromStr;

use assist_api::domain::fee::{Discriminators, FeeBasis, FeeCondition, FeeRule, FeeValue, ProductLine, RuleStatus};
use assist_api::error::{CoreError, CoreResult};
use assist_db::models::FeeRuleModel;
use heapless::String as HeaplessString;
use validator::Validate;

pub struct FeeMapper;

impl FeeMapper {
    /// Map from domain `FeeRule` to database `FeeRuleModel`. Used by the
    /// (out-of-scope) admin write path only; the core never inserts rules.
    /// Runs both the derived field validation and the fee-shape check before
    /// a rule is allowed to reach `RuleRepository::insert_rule`.
    pub fn fee_rule_to_model(rule: FeeRule) -> CoreResult<FeeRuleModel> {
        rule.validate().map_err(|e| CoreError::ValidationFailed(e.to_string()))?;
        rule.validate_fee_shape().map_err(CoreError::ValidationFailed)?;
        let discriminator_hash = Self::hash_discriminators(&rule.discriminators);
        Ok(FeeRuleModel {
            rule_id: rule.rule_id,
            effective_from: rule.effective_from,
            effective_to: rule.effective_to,
            product_line: HeaplessString::from_str(product_line_str(rule.product_line))
                .map_err(|_| CoreError::ValidationFailed("product_line too long".to_string()))?,
            discriminators: serde_json::to_value(&rule.discriminators).map_err(|e| CoreError::Internal(e.to_string()))?,
            discriminator_hash,
            fee: serde_json::to_value(&rule.fee).map_err(|e| CoreError::Internal(e.to_string()))?,
            fee_basis: HeaplessString::from_str(fee_basis_str(rule.fee_basis))
                .map_err(|_| CoreError::ValidationFailed("fee_basis too long".to_string()))?,
            condition: serde_json::to_value(&rule.condition).map_err(|e| CoreError::Internal(e.to_string()))?,
            priority: rule.priority,
            status: HeaplessString::from_str(status_str(rule.status))
                .map_err(|_| CoreError::ValidationFailed("status too long".to_string()))?,
        })
    }

    /// Map from database `FeeRuleModel` to domain `FeeRule`.
    pub fn fee_rule_from_model(model: &FeeRuleModel) -> Result<FeeRule, String> {
        let discriminators: Discriminators =
            serde_json::from_value(model.discriminators.clone()).map_err(|e| e.to_string())?;
        let fee: FeeValue = serde_json::from_value(model.fee.clone()).map_err(|e| e.to_string())?;
        let condition: FeeCondition = serde_json::from_value(model.condition.clone()).map_err(|e| e.to_string())?;

        let rule = FeeRule {
            rule_id: model.rule_id,
            effective_from: model.effective_from,
            effective_to: model.effective_to,
            product_line: product_line_from_str(model.product_line.as_str())?,
            discriminators,
            fee,
            fee_basis: fee_basis_from_str(model.fee_basis.as_str())?,
            condition,
            priority: model.priority,
            status: status_from_str(model.status.as_str())?,
        };
        rule.validate_fee_shape()?;
        Ok(rule)
    }

    /// Canonical content hash of a rule's discriminator tuple, used by the
    /// database's uniqueness and overlap constraints. `serde_json` preserves a derived enum's
    /// field order deterministically, so the same logical discriminators
    /// always hash the same way.
    pub fn hash_discriminators(discriminators: &Discriminators) -> [u8; 32] {
        let canonical = serde_json::to_vec(discriminators).unwrap_or_default();
        *blake3::hash(&canonical).as_bytes()
    }
}

fn product_line_str(p: ProductLine) -> &'static str {
    match p {
        ProductLine::CreditCard => "credit-card",
        ProductLine::RetailAsset => "retail-asset",
        ProductLine::SkyBanking => "sky-banking",
        ProductLine::PriorityBanking => "priority-banking",
    }
}

fn product_line_from_str(s: &str) -> Result<ProductLine, String> {
    match s {
        "credit-card" => Ok(ProductLine::CreditCard),
        "retail-asset" => Ok(ProductLine::RetailAsset),
        "sky-banking" => Ok(ProductLine::SkyBanking),
        "priority-banking" => Ok(ProductLine::PriorityBanking),
        other => Err(format!("unknown product_line '{other}'")),
    }
}

fn fee_basis_str(b: FeeBasis) -> &'static str {
    match b {
        FeeBasis::PerTransaction => "PER_TRANSACTION",
        FeeBasis::PerYear => "PER_YEAR",
        FeeBasis::PerVisit => "PER_VISIT",
        FeeBasis::OnOutstanding => "ON_OUTSTANDING",
    }
}

fn fee_basis_from_str(s: &str) -> Result<FeeBasis, String> {
    match s {
        "PER_TRANSACTION" => Ok(FeeBasis::PerTransaction),
        "PER_YEAR" => Ok(FeeBasis::PerYear),
        "PER_VISIT" => Ok(FeeBasis::PerVisit),
        "ON_OUTSTANDING" => Ok(FeeBasis::OnOutstanding),
        other => Err(format!("unknown fee_basis '{other}'")),
    }
}

fn status_str(s: RuleStatus) -> &'static str {
    match s {
        RuleStatus::Active => "active",
        RuleStatus::Inactive => "inactive",
    }
}

fn status_from_str(s: &str) -> Result<RuleStatus, String> {
    match s {
        "active" => Ok(RuleStatus::Active),
        "inactive" => Ok(RuleStatus::Inactive),
        other => Err(format!("unknown status '{other}'")),
    }
}
