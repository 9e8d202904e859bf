use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The four product lines a fee rule can belong to. Each carries a master
/// table of its own; rules never cross product lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductLine {
    CreditCard,
    RetailAsset,
    SkyBanking,
    PriorityBanking,
}

/// Discriminator tuple that selects a rule inside a product line.
///
/// Credit-card and retail-asset discriminator shapes are named explicitly.
/// SkyBanking and PriorityBanking rows have no product-specific fields of
/// their own, so they are treated as a single `(charge_type, charge_context)`
/// pair like the retail-asset shape minus the product dimension (see
/// DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discriminators {
    Card(CardDiscriminators),
    RetailAsset(RetailAssetDiscriminators),
    Generic(GenericDiscriminators),
}

/// A rule's stored discriminator value for one field: either a concrete
/// value the query must match, or a declared wildcard that matches any
/// query value.
pub type RuleField = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDiscriminators {
    pub charge_type: String,
    pub card_category: RuleField,
    pub card_network: RuleField,
    pub card_product: RuleField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailAssetDiscriminators {
    pub loan_product: String,
    pub charge_type: String,
    pub charge_context: RuleField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDiscriminators {
    pub charge_type: String,
    pub charge_context: RuleField,
}

impl Discriminators {
    /// True if `self` (as stored on a rule row, wildcards allowed) matches
    /// `query` (concrete values only, supplied by the caller).
    pub fn matches(&self, query: &Discriminators) -> bool {
        match (self, query) {
            (Discriminators::Card(rule), Discriminators::Card(q)) => {
                rule.charge_type == q.charge_type
                    && field_matches(&rule.card_category, &q.card_category)
                    && field_matches(&rule.card_network, &q.card_network)
                    && field_matches(&rule.card_product, &q.card_product)
            }
            (Discriminators::RetailAsset(rule), Discriminators::RetailAsset(q)) => {
                rule.loan_product == q.loan_product
                    && rule.charge_type == q.charge_type
                    && field_matches(&rule.charge_context, &q.charge_context)
            }
            (Discriminators::Generic(rule), Discriminators::Generic(q)) => {
                rule.charge_type == q.charge_type
                    && field_matches(&rule.charge_context, &q.charge_context)
            }
            _ => false,
        }
    }

    pub fn charge_type(&self) -> &str {
        match self {
            Discriminators::Card(d) => &d.charge_type,
            Discriminators::RetailAsset(d) => &d.charge_type,
            Discriminators::Generic(d) => &d.charge_type,
        }
    }

    /// Returns a copy of `self` with `charge_type` replaced — used by the
    /// declared card-fee fallback mapping (spec open question b), which
    /// preserves every other discriminator while swapping in the generic
    /// charge type.
    pub fn with_charge_type(&self, charge_type: impl Into<String>) -> Discriminators {
        match self {
            Discriminators::Card(d) => Discriminators::Card(CardDiscriminators {
                charge_type: charge_type.into(),
                ..d.clone()
            }),
            Discriminators::RetailAsset(d) => Discriminators::RetailAsset(RetailAssetDiscriminators {
                charge_type: charge_type.into(),
                ..d.clone()
            }),
            Discriminators::Generic(d) => Discriminators::Generic(GenericDiscriminators {
                charge_type: charge_type.into(),
                ..d.clone()
            }),
        }
    }
}

fn field_matches(rule_field: &RuleField, query_field: &RuleField) -> bool {
    match rule_field {
        None => true, // declared wildcard
        Some(v) => query_field.as_deref() == Some(v.as_str()),
    }
}

/// One tier of a tiered fee. Within a `FeeValue::Tiered`, tiers must be
/// sorted ascending by `threshold` and every tier must carry a `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    pub threshold: Decimal,
    pub rate: Decimal,
    pub cap: Option<Decimal>,
    pub unit: String,
}

/// The discriminated fee value stored on a rule row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeeValue {
    Fixed {
        amount: Decimal,
        currency: String,
    },
    Percentage {
        rate: Decimal,
        min: Option<Decimal>,
        max: Option<Decimal>,
        currency: String,
    },
    Tiered {
        tiers: Vec<FeeTier>,
        currency: String,
    },
    FreeUpToN {
        n: u32,
    },
    NoteDeferred {
        note_reference: String,
    },
    Textual {
        text: String,
    },
}

impl FeeValue {
    /// Builds a tiered fee value, enforcing ascending thresholds and that
    /// every tier carries a unit.
    pub fn tiered(tiers: Vec<FeeTier>, currency: String) -> Result<Self, String> {
        if tiers.is_empty() {
            return Err("a tiered fee must declare at least one tier".to_string());
        }
        if tiers.iter().any(|t| t.unit.is_empty()) {
            return Err("every tier must declare a unit".to_string());
        }
        for pair in tiers.windows(2) {
            if pair[0].threshold >= pair[1].threshold {
                return Err("tier thresholds must be strictly ascending".to_string());
            }
        }
        Ok(FeeValue::Tiered { tiers, currency })
    }
}

/// How the fee is accrued — when it is charged, not how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeBasis {
    PerTransaction,
    PerYear,
    PerVisit,
    OnOutstanding,
}

/// Evaluation strategy layered on top of the stored `FeeValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeeCondition {
    None,
    WhicheverHigher,
    FreeUpToN(u32),
    NoteBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Active,
    Inactive,
}

/// One row in the active product-line table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeeRule {
    pub rule_id: Uuid,
    pub effective_from: chrono::NaiveDate,
    pub effective_to: Option<chrono::NaiveDate>,
    pub product_line: ProductLine,
    pub discriminators: Discriminators,
    pub fee: FeeValue,
    pub fee_basis: FeeBasis,
    pub condition: FeeCondition,
    #[validate(range(min = 0))]
    pub priority: i32,
    pub status: RuleStatus,
}

impl FeeRule {
    /// A rule must carry at least one of a numeric fee value, a tier block,
    /// a note reference, or verbatim text. `FeeValue` is already a closed
    /// enum so this always holds by construction, but validation at the
    /// repository write boundary re-checks it against malformed
    /// deserialized input (e.g. an empty tier list).
    pub fn validate_fee_shape(&self) -> Result<(), String> {
        match &self.fee {
            FeeValue::Tiered { tiers, .. } if tiers.is_empty() => {
                Err("tiered fee declares no tiers".to_string())
            }
            FeeValue::Textual { text } if text.trim().is_empty() => {
                Err("textual fee has empty text".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Half-open effective range containment: `effective_from` is active,
    /// `effective_to` is not.
    pub fn covers(&self, as_of: chrono::NaiveDate) -> bool {
        if as_of < self.effective_from {
            return false;
        }
        match self.effective_to {
            Some(to) => as_of < to,
            None => true,
        }
    }
}

/// Result of `RuleRepository::lookup`.
#[derive(Debug, Clone)]
pub enum RuleLookup {
    Unique(FeeRule),
    Ambiguous(Vec<FeeRule>),
    NotFound,
}

/// Context supplied alongside a resolve() call: the transaction amount (for
/// percentage/tiered rules), a caller-declared currency preference, and a
/// usage counter (for free-upto-N rules).
#[derive(Debug, Clone, Default)]
pub struct FeeQueryContext {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub usage_index: Option<u32>,
}

/// A distinguishing option offered back to the caller when a fee lookup
/// detects ambiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationOption {
    pub rule_id: Uuid,
    pub charge_context: Option<String>,
    pub card_product: Option<String>,
    pub description: String,
}

/// Public contract of the Fee Resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeeResult {
    Calculated {
        amount: Decimal,
        currency: String,
        basis: FeeBasis,
        rule_id: Uuid,
        remark: Option<String>,
    },
    NeedsNoteResolution {
        note_reference: String,
    },
    NeedsDisambiguation {
        token: String,
        options: Vec<DisambiguationOption>,
    },
    /// Open question (c): the rule's currency does not match the caller's
    /// declared currency and the core never converts. Distinct from
    /// `NotFound` so callers can tell "no rule" from "rule exists, wrong
    /// currency".
    FxRateRequired {
        rule_currency: String,
        requested_currency: String,
    },
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_effective_range() {
        let rule = FeeRule {
            rule_id: Uuid::nil(),
            effective_from: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            effective_to: Some(chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()),
            product_line: ProductLine::CreditCard,
            discriminators: Discriminators::Card(CardDiscriminators {
                charge_type: "ISSUANCE_ANNUAL_PRIMARY".into(),
                card_category: None,
                card_network: None,
                card_product: None,
            }),
            fee: FeeValue::Fixed { amount: Decimal::new(1150, 2), currency: "USD".into() },
            fee_basis: FeeBasis::PerYear,
            condition: FeeCondition::None,
            priority: 0,
            status: RuleStatus::Active,
        };
        assert!(rule.covers(chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(!rule.covers(chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()));
        assert!(rule.covers(chrono::NaiveDate::from_ymd_opt(2026, 5, 31).unwrap()));
    }

    #[test]
    fn tiered_requires_ascending_thresholds() {
        let bad = vec![
            FeeTier { threshold: Decimal::new(50, 0), rate: Decimal::new(1, 2), cap: None, unit: "BDT".into() },
            FeeTier { threshold: Decimal::new(50, 0), rate: Decimal::new(2, 2), cap: None, unit: "BDT".into() },
        ];
        assert!(FeeValue::tiered(bad, "BDT".into()).is_err());
    }

    #[test]
    fn wildcard_discriminator_matches_any_query_value() {
        let rule = Discriminators::Card(CardDiscriminators {
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".into(),
            card_category: None,
            card_network: Some("MASTERCARD".into()),
            card_product: None,
        });
        let query = Discriminators::Card(CardDiscriminators {
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".into(),
            card_category: Some("DEBIT".into()),
            card_network: Some("MASTERCARD".into()),
            card_product: Some("World RFCD".into()),
        });
        assert!(rule.matches(&query));
    }
}
