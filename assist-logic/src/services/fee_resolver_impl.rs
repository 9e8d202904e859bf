use std::sync::Arc;
use std::time::Duration;

use assist_api::domain::fee::{
    DisambiguationOption, FeeCondition, FeeQueryContext, FeeResult, FeeRule, FeeValue, ProductLine,
};
use assist_api::domain::fee::Discriminators;
use assist_api::service::disambiguation_store_service::DisambiguationStore;
use assist_api::service::fee_resolver_service::FeeResolver;
use assist_db::repository::{RuleFilters, RuleLookupRow, RuleRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::mappers::FeeMapper;

/// Generic fallback `charge_type`: a query that maps to a specialized,
/// unfound charge type is retried once against this declared generic charge
/// type, preserving every other discriminator field.
pub(crate) const GENERIC_FALLBACK_CHARGE_TYPE: &str = "processing-fee";

/// Fee Resolver: deterministic rule evaluation over the rule store, with
/// the disambiguation store used only to mint a token when the lookup
/// reports ambiguity.
pub struct FeeResolverImpl {
    rule_repository: Arc<dyn RuleRepository>,
    disambiguation_store: Arc<dyn DisambiguationStore>,
    timeout: Duration,
}

impl FeeResolverImpl {
    pub fn new(rule_repository: Arc<dyn RuleRepository>, disambiguation_store: Arc<dyn DisambiguationStore>) -> Self {
        Self::with_timeout(rule_repository, disambiguation_store, Duration::from_millis(5_000))
    }

    pub fn with_timeout(
        rule_repository: Arc<dyn RuleRepository>,
        disambiguation_store: Arc<dyn DisambiguationStore>,
        timeout: Duration,
    ) -> Self {
        Self { rule_repository, disambiguation_store, timeout }
    }

    async fn lookup_rules(
        &self,
        product_line: ProductLine,
        discriminators: &Discriminators,
        as_of_date: NaiveDate,
    ) -> Result<RuleLookupRow, String> {
        let query_json = serde_json::to_value(discriminators).map_err(|e| e.to_string())?;
        tokio::time::timeout(
            self.timeout,
            self.rule_repository
                .lookup(product_line_str(product_line), discriminators.charge_type(), &query_json, as_of_date),
        )
        .await
        .map_err(|_| "fee engine lookup timed out".to_string())?
        .map_err(|e| e.to_string())
    }

    /// `free-upto-N`: when the caller's usage has exhausted the free tier,
    /// evaluate the next-priority matching rule rather than declare
    /// NotFound.
    async fn next_priority_rule(
        &self,
        product_line: ProductLine,
        discriminators: &Discriminators,
        as_of_date: NaiveDate,
        exclude_rule_id: uuid::Uuid,
    ) -> Result<Option<FeeRule>, String> {
        let rows = tokio::time::timeout(
            self.timeout,
            self.rule_repository.list(
                RuleFilters {
                    product_line: Some(product_line_str(product_line).to_string()),
                    status: Some("active".to_string()),
                    charge_type: Some(discriminators.charge_type().to_string()),
                },
                100,
                0,
            ),
        )
        .await
        .map_err(|_| "fee engine lookup timed out".to_string())?
        .map_err(|e| e.to_string())?;

        let mut candidates = Vec::new();
        for model in rows {
            if model.rule_id == exclude_rule_id {
                continue;
            }
            let rule = FeeMapper::fee_rule_from_model(&model)?;
            if rule.discriminators.matches(discriminators) && rule.covers(as_of_date) {
                candidates.push(rule);
            }
        }
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(candidates.into_iter().next())
    }
}

#[async_trait]
impl FeeResolver for FeeResolverImpl {
    async fn resolve(
        &self,
        product_line: ProductLine,
        discriminators: Discriminators,
        as_of_date: NaiveDate,
        context: FeeQueryContext,
    ) -> FeeResult {
        let lookup = match self.lookup_rules(product_line, &discriminators, as_of_date).await {
            Ok(row) => row,
            Err(_) => RuleLookupRow::NotFound,
        };

        match lookup {
            RuleLookupRow::Unique(model) => match FeeMapper::fee_rule_from_model(&model) {
                Ok(rule) => self.evaluate(rule, product_line, &discriminators, as_of_date, context).await,
                Err(_) => FeeResult::NotFound,
            },
            RuleLookupRow::Ambiguous(models) => {
                let rules: Vec<FeeRule> = models.iter().filter_map(|m| FeeMapper::fee_rule_from_model(m).ok()).collect();

                // Currency preference narrows ties before declaring ambiguity.
                if let Some(wanted) = &context.currency {
                    let narrowed: Vec<&FeeRule> =
                        rules.iter().filter(|r| fee_currency(&r.fee).map(|c| c == wanted.as_str()).unwrap_or(true)).collect();
                    if narrowed.len() == 1 {
                        let rule = narrowed[0].clone();
                        return self.evaluate(rule, product_line, &discriminators, as_of_date, context).await;
                    }
                }

                let options: Vec<DisambiguationOption> = rules
                    .iter()
                    .map(|r| DisambiguationOption {
                        rule_id: r.rule_id,
                        charge_context: discriminator_charge_context(&r.discriminators),
                        card_product: discriminator_card_product(&r.discriminators),
                        description: format!("{:?} rule {}", r.fee_basis, r.rule_id),
                    })
                    .collect();

                let token = self.disambiguation_store.put(options.clone()).await;
                FeeResult::NeedsDisambiguation { token, options }
            }
            RuleLookupRow::NotFound => {
                let fallback_charge_type = discriminators.charge_type();
                if fallback_charge_type == GENERIC_FALLBACK_CHARGE_TYPE {
                    return FeeResult::NotFound;
                }
                let fallback_discriminators = discriminators.with_charge_type(GENERIC_FALLBACK_CHARGE_TYPE);
                match self.lookup_rules(product_line, &fallback_discriminators, as_of_date).await {
                    Ok(RuleLookupRow::Unique(model)) => match FeeMapper::fee_rule_from_model(&model) {
                        Ok(rule) => self.evaluate(rule, product_line, &fallback_discriminators, as_of_date, context).await,
                        Err(_) => FeeResult::NotFound,
                    },
                    _ => FeeResult::NotFound,
                }
            }
        }
    }
}

impl FeeResolverImpl {
    fn evaluate<'a>(
        &'a self,
        rule: FeeRule,
        product_line: ProductLine,
        discriminators: &'a Discriminators,
        as_of_date: NaiveDate,
        context: FeeQueryContext,
    ) -> futures::future::BoxFuture<'a, FeeResult> {
        Box::pin(async move {
        if let FeeCondition::NoteBased = rule.condition {
            let note_reference = match &rule.fee {
                FeeValue::NoteDeferred { note_reference } => note_reference.clone(),
                _ => rule.rule_id.to_string(),
            };
            return FeeResult::NeedsNoteResolution { note_reference };
        }

        if let FeeValue::NoteDeferred { note_reference } = &rule.fee {
            return FeeResult::NeedsNoteResolution { note_reference: note_reference.clone() };
        }

        if let FeeCondition::FreeUpToN(n) = rule.condition {
            let used = context.usage_index.unwrap_or(0);
            if used <= n {
                return FeeResult::Calculated {
                    amount: Decimal::ZERO,
                    currency: fee_currency(&rule.fee).unwrap_or("USD").to_string(),
                    basis: rule.fee_basis,
                    rule_id: rule.rule_id,
                    remark: Some("within free usage allowance".to_string()),
                };
            }
            return match self.next_priority_rule(product_line, discriminators, as_of_date, rule.rule_id).await {
                Ok(Some(next_rule)) => self.evaluate(next_rule, product_line, discriminators, as_of_date, context).await,
                _ => FeeResult::NotFound,
            };
        }

        if let Some(rule_currency) = fee_currency(&rule.fee) {
            if let Some(requested) = &context.currency {
                if requested != rule_currency {
                    return FeeResult::FxRateRequired {
                        rule_currency: rule_currency.to_string(),
                        requested_currency: requested.clone(),
                    };
                }
            }
        }

        match &rule.fee {
            FeeValue::Fixed { amount, currency } => {
                FeeResult::Calculated { amount: *amount, currency: currency.clone(), basis: rule.fee_basis, rule_id: rule.rule_id, remark: None }
            }
            FeeValue::Percentage { rate, min, max, currency } => {
                let base = context.amount.unwrap_or(Decimal::ZERO);
                let mut amount = base * rate;
                if let Some(floor) = min {
                    amount = amount.max(*floor);
                }
                if let Some(ceiling) = max {
                    amount = amount.min(*ceiling);
                }
                FeeResult::Calculated { amount, currency: currency.clone(), basis: rule.fee_basis, rule_id: rule.rule_id, remark: None }
            }
            FeeValue::Tiered { tiers, currency } => {
                let base = context.amount.unwrap_or(Decimal::ZERO);
                let tier = tiers.iter().rev().find(|t| base >= t.threshold).or_else(|| tiers.first());
                match tier {
                    Some(tier) => {
                        let mut amount = base * tier.rate;
                        if let Some(cap) = tier.cap {
                            amount = amount.min(cap);
                        }
                        FeeResult::Calculated { amount, currency: currency.clone(), basis: rule.fee_basis, rule_id: rule.rule_id, remark: None }
                    }
                    None => FeeResult::NotFound,
                }
            }
            FeeValue::FreeUpToN { n } => FeeResult::Calculated {
                amount: Decimal::ZERO,
                currency: "USD".to_string(),
                basis: rule.fee_basis,
                rule_id: rule.rule_id,
                remark: Some(format!("free up to {n} uses")),
            },
            FeeValue::NoteDeferred { note_reference } => {
                FeeResult::NeedsNoteResolution { note_reference: note_reference.clone() }
            }
            FeeValue::Textual { text } => {
                FeeResult::Calculated { amount: Decimal::ZERO, currency: "N/A".to_string(), basis: rule.fee_basis, rule_id: rule.rule_id, remark: Some(text.clone()) }
            }
        }
        })
    }
}

fn fee_currency(fee: &FeeValue) -> Option<&str> {
    match fee {
        FeeValue::Fixed { currency, .. } => Some(currency.as_str()),
        FeeValue::Percentage { currency, .. } => Some(currency.as_str()),
        FeeValue::Tiered { currency, .. } => Some(currency.as_str()),
        FeeValue::FreeUpToN { .. } | FeeValue::NoteDeferred { .. } | FeeValue::Textual { .. } => None,
    }
}

fn discriminator_charge_context(d: &Discriminators) -> Option<String> {
    match d {
        Discriminators::RetailAsset(r) => r.charge_context.clone(),
        Discriminators::Generic(g) => g.charge_context.clone(),
        Discriminators::Card(_) => None,
    }
}

fn discriminator_card_product(d: &Discriminators) -> Option<String> {
    match d {
        Discriminators::Card(c) => c.card_product.clone(),
        _ => None,
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
