//! Scenario tests lifted directly from the concrete examples list: card fee
//! lookup, whichever-higher, tiered, and disambiguation-then-resolve.

use std::sync::Arc;

use assist_api::domain::fee::{
    CardDiscriminators, Discriminators, FeeBasis, FeeCondition, FeeQueryContext, FeeResult, FeeRule,
    FeeTier, FeeValue, GenericDiscriminators, ProductLine, RetailAssetDiscriminators, RuleStatus,
};
use assist_api::service::disambiguation_store_service::DisambiguationStore;
use assist_api::service::fee_resolver_service::FeeResolver;
use assist_db::repository::{RuleFilters, RuleLookupRow, RuleRepository};
use assist_logic::mappers::FeeMapper;
use assist_logic::services::FeeResolverImpl;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

struct FakeRuleRepository {
    rules: Vec<FeeRule>,
}

#[async_trait]
impl RuleRepository for FakeRuleRepository {
    async fn lookup(
        &self,
        product_line: &str,
        charge_type: &str,
        query_discriminators: &serde_json::Value,
        as_of_date: NaiveDate,
    ) -> Result<RuleLookupRow, assist_db::repository::RepositoryError> {
        let query: Discriminators = serde_json::from_value(query_discriminators.clone()).unwrap();
        let candidates: Vec<_> = self
            .rules
            .iter()
            .filter(|r| product_line_str(r.product_line) == product_line)
            .filter(|r| r.discriminators.charge_type() == charge_type)
            .filter(|r| r.status == RuleStatus::Active && r.covers(as_of_date))
            .filter(|r| r.discriminators.matches(&query))
            .collect();

        let max_priority = candidates.iter().map(|r| r.priority).max();
        let top: Vec<_> = match max_priority {
            Some(p) => candidates.into_iter().filter(|r| r.priority == p).collect(),
            None => Vec::new(),
        };

        let models: Vec<_> = top.iter().map(|r| FeeMapper::fee_rule_to_model((*r).clone()).unwrap()).collect();
        Ok(match models.len() {
            0 => RuleLookupRow::NotFound,
            1 => RuleLookupRow::Unique(models.into_iter().next().unwrap()),
            _ => RuleLookupRow::Ambiguous(models),
        })
    }

    async fn list(
        &self,
        _filters: RuleFilters,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<assist_db::models::FeeRuleModel>, assist_db::repository::RepositoryError> {
        Ok(self.rules.iter().map(|r| FeeMapper::fee_rule_to_model(r.clone()).unwrap()).collect())
    }

    async fn insert_rule(
        &self,
        rule: assist_db::models::FeeRuleModel,
    ) -> Result<assist_db::models::FeeRuleModel, assist_db::repository::RepositoryError> {
        Ok(rule)
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

struct InMemoryDisambiguationStore {
    inner: tokio::sync::Mutex<std::collections::HashMap<String, Vec<assist_api::domain::fee::DisambiguationOption>>>,
}

impl InMemoryDisambiguationStore {
    fn new() -> Self {
        Self { inner: tokio::sync::Mutex::new(std::collections::HashMap::new()) }
    }
}

#[async_trait]
impl DisambiguationStore for InMemoryDisambiguationStore {
    async fn put(&self, options: Vec<assist_api::domain::fee::DisambiguationOption>) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.lock().await.insert(token.clone(), options);
        token
    }

    async fn take(&self, token: &str) -> Option<Vec<assist_api::domain::fee::DisambiguationOption>> {
        self.inner.lock().await.remove(token)
    }

    async fn sweep(&self) {}
}

fn resolver(rules: Vec<FeeRule>) -> FeeResolverImpl {
    FeeResolverImpl::new(Arc::new(FakeRuleRepository { rules }), Arc::new(InMemoryDisambiguationStore::new()))
}

fn resolver_with_store(rules: Vec<FeeRule>, store: Arc<dyn DisambiguationStore>) -> FeeResolverImpl {
    FeeResolverImpl::new(Arc::new(FakeRuleRepository { rules }), store)
}

#[tokio::test]
async fn scenario_1_card_fee_calculation() {
    let rule = FeeRule {
        rule_id: Uuid::new_v4(),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::CreditCard,
        discriminators: Discriminators::Card(CardDiscriminators {
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".into(),
            card_category: Some("DEBIT".into()),
            card_network: Some("MASTERCARD".into()),
            card_product: Some("World RFCD".into()),
        }),
        fee: FeeValue::Fixed { amount: Decimal::new(1150, 2), currency: "USD".into() },
        fee_basis: FeeBasis::PerYear,
        condition: FeeCondition::None,
        priority: 0,
        status: RuleStatus::Active,
    };
    let resolver = resolver(vec![rule]);

    let query = Discriminators::Card(CardDiscriminators {
        charge_type: "ISSUANCE_ANNUAL_PRIMARY".into(),
        card_category: Some("DEBIT".into()),
        card_network: Some("MASTERCARD".into()),
        card_product: Some("World RFCD".into()),
    });
    let result = resolver
        .resolve(
            ProductLine::CreditCard,
            query,
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            FeeQueryContext { currency: Some("USD".into()), ..Default::default() },
        )
        .await;

    match result {
        FeeResult::Calculated { amount, currency, basis, .. } => {
            assert_eq!(amount, Decimal::new(1150, 2));
            assert_eq!(currency, "USD");
            assert_eq!(basis, FeeBasis::PerYear);
        }
        other => panic!("expected Calculated, got {other:?}"),
    }
}

#[tokio::test]
async fn scenario_2_whichever_higher_atm_withdrawal() {
    let rule = FeeRule {
        rule_id: Uuid::new_v4(),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::CreditCard,
        discriminators: Discriminators::Card(CardDiscriminators {
            charge_type: "CASH_WITHDRAWAL_EBL_ATM".into(),
            card_category: None,
            card_network: None,
            card_product: None,
        }),
        fee: FeeValue::Percentage {
            rate: Decimal::new(25, 3),
            min: Some(Decimal::new(345, 0)),
            max: None,
            currency: "BDT".into(),
        },
        fee_basis: FeeBasis::PerTransaction,
        condition: FeeCondition::WhicheverHigher,
        priority: 0,
        status: RuleStatus::Active,
    };
    let resolver = resolver(vec![rule]);

    let query = Discriminators::Card(CardDiscriminators {
        charge_type: "CASH_WITHDRAWAL_EBL_ATM".into(),
        card_category: None,
        card_network: None,
        card_product: None,
    });
    let result = resolver
        .resolve(
            ProductLine::CreditCard,
            query,
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            FeeQueryContext { amount: Some(Decimal::new(20000, 0)), ..Default::default() },
        )
        .await;

    match result {
        FeeResult::Calculated { amount, currency, .. } => {
            assert_eq!(amount, Decimal::new(500, 0));
            assert_eq!(currency, "BDT");
        }
        other => panic!("expected Calculated, got {other:?}"),
    }
}

#[tokio::test]
async fn scenario_3_tiered_processing_fee() {
    let tiers = vec![
        FeeTier { threshold: Decimal::new(0, 0), rate: Decimal::new(575, 5), cap: Some(Decimal::new(17250, 0)), unit: "BDT".into() },
        FeeTier { threshold: Decimal::new(5_000_000, 0), rate: Decimal::new(345, 5), cap: Some(Decimal::new(23000, 0)), unit: "BDT".into() },
    ];
    let rule = FeeRule {
        rule_id: Uuid::new_v4(),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::RetailAsset,
        discriminators: Discriminators::RetailAsset(RetailAssetDiscriminators {
            loan_product: "FAST_CASH_OD".into(),
            charge_type: "PROCESSING_FEE".into(),
            charge_context: None,
        }),
        fee: FeeValue::tiered(tiers, "BDT".into()).unwrap(),
        fee_basis: FeeBasis::PerTransaction,
        condition: FeeCondition::None,
        priority: 0,
        status: RuleStatus::Active,
    };
    let resolver = resolver(vec![rule]);

    let query = Discriminators::RetailAsset(RetailAssetDiscriminators {
        loan_product: "FAST_CASH_OD".into(),
        charge_type: "PROCESSING_FEE".into(),
        charge_context: None,
    });
    let result = resolver
        .resolve(
            ProductLine::RetailAsset,
            query,
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            FeeQueryContext { amount: Some(Decimal::new(4_000_000, 0)), ..Default::default() },
        )
        .await;

    match result {
        FeeResult::Calculated { amount, .. } => assert_eq!(amount, Decimal::new(17250, 0)),
        other => panic!("expected Calculated, got {other:?}"),
    }
}

fn fast_cash_rule(charge_context: &str, rule_id: Uuid) -> FeeRule {
    FeeRule {
        rule_id,
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::RetailAsset,
        discriminators: Discriminators::RetailAsset(RetailAssetDiscriminators {
            loan_product: "FAST_CASH_OD".into(),
            charge_type: "PROCESSING_FEE".into(),
            charge_context: Some(charge_context.to_string()),
        }),
        fee: FeeValue::Fixed { amount: Decimal::new(1000, 0), currency: "BDT".into() },
        fee_basis: FeeBasis::PerTransaction,
        condition: FeeCondition::None,
        priority: 0,
        status: RuleStatus::Active,
    }
}

#[tokio::test]
async fn scenario_4_disambiguation_then_resolve() {
    let rule_a = fast_cash_rule("ON_LIMIT", Uuid::new_v4());
    let rule_b = fast_cash_rule("ON_ENHANCED_AMOUNT", Uuid::new_v4());
    let store: Arc<dyn DisambiguationStore> = Arc::new(InMemoryDisambiguationStore::new());
    let resolver = resolver_with_store(vec![rule_a, rule_b], store.clone());

    let query = Discriminators::RetailAsset(RetailAssetDiscriminators {
        loan_product: "FAST_CASH_OD".into(),
        charge_type: "PROCESSING_FEE".into(),
        charge_context: None,
    });

    let result = resolver
        .resolve(ProductLine::RetailAsset, query, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(), FeeQueryContext::default())
        .await;

    let (token, options) = match result {
        FeeResult::NeedsDisambiguation { token, options } => (token, options),
        other => panic!("expected NeedsDisambiguation, got {other:?}"),
    };
    assert_eq!(options.len(), 2);
    assert!(options[0].charge_context.is_some());

    // The token the resolver minted must still be live in the shared store
    // (it only returns the options, it does not consume its own token), and
    // consuming it once invalidates it for any further take.
    let taken = store.take(&token).await;
    assert_eq!(taken.map(|o| o.len()), Some(2));
    assert!(store.take(&token).await.is_none());
}

#[tokio::test]
async fn card_fee_generic_fallback_retries_with_declared_charge_type() {
    let fallback_rule = FeeRule {
        rule_id: Uuid::new_v4(),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::CreditCard,
        discriminators: Discriminators::Card(CardDiscriminators {
            charge_type: "processing-fee".into(),
            card_category: None,
            card_network: None,
            card_product: None,
        }),
        fee: FeeValue::Fixed { amount: Decimal::new(500, 2), currency: "USD".into() },
        fee_basis: FeeBasis::PerTransaction,
        condition: FeeCondition::None,
        priority: 0,
        status: RuleStatus::Active,
    };
    let resolver = resolver(vec![fallback_rule]);

    let query = Discriminators::Card(CardDiscriminators {
        charge_type: "SOME_UNKNOWN_SPECIALIZED_FEE".into(),
        card_category: None,
        card_network: None,
        card_product: None,
    });
    let result = resolver
        .resolve(ProductLine::CreditCard, query, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(), FeeQueryContext::default())
        .await;

    match result {
        FeeResult::Calculated { amount, .. } => assert_eq!(amount, Decimal::new(500, 2)),
        other => panic!("expected fallback Calculated, got {other:?}"),
    }
}

#[tokio::test]
async fn note_based_rule_always_defers() {
    let rule = FeeRule {
        rule_id: Uuid::new_v4(),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_to: None,
        product_line: ProductLine::RetailAsset,
        discriminators: Discriminators::Generic(GenericDiscriminators { charge_type: "STATEMENT_REQUEST".into(), charge_context: None }),
        fee: FeeValue::NoteDeferred { note_reference: "NOTE-2026-07".into() },
        fee_basis: FeeBasis::PerTransaction,
        condition: FeeCondition::NoteBased,
        priority: 0,
        status: RuleStatus::Active,
    };
    let resolver = resolver(vec![rule]);

    let query = Discriminators::Generic(GenericDiscriminators { charge_type: "STATEMENT_REQUEST".into(), charge_context: None });
    let result = resolver
        .resolve(ProductLine::RetailAsset, query, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(), FeeQueryContext::default())
        .await;

    assert!(matches!(result, FeeResult::NeedsNoteResolution { note_reference } if note_reference == "NOTE-2026-07"));
}
