#[cfg(feature = "postgres_tests")]
mod rule_repository_tests {
    use assist_db::models::FeeRuleModel;
    use assist_db::repository::{RuleFilters, RuleLookupRow, RuleRepository};
    use assist_db_postgres::RuleRepositoryImpl;
    use chrono::NaiveDate;
    use heapless::String as HeaplessString;
    use serde_json::json;
    use uuid::Uuid;

    mod commons;

    fn sample_rule(charge_type: &str, priority: i32) -> FeeRuleModel {
        let discriminators = json!({ "Card": { "charge_type": charge_type, "network": null, "product_category": null } });
        let hash = *blake3::hash(discriminators.to_string().as_bytes()).as_bytes();
        FeeRuleModel {
            rule_id: Uuid::new_v4(),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            effective_to: None,
            product_line: HeaplessString::try_from("credit-card").unwrap(),
            discriminators,
            discriminator_hash: hash,
            fee: json!({ "Flat": { "amount": "1150.00", "currency": "USD" } }),
            fee_basis: HeaplessString::try_from("per-year").unwrap(),
            condition: json!({ "Always": {} }),
            priority,
            status: HeaplessString::try_from("active").unwrap(),
        }
    }

    async fn cleanup(pool: &sqlx::PgPool) {
        let _ = sqlx::query("DELETE FROM fee_rules WHERE product_line = 'credit-card'")
            .execute(pool)
            .await;
    }

    #[tokio::test]
    async fn insert_then_lookup_finds_unique_active_rule() {
        let pool = commons::establish_connection().await;
        cleanup(&pool).await;
        let repo = RuleRepositoryImpl::new(pool.clone());

        let rule = sample_rule("annual-fee", 0);
        repo.insert_rule(rule.clone()).await.expect("insert should succeed");

        let query = json!({ "Card": { "charge_type": "annual-fee", "network": null, "product_category": null } });
        let result = repo
            .lookup("credit-card", "annual-fee", &query, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .await
            .expect("lookup should succeed");

        match result {
            RuleLookupRow::Unique(found) => assert_eq!(found.rule_id, rule.rule_id),
            other => panic!("expected a unique match, got {other:?}"),
        }

        cleanup(&pool).await;
    }

    #[tokio::test]
    async fn lookup_before_effective_from_returns_not_found() {
        let pool = commons::establish_connection().await;
        cleanup(&pool).await;
        let repo = RuleRepositoryImpl::new(pool.clone());

        repo.insert_rule(sample_rule("late-payment-fee", 0)).await.expect("insert should succeed");

        let query = json!({ "Card": { "charge_type": "late-payment-fee", "network": null, "product_category": null } });
        let result = repo
            .lookup("credit-card", "late-payment-fee", &query, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .expect("lookup should succeed");

        assert!(matches!(result, RuleLookupRow::NotFound));
        cleanup(&pool).await;
    }

    #[tokio::test]
    async fn two_equal_priority_rows_are_ambiguous() {
        let pool = commons::establish_connection().await;
        cleanup(&pool).await;
        let repo = RuleRepositoryImpl::new(pool.clone());

        repo.insert_rule(sample_rule("cash-advance-fee", 0)).await.expect("insert should succeed");
        repo.insert_rule(sample_rule("cash-advance-fee", 0)).await.expect("insert should succeed");

        let query = json!({ "Card": { "charge_type": "cash-advance-fee", "network": null, "product_category": null } });
        let result = repo
            .lookup("credit-card", "cash-advance-fee", &query, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .await
            .expect("lookup should succeed");

        match result {
            RuleLookupRow::Ambiguous(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
        cleanup(&pool).await;
    }

    #[tokio::test]
    async fn list_respects_status_filter() {
        let pool = commons::establish_connection().await;
        cleanup(&pool).await;
        let repo = RuleRepositoryImpl::new(pool.clone());

        repo.insert_rule(sample_rule("overlimit-fee", 0)).await.expect("insert should succeed");

        let rows = repo
            .list(
                RuleFilters { product_line: Some("credit-card".to_string()), status: Some("active".to_string()), charge_type: None },
                10,
                0,
            )
            .await
            .expect("list should succeed");
        assert!(rows.iter().any(|r| r.product_line.as_str() == "credit-card"));
        cleanup(&pool).await;
    }
}
