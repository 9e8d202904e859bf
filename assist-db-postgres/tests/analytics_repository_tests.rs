#[cfg(feature = "postgres_tests")]
mod analytics_repository_tests {
    use assist_db::models::AnalyticsTurnModel;
    use assist_db::repository::AnalyticsRepository;
    use assist_db_postgres::AnalyticsRepositoryImpl;
    use chrono::Utc;
    use heapless::String as HeaplessString;
    use uuid::Uuid;

    mod commons;

    fn turn(session_id: Uuid, seq: i64, query: &str, answered: bool, source: &str) -> AnalyticsTurnModel {
        AnalyticsTurnModel {
            session_id,
            user_turn_seq: seq,
            query_text: query.to_string(),
            normalized_query: query.to_lowercase(),
            was_answered: answered,
            backing_source: HeaplessString::try_from(source).unwrap(),
            latency_ms: 120,
            created_at: Utc::now(),
            client_ip: None,
        }
    }

    async fn cleanup(pool: &sqlx::PgPool, session_id: Uuid) {
        let _ = sqlx::query("DELETE FROM analytics_turns WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await;
    }

    #[tokio::test]
    async fn record_is_idempotent_on_session_and_seq() {
        let pool = commons::establish_connection().await;
        let repo = AnalyticsRepositoryImpl::new(pool.clone());
        let session_id = Uuid::new_v4();

        let first = turn(session_id, 1, "what is the annual fee?", true, "card-fee");
        repo.record(first.clone()).await.expect("first record should succeed");
        repo.record(first).await.expect("duplicate record should be a no-op, not an error");

        let unanswered = repo.unanswered(50).await.expect("unanswered should succeed");
        assert!(!unanswered.iter().any(|q| q.normalized_query == "what is the annual fee?"));

        cleanup(&pool, session_id).await;
    }

    #[tokio::test]
    async fn unanswered_surfaces_queries_that_were_not_answered() {
        let pool = commons::establish_connection().await;
        let repo = AnalyticsRepositoryImpl::new(pool.clone());
        let session_id = Uuid::new_v4();

        repo.record(turn(session_id, 1, "who founded the company?", false, "model-only")).await.expect("record should succeed");

        let unanswered = repo.unanswered(50).await.expect("unanswered should succeed");
        assert!(unanswered.iter().any(|q| q.normalized_query == "who founded the company?"));

        cleanup(&pool, session_id).await;
    }

    #[tokio::test]
    async fn most_asked_counts_repeated_normalized_queries() {
        let pool = commons::establish_connection().await;
        let repo = AnalyticsRepositoryImpl::new(pool.clone());
        let session_id = Uuid::new_v4();

        repo.record(turn(session_id, 1, "what is the late payment fee?", true, "card-fee")).await.expect("record should succeed");
        repo.record(turn(session_id, 2, "what is the late payment fee?", true, "card-fee")).await.expect("record should succeed");

        let most_asked = repo.most_asked(10).await.expect("most_asked should succeed");
        let entry = most_asked.iter().find(|q| q.normalized_query == "what is the late payment fee?");
        assert!(entry.is_some_and(|q| q.count >= 2));

        cleanup(&pool, session_id).await;
    }
}
