use std::sync::Arc;
use std::time::Duration;

use assist_api::domain::classifier::FilterFlags;
use assist_api::domain::retrieval::{normalize_query, CacheEntry, CacheKey, KnowledgeNamespace, RetrievalResult, RetrievedPassage};
use assist_api::error::CoreResult;
use assist_api::service::retrieval_client_service::{KnowledgeStoreClient, RetrievalClient};
use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;

/// Source identifiers matching this published pattern set are excluded from
/// organizational-overview results — financial documents are
/// deliberately kept out of the overview namespace's surfaced context.
const FINANCIAL_DOCUMENT_PATTERNS: &[&str] = &["annual-report", "10-k", "10-q", "financial-statement", "earnings-"];

/// Retrieval Client: cached, namespace-scoped access to the knowledge
/// store. `moka`'s `entry_by_ref().or_insert_with()` gives per-key
/// single-flight for free — concurrent callers for the same `(namespace,
/// normalized_query)` key attach to the same in-flight fetch rather than
/// issuing redundant upstream calls.
pub struct RetrievalClientImpl {
    knowledge_store: Arc<dyn KnowledgeStoreClient>,
    cache: Cache<CacheKey, CacheEntry>,
}

impl RetrievalClientImpl {
    pub fn new(knowledge_store: Arc<dyn KnowledgeStoreClient>, ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build();
        Self { knowledge_store, cache }
    }
}

#[async_trait]
impl RetrievalClient for RetrievalClientImpl {
    async fn retrieve(
        &self,
        namespace: KnowledgeNamespace,
        raw_query: &str,
        filter_flags: FilterFlags,
    ) -> CoreResult<RetrievalResult> {
        let normalized = normalize_query(raw_query);
        let key = CacheKey::new(namespace, &normalized);
        let knowledge_store = self.knowledge_store.clone();

        let entry = self
            .cache
            .entry_by_ref(&key)
            .or_try_insert_with(async move {
                let result = knowledge_store.fetch(namespace, &normalized).await?;
                Ok::<CacheEntry, assist_api::error::CoreError>(CacheEntry { result, cached_at: Utc::now() })
            })
            .await
            .map_err(|e: Arc<assist_api::error::CoreError>| assist_api::error::CoreError::Upstream(e.to_string()))?;

        let mut passages = entry.into_value().result.passages;
        if filter_flags.filter_financial {
            passages.retain(|p| !is_financial_document(p));
        }
        Ok(RetrievalResult { passages })
    }
}

fn is_financial_document(passage: &RetrievedPassage) -> bool {
    let id = passage.source_id.to_lowercase();
    FINANCIAL_DOCUMENT_PATTERNS.iter().any(|pattern| id.contains(pattern))
}
