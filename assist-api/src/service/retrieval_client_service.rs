use async_trait::async_trait;

use crate::domain::classifier::FilterFlags;
use crate::domain::retrieval::{KnowledgeNamespace, RetrievalResult};
use crate::error::CoreResult;

/// Retrieval Client: cached, namespace-scoped, single-flighted access
/// to the remote knowledge store.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    async fn retrieve(
        &self,
        namespace: KnowledgeNamespace,
        raw_query: &str,
        filter_flags: FilterFlags,
    ) -> CoreResult<RetrievalResult>;
}

/// The remote knowledge store itself — an external collaborator. Only the
/// interface the core consumes is declared here.
#[async_trait]
pub trait KnowledgeStoreClient: Send + Sync {
    async fn fetch(
        &self,
        namespace: KnowledgeNamespace,
        normalized_query: &str,
    ) -> CoreResult<RetrievalResult>;
}
