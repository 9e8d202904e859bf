use async_trait::async_trait;

use crate::domain::directory::DirectoryHit;
use crate::error::CoreResult;

/// Directory Lookup. Isolation invariant: a directory-routed query
/// must never invoke the Retrieval Client — enforced structurally by this
/// trait's implementation never holding a `RetrievalClient` dependency,
/// not by a runtime check.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    async fn search(&self, raw_query: &str, limit: usize) -> CoreResult<Vec<DirectoryHit>>;
}
