use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A knowledge-base namespace the classifier can route into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnowledgeNamespace {
    Products,
    Policies,
    OrganizationalOverview,
    FinancialReports,
    Milestones,
    Management,
    UserDocs,
}

impl KnowledgeNamespace {
    pub const DEFAULT: KnowledgeNamespace = KnowledgeNamespace::UserDocs;
}

/// A single passage returned from the knowledge store, with enough to cite
/// and enough to filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub source_id: String,
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub passages: Vec<RetrievedPassage>,
}

/// Opaque, content-derived cache key: `blake3(namespace || normalized_query)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub [u8; 32]);

impl CacheKey {
    pub fn new(namespace: KnowledgeNamespace, normalized_query: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("{:?}", namespace).as_bytes());
        hasher.update(b"\0");
        hasher.update(normalized_query.as_bytes());
        CacheKey(*hasher.finalize().as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: RetrievalResult,
    pub cached_at: DateTime<Utc>,
}

/// Normalize a raw query for cache-key and analytics purposes: lowercase,
/// trim, collapse internal whitespace. Idempotent: `normalize(normalize(q)) == normalize(q)`.
pub fn normalize_query(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let q = "  What   is\tthe   ANNUAL   fee?  ";
        let once = normalize_query(q);
        let twice = normalize_query(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "what is the annual fee?");
    }

    #[test]
    fn cache_key_is_namespace_sensitive() {
        let a = CacheKey::new(KnowledgeNamespace::Products, "annual fee");
        let b = CacheKey::new(KnowledgeNamespace::Policies, "annual fee");
        assert_ne!(a, b);
    }
}
