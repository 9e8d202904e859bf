use std::sync::Arc;

use assist_api::domain::directory::{DirectoryHit, DirectoryMatchKind};
use assist_api::error::{CoreError, CoreResult};
use assist_api::service::directory_lookup_service::DirectoryLookup;
use assist_db::repository::DirectoryRepository;
use async_trait::async_trait;
use uuid::Uuid;

use crate::mappers::DirectoryMapper;

/// Leading phrases stripped from a directory query before search.
const LEADING_PHRASES: &[&str] = &[
    "find",
    "who is",
    "phone number of",
    "contact info for",
    "contact information for",
    "email of",
    "mobile number of",
    "search for",
];

/// Directory Lookup. Holds no `RetrievalClient` dependency by
/// construction, so a directory-routed query structurally cannot reach the
/// knowledge store.
pub struct DirectoryLookupImpl {
    repository: Arc<dyn DirectoryRepository>,
}

impl DirectoryLookupImpl {
    pub fn new(repository: Arc<dyn DirectoryRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl DirectoryLookup for DirectoryLookupImpl {
    async fn search(&self, raw_query: &str, limit: usize) -> CoreResult<Vec<DirectoryHit>> {
        let term = strip_leading_phrase(raw_query);

        if let Ok(employee_id) = Uuid::parse_str(term) {
            if let Some(model) = self.repository.find_by_id(employee_id).await.map_err(repo_err)? {
                return Ok(vec![DirectoryHit { employee: DirectoryMapper::employee_from_model(&model), match_kind: DirectoryMatchKind::ExactId }]);
            }
        }

        if looks_like_email(term) {
            if let Some(model) = self.repository.find_by_email(term).await.map_err(repo_err)? {
                return Ok(vec![DirectoryHit { employee: DirectoryMapper::employee_from_model(&model), match_kind: DirectoryMatchKind::ExactEmail }]);
            }
        }

        if looks_like_mobile(term) {
            if let Some(model) = self.repository.find_by_mobile(term).await.map_err(repo_err)? {
                return Ok(vec![DirectoryHit { employee: DirectoryMapper::employee_from_model(&model), match_kind: DirectoryMatchKind::ExactMobile }]);
            }
        }

        let exact_name_hits = self.repository.find_by_exact_name(term).await.map_err(repo_err)?;
        if !exact_name_hits.is_empty() {
            return Ok(exact_name_hits
                .iter()
                .take(limit)
                .map(|m| DirectoryHit { employee: DirectoryMapper::employee_from_model(m), match_kind: DirectoryMatchKind::ExactName })
                .collect());
        }

        let ranked = self.repository.search_ranked(term, limit as i64).await.map_err(repo_err)?;
        Ok(ranked
            .iter()
            .map(|m| DirectoryHit { employee: DirectoryMapper::employee_from_model(m), match_kind: DirectoryMatchKind::RankedFullText })
            .collect())
    }
}

fn repo_err(e: assist_db::repository::RepositoryError) -> CoreError {
    CoreError::Repository(e.to_string())
}

fn strip_leading_phrase(raw: &str) -> &str {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    for phrase in LEADING_PHRASES {
        if let Some(stripped) = lower.strip_prefix(phrase) {
            let offset = trimmed.len() - stripped.len();
            return trimmed[offset..].trim();
        }
    }
    trimmed
}

fn looks_like_email(term: &str) -> bool {
    term.contains('@') && term.contains('.')
}

fn looks_like_mobile(term: &str) -> bool {
    let digits: String = term.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.len() >= 7 && digits.len() == term.chars().filter(|c| !c.is_whitespace()).count()
}
