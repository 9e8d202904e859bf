use std::time::Duration;

use assist_api::domain::retrieval::{KnowledgeNamespace, RetrievalResult};
use assist_api::error::{CoreError, CoreResult};
use assist_api::service::retrieval_client_service::KnowledgeStoreClient;
use async_trait::async_trait;
use reqwest::Client;

/// HTTP-backed Knowledge Store client, the external collaborator behind
/// retrieval.
#[derive(Debug, Clone)]
pub struct KnowledgeStoreHttpClient {
    http_client: Client,
    base_url: String,
}

impl KnowledgeStoreHttpClient {
    pub fn new(base_url: String, timeout: Duration) -> CoreResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        Ok(Self { http_client, base_url })
    }
}

#[async_trait]
impl KnowledgeStoreClient for KnowledgeStoreHttpClient {
    async fn fetch(&self, namespace: KnowledgeNamespace, normalized_query: &str) -> CoreResult<RetrievalResult> {
        let url = format!("{}/namespaces/{}/search", self.base_url, namespace_segment(namespace));

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", normalized_query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Upstream(format!("knowledge store timed out: {e}"))
                } else {
                    CoreError::Upstream(e.to_string())
                }
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CoreError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(CoreError::Upstream(format!("knowledge store returned {}", response.status())));
        }

        response
            .json::<RetrievalResult>()
            .await
            .map_err(|e| CoreError::Upstream(format!("failed to parse knowledge store response: {e}")))
    }
}

fn namespace_segment(namespace: KnowledgeNamespace) -> &'static str {
    match namespace {
        KnowledgeNamespace::Products => "products",
        KnowledgeNamespace::Policies => "policies",
        KnowledgeNamespace::OrganizationalOverview => "organizational-overview",
        KnowledgeNamespace::FinancialReports => "financial-reports",
        KnowledgeNamespace::Milestones => "milestones",
        KnowledgeNamespace::Management => "management",
        KnowledgeNamespace::UserDocs => "user-docs",
    }
}
