//! Exercises the directory isolation invariant end to end through the
//! orchestrator: a `Directory`-routed turn must never reach the retrieval
//! client, even when the directory search comes back empty.

use std::sync::Arc;

use assist_api::domain::analytics::{AnalyticsTurn, BackingSource, DailyMetrics, QueryFrequency};
use assist_api::domain::classifier::{ClassificationOutcome, Entities, FilterFlags, RoutingDecision};
use assist_api::domain::conversation::{ConversationTurn, Role};
use assist_api::domain::directory::{DirectoryHit, DirectoryMatchKind, Employee};
use assist_api::domain::fee::{Discriminators, FeeQueryContext, FeeResult, ProductLine};
use assist_api::domain::orchestrator::{ChatRequest, StreamEvent};
use assist_api::domain::retrieval::{KnowledgeNamespace, RetrievalResult};
use assist_api::error::{CoreError, CoreResult};
use assist_api::service::analytics_service::AnalyticsRecorder;
use assist_api::service::conversation_memory_service::ConversationMemory;
use assist_api::service::directory_lookup_service::DirectoryLookup;
use assist_api::service::disambiguation_store_service::DisambiguationStore;
use assist_api::service::fee_resolver_service::FeeResolver;
use assist_api::service::model_provider_service::{CancellationContext, ModelProviderService};
use assist_api::service::orchestrator_service::Orchestrator;
use assist_api::service::query_classifier_service::QueryClassifier;
use assist_api::service::retrieval_client_service::RetrievalClient;
use assist_logic::services::OrchestratorImpl;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use uuid::Uuid;

struct DirectoryOnlyClassifier;
impl QueryClassifier for DirectoryOnlyClassifier {
    fn classify(&self, _raw_query: &str) -> ClassificationOutcome {
        ClassificationOutcome { decision: RoutingDecision::Directory, entities: Entities::default() }
    }
}

struct PanicsIfInvokedRetrievalClient;
#[async_trait]
impl RetrievalClient for PanicsIfInvokedRetrievalClient {
    async fn retrieve(&self, _namespace: KnowledgeNamespace, _raw_query: &str, _filter_flags: FilterFlags) -> CoreResult<RetrievalResult> {
        panic!("retrieval client invoked on a Directory-routed turn — isolation invariant violated");
    }
}

struct EmptyDirectory;
#[async_trait]
impl DirectoryLookup for EmptyDirectory {
    async fn search(&self, _raw_query: &str, _limit: usize) -> CoreResult<Vec<DirectoryHit>> {
        Ok(Vec::new())
    }
}

struct HitDirectory;
#[async_trait]
impl DirectoryLookup for HitDirectory {
    async fn search(&self, _raw_query: &str, _limit: usize) -> CoreResult<Vec<DirectoryHit>> {
        Ok(vec![DirectoryHit {
            employee: Employee {
                employee_id: Uuid::new_v4(),
                full_name: "Rajib Bhowmik".into(),
                email: "rajib.bhowmik@example.com".into(),
                mobile: "+8801700000000".into(),
                department: "Operations".into(),
                designation: "Senior Officer".into(),
            },
            match_kind: DirectoryMatchKind::ExactName,
        }])
    }
}

struct NoopFeeResolver;
#[async_trait]
impl FeeResolver for NoopFeeResolver {
    async fn resolve(&self, _product_line: ProductLine, _discriminators: Discriminators, _as_of_date: NaiveDate, _context: FeeQueryContext) -> FeeResult {
        FeeResult::NotFound
    }
}

struct NoopDisambiguationStore;
#[async_trait]
impl DisambiguationStore for NoopDisambiguationStore {
    async fn put(&self, _options: Vec<assist_api::domain::fee::DisambiguationOption>) -> String {
        String::new()
    }
    async fn take(&self, _token: &str) -> Option<Vec<assist_api::domain::fee::DisambiguationOption>> {
        None
    }
    async fn sweep(&self) {}
}

struct InMemoryConversationMemory {
    turns: tokio::sync::Mutex<Vec<ConversationTurn>>,
}
impl InMemoryConversationMemory {
    fn new() -> Self {
        Self { turns: tokio::sync::Mutex::new(Vec::new()) }
    }
}
#[async_trait]
impl ConversationMemory for InMemoryConversationMemory {
    async fn append(&self, session: Uuid, role: Role, content: String, ts: DateTime<Utc>) -> CoreResult<()> {
        self.turns.lock().await.push(ConversationTurn { session_id: session, role, content, timestamp: ts });
        Ok(())
    }
    async fn recent(&self, session: Uuid, n: usize) -> CoreResult<Vec<ConversationTurn>> {
        let turns = self.turns.lock().await;
        Ok(turns.iter().filter(|t| t.session_id == session).rev().take(n).rev().cloned().collect())
    }
    async fn clear(&self, session: Uuid) -> CoreResult<()> {
        self.turns.lock().await.retain(|t| t.session_id != session);
        Ok(())
    }
}

struct RecordingAnalyticsRecorder {
    recorded: tokio::sync::Mutex<Vec<AnalyticsTurn>>,
}
impl RecordingAnalyticsRecorder {
    fn new() -> Self {
        Self { recorded: tokio::sync::Mutex::new(Vec::new()) }
    }
}
#[async_trait]
impl AnalyticsRecorder for RecordingAnalyticsRecorder {
    async fn record(&self, turn: AnalyticsTurn) -> CoreResult<()> {
        self.recorded.lock().await.push(turn);
        Ok(())
    }
    async fn daily_metrics(&self, _last_n_days: u32) -> CoreResult<Vec<DailyMetrics>> {
        Ok(Vec::new())
    }
    async fn most_asked(&self, _limit: usize) -> CoreResult<Vec<QueryFrequency>> {
        Ok(Vec::new())
    }
    async fn unanswered(&self, _limit: usize) -> CoreResult<Vec<QueryFrequency>> {
        Ok(Vec::new())
    }
    async fn conversation_log(&self, _session: Uuid) -> CoreResult<Vec<ConversationTurn>> {
        Ok(Vec::new())
    }
}

struct PanicsIfInvokedModelProvider;
#[async_trait]
impl ModelProviderService for PanicsIfInvokedModelProvider {
    async fn stream_generate(&self, _prompt: String, _cancel: CancellationContext) -> BoxStream<'static, Result<String, CoreError>> {
        panic!("model provider invoked on a Directory turn — it must be answered directly from the hit");
    }
}

fn build_orchestrator(directory: Arc<dyn DirectoryLookup>, analytics: Arc<RecordingAnalyticsRecorder>) -> OrchestratorImpl {
    OrchestratorImpl::new(
        Arc::new(DirectoryOnlyClassifier),
        Arc::new(NoopFeeResolver),
        Arc::new(PanicsIfInvokedRetrievalClient),
        directory,
        Arc::new(NoopDisambiguationStore),
        Arc::new(InMemoryConversationMemory::new()),
        analytics,
        Arc::new(PanicsIfInvokedModelProvider),
        10,
    )
}

#[tokio::test]
async fn directory_turn_never_touches_retrieval_client_on_empty_result() {
    let analytics = Arc::new(RecordingAnalyticsRecorder::new());
    let orchestrator = build_orchestrator(Arc::new(EmptyDirectory), analytics.clone());

    let request = ChatRequest {
        query: "find Rajib Bhowmik phone number".to_string(),
        session_id: Some(Uuid::new_v4()),
        knowledge_base: None,
        stream: true,
        client_ip: None,
        disambiguation_token: None,
        disambiguation_choice: None,
    };

    let mut events = orchestrator.handle_turn(request, CancellationContext::new()).await;
    let mut tokens = Vec::new();
    while let Some(event) = events.next().await {
        if let Ok(StreamEvent::Token(t)) = event {
            tokens.push(t);
        }
    }
    assert!(tokens.iter().any(|t| t.contains("couldn't find")));

    let recorded = analytics.recorded.lock().await;
    assert_eq!(recorded.len(), 1);
    assert!(!recorded[0].was_answered);
    assert_eq!(recorded[0].backing_source, BackingSource::Directory);
}

#[tokio::test]
async fn directory_turn_never_touches_retrieval_client_on_hit() {
    let analytics = Arc::new(RecordingAnalyticsRecorder::new());
    let orchestrator = build_orchestrator(Arc::new(HitDirectory), analytics.clone());

    let request = ChatRequest {
        query: "who is Rajib Bhowmik".to_string(),
        session_id: Some(Uuid::new_v4()),
        knowledge_base: None,
        stream: true,
        client_ip: None,
        disambiguation_token: None,
        disambiguation_choice: None,
    };

    let mut events = orchestrator.handle_turn(request, CancellationContext::new()).await;
    let mut tokens = Vec::new();
    while let Some(event) = events.next().await {
        if let Ok(StreamEvent::Token(t)) = event {
            tokens.push(t);
        }
    }
    assert!(tokens.iter().any(|t| t.contains("Rajib Bhowmik")));

    let recorded = analytics.recorded.lock().await;
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].was_answered);
    assert_eq!(recorded[0].backing_source, BackingSource::Directory);
}
