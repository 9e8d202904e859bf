use std::sync::Arc;
use std::time::Instant;

use assist_api::domain::analytics::{AnalyticsTurn, BackingSource};
use assist_api::domain::classifier::{Entities, RoutingDecision};
use assist_api::domain::conversation::Role;
use assist_api::domain::directory::DirectoryHit;
use assist_api::domain::fee::{
    CardDiscriminators, Discriminators, FeeQueryContext, FeeResult, ProductLine,
};
use assist_api::domain::orchestrator::{
    ChatRequest, SourceRef, SourcesEnvelope, SourcesEnvelopeType, StreamEvent,
};
use assist_api::domain::retrieval::KnowledgeNamespace;
use assist_api::error::CoreError;
use assist_api::service::analytics_service::AnalyticsRecorder;
use assist_api::service::conversation_memory_service::ConversationMemory;
use assist_api::service::directory_lookup_service::DirectoryLookup;
use assist_api::service::disambiguation_store_service::DisambiguationStore;
use assist_api::service::fee_resolver_service::FeeResolver;
use assist_api::service::model_provider_service::{CancellationContext, ModelProviderService};
use assist_api::service::orchestrator_service::Orchestrator;
use assist_api::service::query_classifier_service::QueryClassifier;
use assist_api::service::retrieval_client_service::RetrievalClient;
use async_stream::stream;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use uuid::Uuid;

/// Charge-type keywords the conversational CardFees path infers from free
/// text, in priority order. A chat query never carries a structured
/// `charge_type` field the way `POST /fees/calculate` does, so the
/// orchestrator's own entity extraction has to declare one (open question,
/// see DESIGN.md); anything unmatched falls through to the resolver's own
/// generic fallback.
const CHARGE_TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("annual fee", "annual-fee"),
    ("late payment", "late-payment-fee"),
    ("cash advance", "cash-advance-fee"),
    ("cash withdrawal", "cash-advance-fee"),
    ("replacement", "card-replacement-fee"),
    ("overlimit", "overlimit-fee"),
];

const DEFAULT_DIRECTORY_LIMIT: usize = 5;

const SYSTEM_DIRECTIVE: &str =
    "You are a banking assistant. Use only the context provided below; never invent figures or policy terms.";

/// Orchestrator: the per-request state machine. Holds
/// every other component as a trait object so its own unit tests can wire
/// up fakes without a database or network.
pub struct OrchestratorImpl {
    classifier: Arc<dyn QueryClassifier>,
    fee_resolver: Arc<dyn FeeResolver>,
    retrieval_client: Arc<dyn RetrievalClient>,
    directory_lookup: Arc<dyn DirectoryLookup>,
    disambiguation_store: Arc<dyn DisambiguationStore>,
    conversation_memory: Arc<dyn ConversationMemory>,
    analytics_recorder: Arc<dyn AnalyticsRecorder>,
    model_provider: Arc<dyn ModelProviderService>,
    history_depth: usize,
    /// Hard invariant by default: a Directory-routed turn never reaches the
    /// knowledge store. Disabling this is an explicit, auditable opt-out.
    directory_isolation_enabled: bool,
}

impl OrchestratorImpl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: Arc<dyn QueryClassifier>,
        fee_resolver: Arc<dyn FeeResolver>,
        retrieval_client: Arc<dyn RetrievalClient>,
        directory_lookup: Arc<dyn DirectoryLookup>,
        disambiguation_store: Arc<dyn DisambiguationStore>,
        conversation_memory: Arc<dyn ConversationMemory>,
        analytics_recorder: Arc<dyn AnalyticsRecorder>,
        model_provider: Arc<dyn ModelProviderService>,
        history_depth: usize,
    ) -> Self {
        Self::with_directory_isolation(
            classifier,
            fee_resolver,
            retrieval_client,
            directory_lookup,
            disambiguation_store,
            conversation_memory,
            analytics_recorder,
            model_provider,
            history_depth,
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_directory_isolation(
        classifier: Arc<dyn QueryClassifier>,
        fee_resolver: Arc<dyn FeeResolver>,
        retrieval_client: Arc<dyn RetrievalClient>,
        directory_lookup: Arc<dyn DirectoryLookup>,
        disambiguation_store: Arc<dyn DisambiguationStore>,
        conversation_memory: Arc<dyn ConversationMemory>,
        analytics_recorder: Arc<dyn AnalyticsRecorder>,
        model_provider: Arc<dyn ModelProviderService>,
        history_depth: usize,
        directory_isolation_enabled: bool,
    ) -> Self {
        Self {
            classifier,
            fee_resolver,
            retrieval_client,
            directory_lookup,
            disambiguation_store,
            conversation_memory,
            analytics_recorder,
            model_provider,
            history_depth,
            directory_isolation_enabled,
        }
    }
}

/// Authoritative context assembled ahead of the prompt, plus the bits the
/// post-processing/persistence steps need regardless of how it was sourced.
struct TurnContext {
    context_text: String,
    sources: Vec<SourceRef>,
    backing_source: BackingSource,
    was_answered: bool,
    /// Set when a decision already produced the final answer text and the
    /// model provider must not be invoked at all (Directory hits, SmallTalk).
    direct_answer: Option<String>,
}

#[async_trait]
impl Orchestrator for OrchestratorImpl {
    async fn handle_turn(
        &self,
        request: ChatRequest,
        cancel: CancellationContext,
    ) -> BoxStream<'static, Result<StreamEvent, CoreError>> {
        let start = Instant::now();
        let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
        let query = request.query.clone();
        let normalized_query = assist_api::domain::retrieval::normalize_query(&query);

        let classifier = self.classifier.clone();
        let fee_resolver = self.fee_resolver.clone();
        let retrieval_client = self.retrieval_client.clone();
        let directory_lookup = self.directory_lookup.clone();
        let disambiguation_store = self.disambiguation_store.clone();
        let conversation_memory = self.conversation_memory.clone();
        let analytics_recorder = self.analytics_recorder.clone();
        let model_provider = self.model_provider.clone();
        let history_depth = self.history_depth;
        let directory_isolation_enabled = self.directory_isolation_enabled;
        let knowledge_base_override = request.knowledge_base;
        let disambiguation_token = request.disambiguation_token.clone();
        let disambiguation_choice = request.disambiguation_choice;
        let client_ip = request.client_ip.clone();

        let out = stream! {
            if let Err(e) = conversation_memory.append(session_id, Role::User, query.clone(), Utc::now()).await {
                tracing::warn!("failed to persist user turn for session {}: {}", session_id, e);
            }

            let outcome = classifier.classify(&query);

            let turn_context = match resolve_context(
                &outcome.decision,
                &outcome.entities,
                &query,
                knowledge_base_override,
                disambiguation_token.as_deref(),
                disambiguation_choice,
                fee_resolver.as_ref(),
                retrieval_client.as_ref(),
                directory_lookup.as_ref(),
                disambiguation_store.as_ref(),
                directory_isolation_enabled,
            )
            .await
            {
                Ok(ctx) => ctx,
                Err(needs_disambiguation) => {
                    yield Ok(StreamEvent::Token(needs_disambiguation));
                    yield Ok(StreamEvent::Done);
                    record_turn(&analytics_recorder, session_id, &query, &normalized_query, false, BackingSource::None, start, client_ip.clone()).await;
                    return;
                }
            };

            if let Some(direct) = turn_context.direct_answer {
                yield Ok(StreamEvent::Token(direct.clone()));
                yield Ok(StreamEvent::Done);
                persist_assistant_turn(&conversation_memory, session_id, &direct).await;
                record_turn(&analytics_recorder, session_id, &query, &normalized_query, turn_context.was_answered, turn_context.backing_source, start, client_ip.clone()).await;
                return;
            }

            let mut history = conversation_memory.recent(session_id, history_depth).await.unwrap_or_default();

            let mut accumulated = String::new();
            let mut saw_error = false;

            // A context-length failure is retried once against a trimmed
            // history; any other failure (or a second context-length hit)
            // falls through to its own terminal message.
            for attempt in 0..2 {
                accumulated.clear();
                let prompt = assemble_prompt(&turn_context.context_text, &history, &query);
                let mut model_stream = model_provider.stream_generate(prompt, cancel.child()).await;
                let mut context_too_long = false;

                while let Some(chunk) = model_stream.next().await {
                    if cancel.is_cancelled() {
                        saw_error = true;
                        break;
                    }
                    match chunk {
                        Ok(token) => {
                            accumulated.push_str(&token);
                            yield Ok(StreamEvent::Token(token));
                        }
                        Err(CoreError::RateLimited) => {
                            saw_error = true;
                            yield Ok(StreamEvent::Token("The assistant is temporarily unavailable. Please try again shortly.".to_string()));
                            break;
                        }
                        Err(CoreError::Cancelled) => {
                            saw_error = true;
                            break;
                        }
                        Err(CoreError::ContextTooLong(_)) if attempt == 0 => {
                            context_too_long = true;
                            break;
                        }
                        Err(_) => {
                            saw_error = true;
                            yield Ok(StreamEvent::Token("Something went wrong while generating a response.".to_string()));
                            break;
                        }
                    }
                }

                if context_too_long {
                    let keep_from = history.len() / 2;
                    history.drain(0..keep_from);
                    continue;
                }
                break;
            }

            if !cancel.is_cancelled() {
                let cleaned = post_process(&accumulated);
                if !turn_context.sources.is_empty() {
                    yield Ok(StreamEvent::Sources(SourcesEnvelope {
                        envelope_type: SourcesEnvelopeType::Sources,
                        sources: turn_context.sources.clone(),
                    }));
                }
                yield Ok(StreamEvent::Done);
                persist_assistant_turn(&conversation_memory, session_id, &cleaned).await;
            }

            let was_answered = turn_context.was_answered && !saw_error && !cancel.is_cancelled();
            record_turn(&analytics_recorder, session_id, &query, &normalized_query, was_answered, turn_context.backing_source, start, client_ip).await;
        };

        Box::pin(out)
    }
}

/// Routes the classified decision to its backing source and assembles the
/// authoritative context. `Err(String)` carries a
/// ready-to-emit disambiguation prompt (state `AwaitingDisambiguation`).
#[allow(clippy::too_many_arguments)]
async fn resolve_context(
    decision: &RoutingDecision,
    entities: &Entities,
    raw_query: &str,
    knowledge_base_override: Option<KnowledgeNamespace>,
    disambiguation_token: Option<&str>,
    disambiguation_choice: Option<usize>,
    fee_resolver: &dyn FeeResolver,
    retrieval_client: &dyn RetrievalClient,
    directory_lookup: &dyn DirectoryLookup,
    disambiguation_store: &dyn DisambiguationStore,
    directory_isolation_enabled: bool,
) -> Result<TurnContext, String> {
    // A pending disambiguation token takes precedence over fresh classification:
    // the caller is resolving a prior turn's `NeedsDisambiguation` prompt.
    if let (Some(token), Some(choice)) = (disambiguation_token, disambiguation_choice) {
        if let Some(options) = disambiguation_store.take(token).await {
            return match options.get(choice) {
                Some(option) => Ok(TurnContext {
                    context_text: format!("Selected fee rule: {}", option.description),
                    sources: Vec::new(),
                    backing_source: BackingSource::FeeEngine,
                    was_answered: true,
                    direct_answer: None,
                }),
                None => Err("That selection was not one of the options offered.".to_string()),
            };
        }
        return Err("That disambiguation request has expired. Please ask again.".to_string());
    }

    match decision {
        RoutingDecision::SmallTalk => Ok(TurnContext {
            context_text: String::new(),
            sources: Vec::new(),
            backing_source: BackingSource::None,
            was_answered: true,
            direct_answer: None,
        }),

        RoutingDecision::Directory => {
            let hits = directory_lookup
                .search(raw_query, DEFAULT_DIRECTORY_LIMIT)
                .await
                .map_err(|e| e.to_string())?;
            if hits.is_empty() {
                if directory_isolation_enabled {
                    tracing::debug!("directory isolation enforced: empty hit will not fall back to the knowledge store");
                } else {
                    // Isolation is explicitly disabled: an empty directory hit
                    // is allowed to fall back to the knowledge store instead
                    // of the canned "couldn't find anyone" answer.
                    return retrieve_context(retrieval_client, KnowledgeNamespace::DEFAULT, raw_query, false).await;
                }
            }
            Ok(directory_turn_context(&hits))
        }

        RoutingDecision::CardFees => {
            let discriminators = card_discriminators_from(entities, raw_query);
            let context = FeeQueryContext::default();
            let as_of_date: NaiveDate = Utc::now().date_naive();
            match fee_resolver.resolve(ProductLine::CreditCard, discriminators, as_of_date, context).await {
                FeeResult::Calculated { amount, currency, basis, remark, .. } => Ok(TurnContext {
                    context_text: format!(
                        "Authoritative fee: {amount} {currency} ({basis:?}).{}",
                        remark.map(|r| format!(" Note: {r}")).unwrap_or_default()
                    ),
                    sources: Vec::new(),
                    backing_source: BackingSource::FeeEngine,
                    was_answered: true,
                    direct_answer: None,
                }),
                FeeResult::NeedsNoteResolution { note_reference } => Ok(TurnContext {
                    context_text: format!(
                        "This fee is governed by note {note_reference}; cite it rather than inventing a figure."
                    ),
                    sources: Vec::new(),
                    backing_source: BackingSource::FeeEngine,
                    was_answered: true,
                    direct_answer: None,
                }),
                FeeResult::NeedsDisambiguation { token, options } => {
                    let prompt = format_disambiguation_prompt(&token, &options);
                    Err(prompt)
                }
                FeeResult::FxRateRequired { rule_currency, requested_currency } => Ok(TurnContext {
                    context_text: format!(
                        "The applicable rule is denominated in {rule_currency}; this system does not convert to {requested_currency}."
                    ),
                    sources: Vec::new(),
                    backing_source: BackingSource::FeeEngine,
                    was_answered: true,
                    direct_answer: None,
                }),
                // NotFound on an unambiguous card-fee route falls back to knowledge-store
                // retrieval rather than surfacing NotFound directly.
                FeeResult::NotFound => retrieve_context(retrieval_client, KnowledgeNamespace::Products, raw_query, false).await,
            }
        }

        RoutingDecision::Retrieval { namespace, filter_flags } => {
            let namespace = knowledge_base_override.unwrap_or(*namespace);
            retrieve_context(retrieval_client, namespace, raw_query, filter_flags.filter_financial).await
        }

        RoutingDecision::Unknown => {
            let namespace = knowledge_base_override.unwrap_or(KnowledgeNamespace::DEFAULT);
            retrieve_context(retrieval_client, namespace, raw_query, false).await
        }
    }
}

async fn retrieve_context(
    retrieval_client: &dyn RetrievalClient,
    namespace: KnowledgeNamespace,
    raw_query: &str,
    filter_financial: bool,
) -> Result<TurnContext, String> {
    let flags = assist_api::domain::classifier::FilterFlags { filter_financial };
    match retrieval_client.retrieve(namespace, raw_query, flags).await {
        Ok(result) if !result.passages.is_empty() => {
            let context_text = result.passages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n");
            let sources = result
                .passages
                .iter()
                .map(|p| SourceRef { source_id: p.source_id.clone(), title: None })
                .collect();
            Ok(TurnContext { context_text, sources, backing_source: BackingSource::KnowledgeStore, was_answered: true, direct_answer: None })
        }
        // Empty result or an upstream error: proceed with empty context so the
        // model can acknowledge missing data, marking the turn unanswered.
        _ => Ok(TurnContext {
            context_text: String::new(),
            sources: Vec::new(),
            backing_source: BackingSource::ModelOnly,
            was_answered: false,
            direct_answer: None,
        }),
    }
}

fn directory_turn_context(hits: &[DirectoryHit]) -> TurnContext {
    if hits.is_empty() {
        return TurnContext {
            context_text: String::new(),
            sources: Vec::new(),
            backing_source: BackingSource::Directory,
            was_answered: false,
            direct_answer: Some("I couldn't find anyone matching that in the employee directory.".to_string()),
        };
    }
    let lines: Vec<String> = hits
        .iter()
        .map(|h| {
            format!(
                "{} — {} ({}), email: {}, mobile: {}",
                h.employee.full_name, h.employee.designation, h.employee.department, h.employee.email, h.employee.mobile
            )
        })
        .collect();
    TurnContext {
        context_text: lines.join("\n"),
        sources: Vec::new(),
        backing_source: BackingSource::Directory,
        was_answered: true,
        direct_answer: Some(lines.join("\n")),
    }
}

fn card_discriminators_from(entities: &Entities, raw_query: &str) -> Discriminators {
    let lower = raw_query.to_lowercase();
    let charge_type = CHARGE_TYPE_KEYWORDS
        .iter()
        .find(|&&(keyword, _)| lower.contains(keyword))
        .map(|&(_, charge_type)| charge_type.to_string())
        .unwrap_or_else(|| crate::services::fee_resolver_impl::GENERIC_FALLBACK_CHARGE_TYPE.to_string());

    Discriminators::Card(CardDiscriminators {
        charge_type,
        card_category: entities.card_category.clone(),
        card_network: entities.card_network.clone(),
        card_product: entities.card_product.clone(),
    })
}

fn format_disambiguation_prompt(token: &str, options: &[assist_api::domain::fee::DisambiguationOption]) -> String {
    let mut lines = vec!["This fee depends on which of the following applies — please reply with a number:".to_string()];
    for (i, option) in options.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, option.description));
    }
    lines.push(format!("(reference: {token})"));
    lines.join("\n")
}

fn assemble_prompt(context_text: &str, history: &[assist_api::domain::conversation::ConversationTurn], current_query: &str) -> String {
    let history_text = history
        .iter()
        .map(|t| format!("{:?}: {}", t.role, t.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{SYSTEM_DIRECTIVE}\n\nContext:\n{context_text}\n\nConversation so far:\n{history_text}\n\nUser: {current_query}"
    )
}

/// Strips obvious markdown artifacts and applies domain lexical rules
/// (currency symbol normalization, bank-name canonicalization).
fn post_process(text: &str) -> String {
    let without_bold = text.replace("**", "").replace('`', "");
    without_bold.replace('$', "USD ").replace("the bank", "Bank")
}

async fn persist_assistant_turn(conversation_memory: &Arc<dyn ConversationMemory>, session_id: Uuid, content: &str) {
    if let Err(e) = conversation_memory.append(session_id, Role::Assistant, content.to_string(), Utc::now()).await {
        tracing::warn!("failed to persist assistant turn for session {}: {}", session_id, e);
    }
}

#[allow(clippy::too_many_arguments)]
async fn record_turn(
    analytics_recorder: &Arc<dyn AnalyticsRecorder>,
    session_id: Uuid,
    query: &str,
    normalized_query: &str,
    was_answered: bool,
    backing_source: BackingSource,
    start: Instant,
    client_ip: Option<String>,
) {
    let turn = AnalyticsTurn {
        session_id,
        user_turn_seq: Utc::now().timestamp_millis(),
        query_text: query.to_string(),
        normalized_query: normalized_query.to_string(),
        was_answered,
        backing_source,
        latency_ms: start.elapsed().as_millis() as i64,
        created_at: Utc::now(),
        client_ip,
    };
    if let Err(e) = analytics_recorder.record(turn).await {
        tracing::warn!("failed to record analytics turn for session {}: {}", session_id, e);
    }
}
