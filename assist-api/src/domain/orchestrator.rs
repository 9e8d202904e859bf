use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::retrieval::KnowledgeNamespace;

/// Wire-facing chat transport request. HTTP binding itself is out
/// of scope; this is the DTO the orchestrator consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub session_id: Option<Uuid>,
    pub knowledge_base: Option<KnowledgeNamespace>,
    #[serde(default = "default_stream")]
    pub stream: bool,
    pub client_ip: Option<String>,
    /// A disambiguation token from a prior `NeedsDisambiguation` turn, and
    /// the option the caller picked, if this turn is resolving one.
    pub disambiguation_token: Option<String>,
    pub disambiguation_choice: Option<usize>,
}

fn default_stream() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub source_id: String,
    pub title: Option<String>,
}

/// Non-streaming response shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
    pub sources: Vec<SourceRef>,
}

/// The sources envelope emitted once per turn. The core hands this
/// around as a typed value; only the HTTP transport boundary (out of scope)
/// renders it into the sentinel-delimited wire form via `Display`, so
/// clients parse a well-defined event instead of splicing substrings out of
/// the raw token stream.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: SourcesEnvelopeType,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourcesEnvelopeType {
    #[default]
    Sources,
}

pub const SOURCES_SENTINEL: &str = "__SOURCES__";

impl std::fmt::Display for SourcesEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{SOURCES_SENTINEL}{json}{SOURCES_SENTINEL}")
    }
}

/// A single event in the streaming response.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Token(String),
    Sources(SourcesEnvelope),
    Done,
}

/// Per-request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    Received,
    Classified,
    Resolved,
    Prompted,
    Streaming,
    Finalized,
    Failed,
    AwaitingDisambiguation,
    SmallTalk,
}
