use serde::{Deserialize, Serialize};

use crate::domain::retrieval::KnowledgeNamespace;

/// Entities extracted from a query alongside the routing decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    pub card_product: Option<String>,
    pub card_network: Option<String>,
    pub card_category: Option<String>,
    pub loan_product: Option<String>,
    pub charge_context: Option<String>,
    pub search_term: Option<String>,
}

/// Flags carried alongside a `Retrieval` decision that modify post-fetch
/// behavior — currently just the organizational-overview financial-document
/// filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFlags {
    pub filter_financial: bool,
}

/// Output of the Query Classifier: exactly one route, deterministically
/// chosen, in fixed priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoutingDecision {
    SmallTalk,
    Directory,
    CardFees,
    Retrieval {
        namespace: KnowledgeNamespace,
        filter_flags: FilterFlags,
    },
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub decision: RoutingDecision,
    pub entities: Entities,
}
