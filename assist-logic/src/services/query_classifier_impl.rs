use std::sync::LazyLock;

use assist_api::domain::classifier::{ClassificationOutcome, Entities, FilterFlags, RoutingDecision};
use assist_api::domain::retrieval::KnowledgeNamespace;
use assist_api::service::query_classifier_service::QueryClassifier;
use regex::Regex;

/// Query Classifier: a deterministic, ordered, pure pattern matcher —
/// no external calls, no error path.
///
/// Priority order matters: organizational-overview is checked ahead of
/// milestones/history so a query like "company history" (overview) is not
/// swallowed by the milestones pattern before the overview pattern gets a
/// chance — a greedier pattern checked first would otherwise win by accident.
pub struct QueryClassifierImpl;

impl QueryClassifierImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QueryClassifierImpl {
    fn default() -> Self {
        Self::new()
    }
}

static SMALLTALK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|hey|good (morning|afternoon|evening)|thanks|thank you|bye|goodbye)\b").unwrap()
});

static TIME_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhat(?:'s| is)?\s+(the\s+)?(time|date|day)\b").unwrap());

static DIRECTORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(who is|find|phone number of|contact info(rmation)? for|email of|mobile number of|employee directory|staff directory)\b").unwrap()
});

static CARD_PRODUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(card|visa|mastercard|amex|rupay|platinum|gold|classic|world rfcd)\b").unwrap());

static FEE_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(fee|fees|charge|charges|annual fee)\b").unwrap());

static CARD_NETWORK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(visa|mastercard|amex|rupay)\b").unwrap());
static CARD_CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(debit|credit|prepaid)\b").unwrap());
static CARD_PRODUCT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(platinum|gold|classic|world rfcd)\b").unwrap());
static LOAN_PRODUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(home loan|personal loan|auto loan|car loan|education loan)\b").unwrap());

static ORG_OVERVIEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(company overview|about us|organi[sz]ational structure|company profile|org chart|corporate overview)\b").unwrap()
});

static FINANCIAL_REPORTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(annual report|financial statement|10-k|10-q|earnings|quarterly report)\b").unwrap()
});

static MILESTONES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(milestone|history|timeline|founded|anniversary)\b").unwrap());

static MANAGEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(ceo|cfo|management team|board of directors|executives|leadership)\b").unwrap());

static POLICIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(policy|policies|terms and conditions|kyc|compliance)\b").unwrap());

static PRODUCTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(product|account type|savings account|current account|loan type)\b").unwrap());

static USER_DOCS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(how do i|how to|user guide|manual|instructions)\b").unwrap());

impl QueryClassifier for QueryClassifierImpl {
    fn classify(&self, raw_query: &str) -> ClassificationOutcome {
        let entities = extract_entities(raw_query);

        let decision = if SMALLTALK_RE.is_match(raw_query) || TIME_DATE_RE.is_match(raw_query) {
            RoutingDecision::SmallTalk
        } else if DIRECTORY_RE.is_match(raw_query) {
            RoutingDecision::Directory
        } else if CARD_PRODUCT_RE.is_match(raw_query) && FEE_KEYWORD_RE.is_match(raw_query) {
            RoutingDecision::CardFees
        } else if ORG_OVERVIEW_RE.is_match(raw_query) {
            RoutingDecision::Retrieval {
                namespace: KnowledgeNamespace::OrganizationalOverview,
                filter_flags: FilterFlags { filter_financial: true },
            }
        } else if FINANCIAL_REPORTS_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::FinancialReports, filter_flags: FilterFlags::default() }
        } else if MILESTONES_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::Milestones, filter_flags: FilterFlags::default() }
        } else if MANAGEMENT_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::Management, filter_flags: FilterFlags::default() }
        } else if POLICIES_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::Policies, filter_flags: FilterFlags::default() }
        } else if PRODUCTS_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::Products, filter_flags: FilterFlags::default() }
        } else if USER_DOCS_RE.is_match(raw_query) {
            RoutingDecision::Retrieval { namespace: KnowledgeNamespace::UserDocs, filter_flags: FilterFlags::default() }
        } else {
            RoutingDecision::Unknown
        };

        ClassificationOutcome { decision, entities }
    }
}

fn extract_entities(raw_query: &str) -> Entities {
    Entities {
        card_product: CARD_PRODUCT_NAME_RE.find(raw_query).map(|m| m.as_str().to_string()),
        card_network: CARD_NETWORK_RE.find(raw_query).map(|m| m.as_str().to_string()),
        card_category: CARD_CATEGORY_RE.find(raw_query).map(|m| m.as_str().to_string()),
        loan_product: LOAN_PRODUCT_RE.find(raw_query).map(|m| m.as_str().to_string()),
        charge_context: None,
        search_term: DIRECTORY_RE.find(raw_query).map(|m| raw_query[m.end()..].trim().to_string()),
    }
}
