//! Runtime configuration for the orchestration core, loaded from a config
//! file plus `ASSIST_`-prefixed environment overrides (e.g.
//! `ASSIST_RETRIEVAL__CACHE_TTL_SECS=600`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub cache_ttl_secs: u64,
    pub cache_max_capacity: u64,
    pub knowledge_store_base_url: String,
    pub knowledge_store_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3_600,
            cache_max_capacity: 10_000,
            knowledge_store_base_url: "http://localhost:8081".to_string(),
            knowledge_store_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: assist_api::domain::disambiguation::DEFAULT_DISAMBIGUATION_TTL_SECS,
            max_capacity: 50_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProviderConfig {
    pub base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub first_token_timeout_ms: u64,
}

impl Default for ModelProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            model_name: "assist-core-default".to_string(),
            temperature: 0.2,
            max_tokens: 1_024,
            timeout_ms: 120_000,
            first_token_timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEngineConfig {
    pub timeout_ms: u64,
}

impl Default for FeeEngineConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

/// Classifier-facing feature flags, plus the directory isolation invariant's
/// on/off switch. `directory_isolation_enabled` must default on: turning it
/// off is an explicit, auditable opt-out of the hard invariant that a
/// Directory-routed turn never reaches the knowledge store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub directory_isolation_enabled: bool,
    pub small_talk_enabled: bool,
    pub card_fees_enabled: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            directory_isolation_enabled: true,
            small_talk_enabled: true,
            card_fees_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub recent_window: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { recent_window: 10 }
    }
}

/// Top-level configuration object for the core crates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssistConfig {
    pub retrieval: RetrievalConfig,
    pub disambiguation: DisambiguationConfig,
    pub model_provider: ModelProviderConfig,
    pub fee_engine: FeeEngineConfig,
    pub classifier: ClassifierConfig,
    pub conversation: ConversationConfig,
}

impl AssistConfig {
    /// Loads configuration from (in ascending precedence) a bundled default,
    /// an optional `config/assist.toml` file, and `ASSIST_`-prefixed
    /// environment variables with `__` as the nesting separator.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AssistConfig::default())?)
            .add_source(config::File::with_name("config/assist").required(false))
            .add_source(config::Environment::with_prefix("ASSIST").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn retrieval_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.retrieval.cache_ttl_secs)
    }

    pub fn disambiguation_ttl(&self) -> Duration {
        Duration::from_secs(self.disambiguation.ttl_secs)
    }

    pub fn knowledge_store_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieval.knowledge_store_timeout_ms)
    }

    pub fn model_provider_timeout(&self) -> Duration {
        Duration::from_millis(self.model_provider.timeout_ms)
    }

    pub fn model_provider_first_token_timeout(&self) -> Duration {
        Duration::from_millis(self.model_provider.first_token_timeout_ms)
    }

    pub fn fee_engine_timeout(&self) -> Duration {
        Duration::from_millis(self.fee_engine.timeout_ms)
    }
}
