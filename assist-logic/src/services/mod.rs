pub mod analytics_recorder_impl;
pub mod conversation_memory_impl;
pub mod directory_lookup_impl;
pub mod disambiguation_store_impl;
pub mod fee_resolver_impl;
pub mod orchestrator_impl;
pub mod query_classifier_impl;
pub mod retrieval_client_impl;

pub use analytics_recorder_impl::AnalyticsRecorderImpl;
pub use conversation_memory_impl::ConversationMemoryImpl;
pub use directory_lookup_impl::DirectoryLookupImpl;
pub use disambiguation_store_impl::DisambiguationStoreImpl;
pub use fee_resolver_impl::FeeResolverImpl;
pub use orchestrator_impl::OrchestratorImpl;
pub use query_classifier_impl::QueryClassifierImpl;
pub use retrieval_client_impl::RetrievalClientImpl;
