pub mod analytics_service;
pub mod conversation_memory_service;
pub mod directory_lookup_service;
pub mod disambiguation_store_service;
pub mod fee_resolver_service;
pub mod model_provider_service;
pub mod orchestrator_service;
pub mod query_classifier_service;
pub mod retrieval_client_service;

pub use analytics_service::*;
pub use conversation_memory_service::*;
pub use directory_lookup_service::*;
pub use disambiguation_store_service::*;
pub use fee_resolver_service::*;
pub use model_provider_service::*;
pub use orchestrator_service::*;
pub use query_classifier_service::*;
pub use retrieval_client_service::*;
