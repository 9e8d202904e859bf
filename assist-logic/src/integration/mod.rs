pub mod knowledge_store_client;
pub mod model_provider_client;

pub use knowledge_store_client::KnowledgeStoreHttpClient;
pub use model_provider_client::ModelProviderHttpClient;
