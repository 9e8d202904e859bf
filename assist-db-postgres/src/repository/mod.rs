#[cfg(feature = "rule_repository")]
pub mod rule_repository_impl;

#[cfg(feature = "directory_repository")]
pub mod directory_repository_impl;

#[cfg(feature = "conversation_repository")]
pub mod conversation_repository_impl;

#[cfg(feature = "analytics_repository")]
pub mod analytics_repository_impl;

#[cfg(feature = "rule_repository")]
pub use rule_repository_impl::RuleRepositoryImpl;

#[cfg(feature = "directory_repository")]
pub use directory_repository_impl::DirectoryRepositoryImpl;

#[cfg(feature = "conversation_repository")]
pub use conversation_repository_impl::ConversationRepositoryImpl;

#[cfg(feature = "analytics_repository")]
pub use analytics_repository_impl::AnalyticsRepositoryImpl;
