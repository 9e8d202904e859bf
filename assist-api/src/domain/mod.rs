pub mod analytics;
pub mod classifier;
pub mod conversation;
pub mod directory;
pub mod disambiguation;
pub mod fee;
pub mod orchestrator;
pub mod retrieval;

pub use analytics::*;
pub use classifier::*;
pub use conversation::*;
pub use directory::*;
pub use disambiguation::*;
pub use fee::*;
pub use orchestrator::*;
pub use retrieval::*;
