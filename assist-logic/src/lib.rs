pub mod config;
pub mod integration;
pub mod mappers;
pub mod services;

pub use config::AssistConfig;
pub use integration::*;
pub use mappers::*;
pub use services::*;
