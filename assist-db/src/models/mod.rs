pub mod analytics;
pub mod conversation;
pub mod employee;
pub mod fee;

pub use analytics::*;
pub use conversation::*;
pub use employee::*;
pub use fee::*;
