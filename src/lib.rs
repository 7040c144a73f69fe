pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use error::{Result, StatsError};
pub use services::commands::{ChatReply, CommandHandler};
pub use services::stats_service::StatsService;
